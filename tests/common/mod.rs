#![allow(dead_code)]

use bloss_bridge::{CardInfo, SigningAlgorithm};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{env, fs};
use tempfile::TempDir;

/// Variables the manifest search roots are expanded from, and the sandbox
/// subdirectory each one is pointed at.
const ROOTS: [(&str, &str); 4] = [
    ("HOME", "home"),
    ("APPDATA", "roaming"),
    ("LOCALAPPDATA", "local"),
    ("PROGRAMDATA", "programdata"),
];

/// A throwaway home (plus Windows profile folders) for manifest lookups.
/// The previous environment comes back when the sandbox is dropped.
pub struct Sandbox {
    dir: TempDir,
    saved: Vec<(&'static str, Option<OsString>)>,
}

impl Sandbox {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let saved = ROOTS
            .iter()
            .map(|&(var, sub)| {
                let root = dir.path().join(sub);
                fs::create_dir_all(&root).expect("sandbox root");
                let previous = env::var_os(var);
                env::set_var(var, &root);
                (var, previous)
            })
            .collect();
        Self { dir, saved }
    }

    pub fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        for (var, previous) in self.saved.drain(..) {
            match previous {
                Some(value) => env::set_var(var, value),
                None => env::remove_var(var),
            }
        }
    }
}

/// A card as the helper would report it.
pub fn card(manufacturer: &str, serial: &str, aid: &str, key_byte: u8) -> CardInfo {
    CardInfo {
        manufacturer: manufacturer.to_string(),
        serial_number: serial.to_string(),
        aid: aid.to_string(),
        signing_algo: SigningAlgorithm::Ed25519,
        public_key: vec![key_byte; 32],
    }
}
