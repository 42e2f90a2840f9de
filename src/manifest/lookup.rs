use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::paths::{self, Browser, Scope};

/// A native messaging host manifest as installed alongside the helper.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HostManifest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub path: PathBuf,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_extensions: Option<Vec<String>>,
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

impl HostManifest {
    /// Read and parse a manifest file. No validation beyond JSON shape.
    pub fn load(path: &Path) -> io::Result<Self> {
        let raw = fs::read(path)?;
        serde_json::from_slice(&raw)
            .map_err(|e| invalid(format!("{}: invalid manifest: {e}", path.display())))
    }

    /// Check the manifest describes `host_name` and make `path` absolute.
    ///
    /// Relative executable paths are resolved against the manifest's directory on
    /// Windows and rejected elsewhere.
    fn resolve(mut self, host_name: &str, manifest_file: &Path) -> io::Result<Self> {
        if self.name != host_name {
            return Err(invalid(format!(
                "{}: manifest is for `{}`, expected `{host_name}`",
                manifest_file.display(),
                self.name
            )));
        }
        if self.kind != "stdio" {
            return Err(invalid(format!(
                "{}: unsupported host type `{}`",
                manifest_file.display(),
                self.kind
            )));
        }
        if self.path.is_relative() {
            if cfg!(windows) {
                let dir = manifest_file.parent().unwrap_or_else(|| Path::new("."));
                self.path = dir.join(&self.path);
            } else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "{}: host path must be absolute: {}",
                        manifest_file.display(),
                        self.path.display()
                    ),
                ));
            }
        }
        Ok(self)
    }
}

/// Host names may only contain lowercase alphanumerics, `_` and `.`, and must not
/// start or end with a dot or contain two dots in a row.
pub fn validate_host_name(name: &str) -> io::Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if name.is_empty()
        || !valid_chars
        || name.starts_with('.')
        || name.ends_with('.')
        || name.contains("..")
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid native messaging host name: `{name}`"),
        ));
    }
    Ok(())
}

#[cfg(all(windows, feature = "windows-registry"))]
fn registry_manifest_file(
    browser: Browser,
    scope: Scope,
    host_name: &str,
) -> io::Result<Option<PathBuf>> {
    let key_path = match paths::winreg_key_path(browser, scope, host_name) {
        Ok(key_path) => key_path,
        Err(_) => return Ok(None),
    };
    super::winreg::read_manifest_path_from_reg(scope, &key_path)
}

#[cfg(not(all(windows, feature = "windows-registry")))]
fn registry_manifest_file(_: Browser, _: Scope, _: &str) -> io::Result<Option<PathBuf>> {
    Ok(None)
}

fn manifest_file(browser: Browser, scope: Scope, host_name: &str) -> io::Result<PathBuf> {
    match registry_manifest_file(browser, scope, host_name)? {
        Some(path) => Ok(path),
        None => paths::manifest_path(browser, scope, host_name),
    }
}

/// Find and validate the manifest `browser` would use to launch `host_name`.
pub fn locate(host_name: &str, browser: Browser, scope: Scope) -> io::Result<HostManifest> {
    validate_host_name(host_name)?;
    let file = manifest_file(browser, scope, host_name)?;
    if !file.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "native messaging host `{host_name}` is not installed for {browser} ({scope}): {}",
                file.display()
            ),
        ));
    }
    tracing::debug!(
        host = host_name,
        %browser,
        %scope,
        file = %file.display(),
        "found host manifest"
    );
    HostManifest::load(&file)?.resolve(host_name, &file)
}

/// First browser (in `browsers` order, or all known browsers) with a manifest
/// file for `host_name` installed in `scope`.
pub fn find_installed(
    host_name: &str,
    browsers: Option<&[Browser]>,
    scope: Scope,
) -> io::Result<Option<(Browser, PathBuf)>> {
    validate_host_name(host_name)?;
    let browsers = browsers.unwrap_or(&Browser::ALL[..]);
    for &browser in browsers {
        let file = match manifest_file(browser, scope, host_name) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::Unsupported => continue,
            Err(e) => return Err(e),
        };
        if file.exists() {
            return Ok(Some((browser, file)));
        }
    }
    Ok(None)
}
