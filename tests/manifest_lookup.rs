mod common;

use bloss_bridge::manifest::{self, paths, validate_host_name, Browser, HostManifest, Scope};
use serde_json::json;
use serial_test::serial;
use std::fs;
use std::path::Path;

fn write_manifest(browser: Browser, host: &str, manifest: serde_json::Value) -> std::path::PathBuf {
    let file = paths::manifest_path(browser, Scope::User, host).unwrap();
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(&file, serde_json::to_vec_pretty(&manifest).unwrap()).unwrap();
    file
}

#[test]
#[serial]
fn manifest_path_resolves_for_known_browsers_user_scope() {
    let _sandbox = common::Sandbox::new();
    let host = "com.example.testhost";

    for browser in Browser::ALL {
        // Some browser/OS combinations have no location; skip those.
        if let Ok(p) = paths::manifest_path(browser, Scope::User, host) {
            let s = p.to_string_lossy();
            assert!(s.contains(host), "path should include host name: {s}");
            assert!(s.ends_with(".json"), "path should end with .json: {s}");
        }
    }
}

#[test]
#[serial]
#[cfg(any(target_os = "linux", target_os = "macos"))]
fn user_scope_paths_live_under_home() {
    let sandbox = common::Sandbox::new();
    let p = paths::manifest_path(Browser::Firefox, Scope::User, "com.example.host").unwrap();
    assert!(p.starts_with(sandbox.home()), "{p:?}");
}

#[test]
#[serial]
#[cfg(any(target_os = "linux", target_os = "macos"))]
fn locate_reads_installed_manifest() {
    let _sandbox = common::Sandbox::new();
    let host = "com.harrisluo.bloss_native";
    write_manifest(
        Browser::Chrome,
        host,
        json!({
            "name": host,
            "description": "Bloss PGP card helper",
            "path": "/usr/local/bin/bloss-native",
            "type": "stdio",
            "allowed_origins": ["chrome-extension://aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa/"]
        }),
    );

    let found = manifest::locate(host, Browser::Chrome, Scope::User).expect("locate");
    assert_eq!(found.name, host);
    assert_eq!(found.kind, "stdio");
    assert_eq!(found.path, Path::new("/usr/local/bin/bloss-native"));
    assert!(found.allowed_extensions.is_none());

    let installed = manifest::find_installed(host, None, Scope::User).unwrap();
    assert_eq!(installed.map(|(b, _)| b), Some(Browser::Chrome));
}

#[test]
#[serial]
#[cfg(any(target_os = "linux", target_os = "macos"))]
fn locate_rejects_mismatched_or_unusable_manifests() {
    let _sandbox = common::Sandbox::new();

    let host = "com.example.wrong_name";
    write_manifest(
        Browser::Firefox,
        host,
        json!({"name": "com.example.other", "description": "", "path": "/bin/true", "type": "stdio"}),
    );
    let err = manifest::locate(host, Browser::Firefox, Scope::User).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);

    let host = "com.example.relative";
    write_manifest(
        Browser::Firefox,
        host,
        json!({"name": host, "description": "", "path": "relative/host", "type": "stdio"}),
    );
    let err = manifest::locate(host, Browser::Firefox, Scope::User).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);

    let host = "com.example.not_stdio";
    write_manifest(
        Browser::Firefox,
        host,
        json!({"name": host, "description": "", "path": "/bin/true", "type": "socket"}),
    );
    let err = manifest::locate(host, Browser::Firefox, Scope::User).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}

#[test]
#[serial]
fn missing_manifest_is_not_found() {
    let _sandbox = common::Sandbox::new();
    let err = manifest::locate("com.example.absent", Browser::Chrome, Scope::User).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert!(manifest::find_installed("com.example.absent", Some(&[Browser::Chrome, Browser::Firefox]), Scope::User)
        .unwrap()
        .is_none());
}

#[test]
fn host_names_follow_browser_rules() {
    for ok in ["com.harrisluo.bloss_native", "a", "x1.y_2"] {
        assert!(validate_host_name(ok).is_ok(), "{ok}");
    }
    for bad in ["", "Com.Example", ".lead", "trail.", "dou..ble", "has-dash", "sp ace"] {
        assert!(validate_host_name(bad).is_err(), "{bad}");
    }
}

#[test]
fn manifest_shape_round_trips_type_field() {
    let manifest: HostManifest = serde_json::from_value(json!({
        "name": "com.example.host",
        "description": "desc",
        "path": "/abs/path",
        "type": "stdio",
        "allowed_extensions": ["bloss@example.org"]
    }))
    .unwrap();
    let back = serde_json::to_value(&manifest).unwrap();
    assert_eq!(back["type"], "stdio");
    assert!(back.get("allowed_origins").is_none());
    assert_eq!(back["allowed_extensions"][0], "bloss@example.org");
}
