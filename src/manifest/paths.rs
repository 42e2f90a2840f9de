use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, io, path::PathBuf, str::FromStr};

/// Browsers whose manifest locations are known.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chrome,
    Chromium,
    Edge,
    Brave,
    Vivaldi,
    Firefox,
    Librewolf,
}

impl Browser {
    pub const ALL: [Browser; 7] = [
        Browser::Chrome,
        Browser::Chromium,
        Browser::Edge,
        Browser::Brave,
        Browser::Vivaldi,
        Browser::Firefox,
        Browser::Librewolf,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Browser::Chrome => "chrome",
            Browser::Chromium => "chromium",
            Browser::Edge => "edge",
            Browser::Brave => "brave",
            Browser::Vivaldi => "vivaldi",
            Browser::Firefox => "firefox",
            Browser::Librewolf => "librewolf",
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Browser {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Browser::ALL
            .into_iter()
            .find(|b| b.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("unknown browser: {s}"))
            })
    }
}

/// Per-user or machine-wide manifest location.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    User,
    System,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::User => f.write_str("user"),
            Scope::System => f.write_str("system"),
        }
    }
}

impl FromStr for Scope {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Scope::User),
            "system" => Ok(Scope::System),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("unknown scope: {s}"),
            )),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
struct OsEntry {
    user: Option<String>,
    system: Option<String>,
    registry: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct BrowserEntry {
    linux: Option<OsEntry>,
    macos: Option<OsEntry>,
    windows: Option<OsEntry>,
}

static BROWSERS: Lazy<HashMap<String, BrowserEntry>> = Lazy::new(|| {
    toml::from_str(include_str!("browsers.toml")).expect("embedded browsers.toml is valid")
});

fn os_entry(browser: Browser) -> Option<&'static OsEntry> {
    let entry = BROWSERS.get(browser.key())?;
    if cfg!(target_os = "macos") {
        entry.macos.as_ref()
    } else if cfg!(windows) {
        entry.windows.as_ref()
    } else {
        entry.linux.as_ref()
    }
}

fn not_configured(browser: Browser, scope: Scope) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("no {scope} manifest location for {browser} on this platform"),
    )
}

fn env_dir(var: &str) -> io::Result<String> {
    std::env::var(var)
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, format!("{var} not set")))
}

fn expand(template: &str) -> io::Result<PathBuf> {
    let mut out = template.to_string();
    for (placeholder, var) in [
        ("{home}", "HOME"),
        ("{appdata}", "APPDATA"),
        ("{localappdata}", "LOCALAPPDATA"),
        ("{programdata}", "PROGRAMDATA"),
    ] {
        if out.contains(placeholder) {
            out = out.replace(placeholder, &env_dir(var)?);
        }
    }
    Ok(PathBuf::from(out))
}

/// Directory `browser` scans for manifests in `scope`.
pub fn manifest_dir(browser: Browser, scope: Scope) -> io::Result<PathBuf> {
    let entry = os_entry(browser).ok_or_else(|| not_configured(browser, scope))?;
    let template = match scope {
        Scope::User => entry.user.as_deref(),
        Scope::System => entry.system.as_deref(),
    };
    expand(template.ok_or_else(|| not_configured(browser, scope))?)
}

/// Full path of the manifest file for `host_name`.
pub fn manifest_path(browser: Browser, scope: Scope, host_name: &str) -> io::Result<PathBuf> {
    Ok(manifest_dir(browser, scope)?.join(format!("{host_name}.json")))
}

/// Registry key (under HKCU or HKLM depending on `scope`) whose default value
/// points at the manifest on Windows.
pub fn winreg_key_path(browser: Browser, scope: Scope, host_name: &str) -> io::Result<String> {
    let key = BROWSERS
        .get(browser.key())
        .and_then(|entry| entry.windows.as_ref())
        .and_then(|os| os.registry.as_deref())
        .ok_or_else(|| not_configured(browser, scope))?;
    Ok(format!(r"{key}\{host_name}"))
}
