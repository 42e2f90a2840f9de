//! Locating the helper through its native messaging host manifest.
//!
//! Browsers find a host by name: a JSON manifest in a per-browser directory (or,
//! on Windows, a registry value pointing at one) names the executable to launch.
//! This module performs the same lookup so [`ProcessTransport`](crate::transport::ProcessTransport)
//! can start the helper that the browser would start. Installing manifests is the
//! helper's packaging concern and is not done here.

pub mod lookup;
pub mod paths;

#[cfg(all(windows, feature = "windows-registry"))]
pub mod winreg;

pub use lookup::*;
pub use paths::{Browser, Scope};
