//! Best-effort runtime and environment facts for diagnostics.

use crate::options::BeaconConfig;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs;

/// Current UTC time as ISO-8601 with a `Z` suffix.
pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Serialize)]
pub struct OsInfo {
    pub name: &'static str,
    pub family: &'static str,
    pub arch: &'static str,
    pub release: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BaseUrls {
    pub bind: String,
    pub public: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub rust_version: Option<&'static str>,
    pub os: OsInfo,
    pub base_urls: BaseUrls,
    pub root: String,
    pub generated_at: String,
}

impl RuntimeInfo {
    pub fn collect(config: &BeaconConfig) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            rust_version: option_env!("CARGO_PKG_RUST_VERSION").filter(|v| !v.is_empty()),
            os: OsInfo {
                name: std::env::consts::OS,
                family: std::env::consts::FAMILY,
                arch: std::env::consts::ARCH,
                release: os_release(),
            },
            base_urls: BaseUrls {
                bind: format!("http://{}", config.bind_addr),
                public: config.public_url.clone(),
            },
            root: config.root.display().to_string(),
            generated_at: now_utc(),
        }
    }
}

/// Kernel release, where the platform exposes it without a subprocess.
fn os_release() -> Option<String> {
    let release = fs::read_to_string("/proc/sys/kernel/osrelease").ok()?;
    let release = release.trim();
    (!release.is_empty()).then(|| release.to_string())
}
