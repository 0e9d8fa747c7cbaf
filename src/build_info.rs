//! Build metadata embedded by `build.rs`

use serde::Serialize;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

const RAW_BUILD_NUMBER: Option<&str> = option_env!("LIFEDASH_BUILD_NUMBER");
const RAW_BUILD_TIMESTAMP: Option<&str> = option_env!("LIFEDASH_BUILD_TIMESTAMP");

/// Name, version and build stamp of the running binary
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    pub name: &'static str,
    pub version: &'static str,
    /// 0 when built without the build script's counter
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub description: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            build_number: parse_build_number(RAW_BUILD_NUMBER),
            build_timestamp: RAW_BUILD_TIMESTAMP.unwrap_or("unknown"),
            description: DESCRIPTION,
        }
    }

    fn banner_lines(&self) -> [String; 3] {
        [
            format!("  LifeDash v{}", self.version),
            format!("  Build #{} ({})", self.build_number, self.build_timestamp),
            format!("  {}", self.description),
        ]
    }
}

fn parse_build_number(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0)
}

/// Startup banner, written to stderr
pub fn print_startup_banner() {
    let rule = "=".repeat(47);
    eprintln!("{}", rule);
    for line in BuildInfo::current().banner_lines() {
        eprintln!("{}", line);
    }
    eprintln!("{}", rule);
}
