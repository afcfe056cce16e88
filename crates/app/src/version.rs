use std::fmt;

/// Version string handed to clap for `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("REPO_VERSION"),
    ", ",
    env!("BUILD_PROFILE"),
    ")"
);

/// Build details recorded by `build.rs`
#[derive(Debug, Clone, Copy)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub build_target: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        repo_version: env!("REPO_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        build_target: env!("BUILD_TARGET"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rnid {} ({}, {} build for {}, built {})",
            self.version,
            self.repo_version,
            self.build_profile,
            self.build_target,
            self.build_timestamp
        )
    }
}

/// Log what is running, at debug level
pub fn report_build_info() {
    let build = build_info();

    tracing::debug!(build = %build, "starting up");
}
