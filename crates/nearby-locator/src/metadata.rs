//! Build metadata logged at startup

use shadow_rs::shadow;
use tracing::info;

shadow!(build);

#[allow(dead_code)] // Allow auto-generated code containing unused build metadata
pub fn log_version_info() {
    info!("{}", short_version_info());
    info!(
        "Build date: {} ({})",
        build::BUILD_TIME_2822,
        build::BUILD_RUST_CHANNEL
    );
}

#[allow(dead_code)] // Allow auto-generated code containing unused build metadata
pub fn short_version_info() -> String {
    format!(
        "{} {} ({}@{}{})",
        build::PROJECT_NAME,
        build::PKG_VERSION,
        build::BRANCH,
        build::SHORT_COMMIT,
        if build::GIT_CLEAN { "" } else { "+dirty" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_version_info_carries_the_package_version() {
        assert!(short_version_info().contains(build::PKG_VERSION));
    }
}
