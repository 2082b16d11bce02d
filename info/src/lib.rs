//! Build metadata shared by the server, the helper binaries and the logger.

/// The crate version the server was built from.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The source revision, if the build pipeline provided one.
pub const REVISION: Option<&str> = option_env!("IRONLOG_REVISION");

/// When the binary was built, if the build pipeline provided it.
pub const BUILD_TIMESTAMP: Option<&str> = option_env!("IRONLOG_BUILD_TIMESTAMP");

/// The name reported by the health check.
pub const SERVICE_NAME: &str = "ironlog";
