// Build-time version from Cargo.toml

/// Human-readable application name.
pub const APPLICATION_NAME: &str = "Junk file generator";

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");
