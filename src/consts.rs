pub const MANIFEST_FILE_NAME: &str = "package.json";

pub const DEFAULT_PACKAGE_VERSION: &str = "0.1.0";

pub const DEFAULT_GITIGNORE: &str = "node_modules/\ndist/\n";

// --- Environment overrides ---

/// Binary the pnpm provider spawns. Tests point this at a stub script.
pub const ENV_PNPM_BIN: &str = "DEVCALL_PNPM_BIN";

/// Binary the git provider spawns.
pub const ENV_GIT_BIN: &str = "DEVCALL_GIT_BIN";
