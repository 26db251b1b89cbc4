pub const APP_NAME: &str = "envbind";

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV_VAR: &str = "ENVBIND_CONFIG";

pub const CONFIG_FILENAME: &str = "config.toml";

/// Where REPL history is kept unless configured otherwise.
pub const DEFAULT_HISTORY: &str = "~/.envbind_history";
