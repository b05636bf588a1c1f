pub mod loader;
pub mod schema;

pub use loader::{
    apply_env_overrides, find_config_file, load_config, load_config_from_file, resolve_config,
    ConfigFormat, ResolvedConfig, ENV_API_KEY, ENV_BASE_URL, ENV_MODEL,
};
pub use schema::{ProviderSettings, QuillConfig, RetrySettings};
