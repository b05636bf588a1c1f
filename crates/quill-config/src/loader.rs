use crate::schema::QuillConfig;
use anyhow::{anyhow, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Overrides `provider.base_url`
pub const ENV_BASE_URL: &str = "QUILL_BASE_URL";
/// Overrides `provider.model`
pub const ENV_MODEL: &str = "QUILL_MODEL";
/// Overrides `provider.api_key`
pub const ENV_API_KEY: &str = "QUILL_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Jsonc,
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;

        match ext {
            "jsonc" => Some(Self::Jsonc),
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: QuillConfig,
    /// `None` when no file was found and only defaults and the environment
    /// contributed
    pub path: Option<PathBuf>,
    pub format: Option<ConfigFormat>,
}

pub fn load_config(config_path: Option<&Path>) -> Result<QuillConfig> {
    resolve_config(config_path).map(|r| r.config)
}

/// Load the explicit path, else the first discovered file, else defaults;
/// then apply `QUILL_*` overrides.
pub fn resolve_config(config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let path = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let mut resolved = match path {
        Some(path) => load_config_from_file(&path)?,
        None => {
            debug!("no configuration file found, using defaults");
            ResolvedConfig {
                config: QuillConfig::default(),
                path: None,
                format: None,
            }
        }
    };

    resolved.config = apply_env_overrides(resolved.config, |name| env::var(name).ok());
    Ok(resolved)
}

pub fn load_config_from_file(path: &Path) -> Result<ResolvedConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let format = ConfigFormat::from_path(path)
        .ok_or_else(|| anyhow!("Unknown config format for: {}", path.display()))?;

    let config = parse_config_content(&content, format)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    debug!(path = %path.display(), ?format, "loaded configuration");

    Ok(ResolvedConfig {
        config: expand_env_vars(config, |name| env::var(name).ok()),
        path: Some(path.to_path_buf()),
        format: Some(format),
    })
}

fn parse_config_content(content: &str, format: ConfigFormat) -> Result<QuillConfig> {
    match format {
        ConfigFormat::Jsonc => json5::from_str(content).context("Failed to parse JSONC"),
        ConfigFormat::Json => serde_json::from_str(content).context("Failed to parse JSON"),
        ConfigFormat::Yaml => serde_yaml_ng::from_str(content).context("Failed to parse YAML"),
    }
}

const CONFIG_CANDIDATES: &[&str] = &[
    "quill.jsonc",
    "quill.json",
    "quill.yml",
    "quill.yaml",
    ".quill.jsonc",
    ".quill.json",
    ".quill.yml",
    ".quill.yaml",
];

pub fn find_config_file() -> Option<PathBuf> {
    let home = env::var("HOME").ok().map(PathBuf::from);
    find_config_file_in(Path::new("."), home.as_deref())
}

fn find_config_file_in(cwd: &Path, home: Option<&Path>) -> Option<PathBuf> {
    for candidate in CONFIG_CANDIDATES {
        let path = cwd.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }

    let global = home?.join(".config").join("quill");
    CONFIG_CANDIDATES
        .iter()
        .map(|candidate| global.join(candidate))
        .find(|path| path.exists())
}

/// Non-empty `QUILL_*` variables replace the corresponding provider fields.
pub fn apply_env_overrides(
    mut config: QuillConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> QuillConfig {
    let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = get(ENV_BASE_URL) {
        config.provider.base_url = base_url;
    }
    if let Some(model) = get(ENV_MODEL) {
        config.provider.model = model;
    }
    if let Some(api_key) = get(ENV_API_KEY) {
        config.provider.api_key = Some(api_key);
    }
    config
}

fn expand_env_vars(
    mut config: QuillConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> QuillConfig {
    config.provider.base_url = expand_env_string(&config.provider.base_url, &lookup);
    config.provider.model = expand_env_string(&config.provider.model, &lookup);
    config.provider.api_key = config
        .provider
        .api_key
        .map(|key| expand_env_string(&key, &lookup));
    config
}

/// Expand `${VAR}` and `$VAR`; unknown variables are left untouched.
fn expand_env_string(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        if chars.peek() == Some(&'{') {
            chars.next();
            let var_name: String = chars.by_ref().take_while(|&c| c != '}').collect();
            match lookup(&var_name) {
                Some(value) => result.push_str(&value),
                None => {
                    result.push_str("${");
                    result.push_str(&var_name);
                    result.push('}');
                }
            }
            continue;
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                var_name.push(c);
                chars.next();
            } else {
                break;
            }
        }
        if var_name.is_empty() {
            result.push('$');
        } else if let Some(value) = lookup(&var_name) {
            result.push_str(&value);
        } else {
            result.push('$');
            result.push_str(&var_name);
        }
    }

    result
}
