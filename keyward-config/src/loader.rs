use anyhow::{Context, anyhow};
use keyward_core::RegistryPolicy;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Path to a TOML or JSON config file.
pub const CONFIG_PATH_ENV: &str = "KEYWARD_CONFIG_PATH";
/// Inline JSON config.
pub const CONFIG_JSON_ENV: &str = "KEYWARD_CONFIG_JSON";

const DEFAULT_CANDIDATES: &[&str] = &[
    "keyward.toml",
    "keyward.json",
    "config/keyward.toml",
    "config/keyward.json",
];

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// Top-level keyward settings.
///
/// ```toml
/// [registry]
/// reregistration = "reject"
/// max_authorizations_per_user = 4
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeywardConfig {
    /// Rules the registry enforces on registration and attachment.
    pub registry: RegistryPolicy,
}

impl KeywardConfig {
    /// Load configuration using environment variables.
    /// Evaluation order:
    /// 1) `$KEYWARD_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$KEYWARD_CONFIG_JSON` (inline JSON),
    /// 3) the first default file found under the working directory,
    /// 4) defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, ConfigSource)> {
        let cwd = env::current_dir()
            .context("failed to resolve working directory")?;
        Self::load_with(|name| env::var(name).ok(), &cwd)
    }

    /// Same as [`load_from_env`](Self::load_from_env) with an explicit
    /// variable lookup and search root.
    pub fn load_with(
        lookup: impl Fn(&str) -> Option<String>,
        search_root: &Path,
    ) -> anyhow::Result<(Self, ConfigSource)> {
        if let Some(path_str) = lookup(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            info!(path = %path.display(), "loaded keyward config from {CONFIG_PATH_ENV}");
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(raw) = lookup(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            info!("loaded keyward config from {CONFIG_JSON_ENV}");
            return Ok((parsed, ConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file(search_root) {
            let config = Self::load_from_file(&path)?;
            info!(path = %path.display(), "loaded keyward config file");
            return Ok((config, ConfigSource::File(path)));
        }

        debug!("no keyward config found, using defaults");
        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read keyward config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid keyward config {}", path.display())
            }),
            Some("toml") | Some("tml") => {
                toml::from_str(&contents).map_err(|err| {
                    anyhow!(
                        "invalid keyward config {}: {}",
                        path.display(),
                        err
                    )
                })
            }
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        // Try TOML first, then JSON.
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse keyward config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid keyward config json: {err}"))
    }

    fn find_default_file(root: &Path) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| root.join(candidate))
            .find(|path| path.exists())
    }
}
