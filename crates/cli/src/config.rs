use std::env;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context as AnyhowContext, Result};
use critique_client::ClientConfig;
use critique_search::{AnalyzerConfig, MatcherConfig};
use critique_serializer::SerializerConfig;
use serde::{Deserialize, Serialize};

use crate::highlight::HighlightConfig;

pub const CONFIG_ENV: &str = "CRITIQUE_CONFIG";
pub const ENDPOINT_ENV: &str = "CRITIQUE_ENDPOINT";

/// Every tunable of the pipeline, one section per component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CritiqueConfig {
    pub serializer: SerializerConfig,
    pub analyzer: AnalyzerConfig,
    pub matcher: MatcherConfig,
    pub client: ClientConfig,
    pub highlight: HighlightConfig,
}

impl CritiqueConfig {
    /// Parse JSON, falling back to TOML.
    pub fn parse(raw: &str) -> Result<Self> {
        match serde_json::from_str(raw) {
            Ok(config) => Ok(config),
            Err(json_err) => toml::from_str(raw).map_err(|toml_err| {
                anyhow!("config is neither JSON ({json_err}) nor TOML ({toml_err})")
            }),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Explicit path, else `CRITIQUE_CONFIG`, else defaults; then environment
    /// overrides and validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match env::var_os(CONFIG_ENV) {
                Some(path) => Self::from_file(Path::new(&path))?,
                None => Self::default(),
            },
        };
        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            if !endpoint.trim().is_empty() {
                log::debug!("client endpoint overridden by {ENDPOINT_ENV}");
                config.client.endpoint = endpoint;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.serializer.validate().map_err(|msg| anyhow!(msg))?;
        self.analyzer.validate()?;
        self.matcher.validate()?;
        self.client.validate()?;
        self.highlight.validate().map_err(|msg| anyhow!(msg))?;
        Ok(())
    }
}
