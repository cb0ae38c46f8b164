use serde::{Deserialize, Serialize};

/// Limits and options for tree serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    /// Deepest level kept, the serialization root being level 0
    pub max_depth: usize,

    /// Children serialized per node (the rest are dropped)
    pub max_children: usize,

    /// Total nodes across one serialization call
    pub max_nodes: usize,

    /// Selected frames serialized per analysis request
    pub max_frames: usize,

    /// Carry fills and strokes through to the payload
    pub include_styles: bool,

    /// Font size omitted from text nodes to save payload space
    pub default_font_size: f64,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_children: 15,
            max_nodes: 500,
            max_frames: 5,
            include_styles: false,
            default_font_size: 14.0,
        }
    }
}

impl SerializerConfig {
    /// Create config for high-fidelity payloads (deeper trees, styles kept)
    pub fn detailed() -> Self {
        Self {
            max_depth: 8,
            max_children: 50,
            max_nodes: 2_000,
            include_styles: true,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_children == 0 {
            return Err("serializer.max_children must be > 0".to_string());
        }
        if self.max_nodes == 0 {
            return Err("serializer.max_nodes must be > 0".to_string());
        }
        if self.max_frames == 0 {
            return Err("serializer.max_frames must be > 0".to_string());
        }
        if !self.default_font_size.is_finite() || self.default_font_size <= 0.0 {
            return Err(format!(
                "serializer.default_font_size ({}) must be a positive number",
                self.default_font_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(SerializerConfig::default().validate().is_ok());
        assert!(SerializerConfig::detailed().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SerializerConfig {
            max_children: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.max_children = 15;
        config.max_nodes = 0;
        assert!(config.validate().is_err());

        config.max_nodes = 10;
        config.default_font_size = f64::NAN;
        assert!(config.validate().is_err());

        config.default_font_size = 12.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: SerializerConfig = serde_json::from_str(r#"{"max_depth": 3}"#).unwrap();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_children, 15);
    }
}
