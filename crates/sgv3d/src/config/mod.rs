//! Configuration system
//!
//! Scene settings load from TOML or RON, picked by file extension. Uniform
//! names live here so shaders can rename them without touching call sites;
//! they are resolved into locations once by
//! [`BindingLayout::resolve`](crate::render::BindingLayout::resolve).

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load configuration from file, or fall back to defaults when the file is absent
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if std::path::Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            log::info!("No config at {path}; using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Shader uniform names the renderer looks up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniformNames {
    /// Colour scheme selector
    pub color_scheme: String,
    /// Camera position (vec3)
    pub camera_position: String,
    /// Camera direction (vec3)
    pub camera_direction: String,
    /// Maximum corner of a mesh or subgraph
    pub maximum: String,
    /// Minimum corner of a mesh or subgraph
    pub minimum: String,
    /// Model matrix (mat4); required
    pub model_matrix: String,
    /// View matrix (mat4)
    pub view_matrix: String,
    /// Projection matrix (mat4)
    pub projection_matrix: String,
}

impl Default for UniformNames {
    fn default() -> Self {
        Self {
            color_scheme: "colorScheme".to_string(),
            camera_position: "camPos".to_string(),
            camera_direction: "camDir".to_string(),
            maximum: "maxi".to_string(),
            minimum: "mini".to_string(),
            model_matrix: "model".to_string(),
            view_matrix: "view".to_string(),
            projection_matrix: "projection".to_string(),
        }
    }
}

/// Top-level scene settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Default log level (`RUST_LOG` still wins)
    pub log_level: String,
    /// Background clear colour [R, G, B, A]
    pub clear_color: [f32; 4],
    /// Uniform names used by the shaders
    pub uniforms: UniformNames,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            clear_color: [0.0, 0.0, 0.0, 1.0],
            uniforms: UniformNames::default(),
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Set the clear colour
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("sgv3d_{}_{name}", std::process::id()))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_default_uniform_names() {
        let names = UniformNames::default();
        assert_eq!(names.model_matrix, "model");
        assert_eq!(names.camera_position, "camPos");
        assert_eq!(names.projection_matrix, "projection");
    }

    #[test]
    fn test_toml_partial_file_keeps_defaults() {
        let config: SceneConfig = toml::from_str(
            r#"
            log_level = "debug"

            [uniforms]
            model_matrix = "mMat"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.uniforms.model_matrix, "mMat");
        assert_eq!(config.uniforms.view_matrix, "view");
        assert_eq!(config.clear_color, [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = temp_path("scene.ron");
        let config = SceneConfig::default().with_clear_color([0.0, 0.3, 0.0, 1.0]);
        config.save_to_file(&path).unwrap();

        let loaded = SceneConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = SceneConfig::default().save_to_file("scene.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = SceneConfig::load_or_default(&temp_path("absent.toml")).unwrap();
        assert_eq!(config, SceneConfig::default());
    }
}
