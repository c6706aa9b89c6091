//! Kiosk configuration.
//!
//! All tunable behavior lives in one TOML file: camera negotiation,
//! countdown length, still encoding quality, and delivery endpoints.
//! Every section has sane defaults so a bare kiosk runs with no file at all.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for camera stream negotiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Camera device index.
    pub device_id: u32,
    /// Requested frame width in pixels (sensor-native landscape).
    pub width: u32,
    /// Requested frame height in pixels.
    pub height: u32,
    /// Target frames per second.
    pub fps: u32,
    /// Prefer a user-facing camera where the platform distinguishes.
    pub user_facing: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_id: 0,
            width: 1920,
            height: 1080,
            fps: 30,
            user_facing: true,
        }
    }
}

impl CaptureConfig {
    /// Creates a configuration with the specified dimensions.
    pub fn with_dimensions(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.fps == 0 || self.fps > 120 {
            return Err(ConfigError::InvalidFrameRate);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("invalid frame dimensions")]
    InvalidDimensions,
    /// Frame rate outside 1-120 fps.
    #[error("invalid frame rate (must be 1-120 fps)")]
    InvalidFrameRate,
    /// Countdown outside 1-60 seconds.
    #[error("invalid countdown length (must be 1-60 seconds)")]
    InvalidCountdown,
    /// JPEG quality outside 1-100.
    #[error("invalid jpeg quality (must be 1-100)")]
    InvalidQuality,
    /// Empty public origin for link minting.
    #[error("delivery origin must not be empty")]
    InvalidOrigin,
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// Config file could not be parsed.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Camera negotiation settings.
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Countdown and visitor-session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Still encoding settings.
    #[serde(default)]
    pub encoding: EncodingConfig,
    /// Delivery server and handoff settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Countdown and visitor-session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Countdown start value in seconds. One tick per second; the final
    /// tick fires the capture.
    pub countdown_start: u32,
    /// Inactivity window after which the kiosk returns to idle.
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            countdown_start: 5,
            idle_timeout_secs: 60,
        }
    }
}

impl SessionConfig {
    /// Validates the session parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.countdown_start == 0 || self.countdown_start > 60 {
            return Err(ConfigError::InvalidCountdown);
        }
        Ok(())
    }
}

/// Still encoding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
    /// Keep the preview's selfie-mirror effect in the saved still.
    ///
    /// The live preview is horizontally mirrored so visitors see
    /// themselves as in a mirror. By default the saved photo undoes
    /// that and shows the scene as cameras see it.
    pub preserve_preview_mirror: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            preserve_preview_mirror: false,
        }
    }
}

impl EncodingConfig {
    /// Validates the encoding parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(ConfigError::InvalidQuality);
        }
        Ok(())
    }
}

/// Delivery server and remote handoff configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Port for the delivery HTTP server.
    pub port: u16,
    /// Public origin embedded in download links and QR codes,
    /// e.g. `https://kiosk.example.com`.
    pub public_origin: String,
    /// Optional remote endpoint to also upload captured stills to.
    /// When unset, photos are served from the kiosk's own store.
    pub upload_url: Option<String>,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            public_origin: "http://localhost:8080".to_string(),
            upload_url: None,
        }
    }
}

impl DeliveryConfig {
    /// Validates the delivery parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_origin.trim().is_empty() {
            return Err(ConfigError::InvalidOrigin);
        }
        Ok(())
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: FileConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.capture.validate()?;
        self.session.validate()?;
        self.encoding.validate()?;
        self.delivery.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimensions_invalid() {
        let mut config = CaptureConfig::default();
        config.width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_zero_countdown_invalid() {
        let config = SessionConfig {
            countdown_start: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCountdown)
        ));
    }

    #[test]
    fn test_quality_bounds() {
        let config = EncodingConfig {
            jpeg_quality: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidQuality)));

        let config = EncodingConfig {
            jpeg_quality: 101,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidQuality)));
    }

    #[test]
    fn test_empty_origin_invalid() {
        let config = DeliveryConfig {
            public_origin: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidOrigin)));
    }

    #[test]
    fn test_parse_partial_file() {
        let toml = r#"
            [session]
            countdown_start = 10
            idle_timeout_secs = 60
        "#;
        let config: FileConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.session.countdown_start, 10);
        // Missing sections fall back to defaults
        assert_eq!(config.delivery.port, 8080);
        assert_eq!(config.encoding.jpeg_quality, 90);
    }
}
