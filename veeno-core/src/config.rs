/// Scene configuration file
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::controls::CameraMode;
use crate::decor::DecorSettings;
use crate::error::{Error, Result};
use crate::params::TextParams;

pub const DEFAULT_FONT: &str = "assets/fonts/veeno.typeface.json";
pub const DEFAULT_FPS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    /// Path or URL of the typeface JSON
    pub font: String,
    /// Path or URL of the matcap image; the built-in matcap is used when unset
    pub matcap: Option<String>,
    /// Path or URL of the image that tints the toon-shaded decorations
    pub toon_texture: Option<String>,
    pub text: TextParams,
    pub decor: DecorSettings,
    pub camera: CameraMode,
    /// Seed for decoration placement; random when unset
    pub seed: Option<u64>,
    pub fps: u32,
    /// Show the axes helper once the font has loaded
    pub axes: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.to_string(),
            matcap: None,
            toon_texture: None,
            text: TextParams::default(),
            decor: DecorSettings::default(),
            camera: CameraMode::default(),
            seed: None,
            fps: DEFAULT_FPS,
            axes: true,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.text
            .validate()
            .map_err(|e| Error::Config(format!("text: {e}")))?;
        if self.font.trim().is_empty() {
            return Err(Error::Config("font path is empty".to_string()));
        }
        if self.fps == 0 {
            return Err(Error::Config("fps must be at least 1".to_string()));
        }
        if !(self.decor.spread.is_finite() && self.decor.spread > 0.0) {
            return Err(Error::Config(format!(
                "decoration spread must be positive, got {}",
                self.decor.spread
            )));
        }
        if !self.decor.amplitude.is_finite() || !self.decor.speed.is_finite() {
            return Err(Error::Config("decoration oscillation must be finite".to_string()));
        }
        Ok(())
    }
}
