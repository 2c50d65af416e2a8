//! CLI command implementations.

pub mod blur;
pub mod calibrate;
pub mod config;
pub mod listen;
pub mod replay;
pub mod reset;
pub mod status;

use std::path::PathBuf;

use wiscreen_calibration_core::EyeGuard;
use wiscreen_common::prefs::JsonFileStore;
use wiscreen_common::AppConfig;
use wiscreen_model::BlurPreset;

/// Effective configuration after applying command-line overrides.
pub struct Context {
    pub config: AppConfig,
}

impl Context {
    pub fn load(
        config_path: Option<PathBuf>,
        prefs: Option<PathBuf>,
        preset: Option<BlurPreset>,
    ) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => AppConfig::load_from(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
            None => AppConfig::load(),
        };

        if let Some(path) = prefs {
            config.prefs_path = path;
        }
        if let Some(preset) = preset {
            let max_ratio = config.blur.max_ratio;
            config.blur = preset.policy().with_max_ratio(max_ratio);
        }

        Ok(Self { config })
    }

    pub fn open_store(&self) -> anyhow::Result<JsonFileStore> {
        JsonFileStore::open(&self.config.prefs_path).map_err(|e| {
            anyhow::anyhow!(
                "Failed to open preferences {}: {e}",
                self.config.prefs_path.display()
            )
        })
    }

    pub fn open_guard(&self) -> anyhow::Result<EyeGuard<JsonFileStore>> {
        Ok(EyeGuard::new(self.open_store()?, self.config.blur)?)
    }
}
