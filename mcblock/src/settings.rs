use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct RegionSettings {
    pub extension: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of cached regions; 0 disables the cache.
    pub capacity: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub region: RegionSettings,
    pub cache: CacheSettings,
}

impl Settings {
    pub fn config_builder() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(
            include_str!("settings_default.toml"),
            FileFormat::Toml,
        ))
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Settings> {
        let region: RegionSettings = config.get("region")?;
        if region.extension.is_empty() {
            return Err(anyhow::anyhow!("region.extension must not be empty"));
        }
        Ok(Settings {
            region,
            cache: config.get("cache")?,
        })
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            region: RegionSettings {
                extension: "mca".to_owned(),
            },
            cache: CacheSettings { capacity: 0 },
        }
    }
}
