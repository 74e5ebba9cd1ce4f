use anyhow::{Context, Result, bail};
use image_filter::FilterConfig;
use log::debug;
use once_cell::sync::Lazy;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Mutex};

const CARGO_TOML: &str = include_str!("../Cargo.toml");
static CONFIG: Lazy<Mutex<Config>> = Lazy::new(|| Mutex::new(Config::default()));

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(skip)]
    pub app_name: String,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub preview: Preview,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Preview {
    #[derivative(Default(value = "PathBuf::from(\"preview\")"))]
    pub output_dir: PathBuf,

    #[derivative(Default(value = "true"))]
    pub save_original: bool,

    /// Keep a numbered file per preview besides `latest.png`.
    #[derivative(Default(value = "true"))]
    pub keep_history: bool,
}

impl Config {
    /// Loads package metadata, resolves the config path and loads the config file.
    ///
    /// # Parameters
    /// - `config_path`: explicit config file, `None` for the per-user one
    pub fn init(&mut self, config_path: Option<PathBuf>) -> Result<()> {
        let metadata =
            toml::from_str::<toml::Table>(CARGO_TOML).with_context(|| "parse Cargo.toml failed")?;

        self.app_name = metadata
            .get("package")
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("filter-preview")
            .to_string();

        self.config_path = match config_path {
            Some(path) => path,
            None => {
                let app_dirs = AppDirs::new(Some(&self.app_name), true)
                    .with_context(|| "can not find the config directory")?;
                app_dirs
                    .config_dir
                    .join(format!("{}.toml", self.app_name))
            }
        };

        if let Some(dir) = self.config_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("create config dir {} failed", dir.display()))?;
            }
        }

        self.load().with_context(|| "load config file failed")?;
        debug!("{:?}", self);
        Ok(())
    }

    /// Loads configuration from file or writes the defaults if it is missing or broken
    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.is_first_run = self.is_first_run;
                    c.app_name = self.app_name.clone();
                    *self = c;

                    Ok(())
                }
                Err(e) => {
                    log::warn!("parse {} failed: {e}", self.config_path.display());
                    self.is_first_run = true;

                    if let Some(bak_file) = &self.config_path.as_os_str().to_str() {
                        _ = fs::copy(&self.config_path, format!("{}.bak", bak_file));
                    }

                    self.save()
                }
            },
            Err(_) => {
                self.is_first_run = true;
                self.save()
            }
        }
    }

    /// Saves the current configuration to file
    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config to toml format failed. {e:?}")),
        }
    }
}

pub fn init(config_path: Option<PathBuf>) -> Result<()> {
    CONFIG.lock().unwrap().init(config_path)
}

pub fn all() -> Config {
    CONFIG.lock().unwrap().clone()
}

/// Replaces the global configuration and writes it to disk.
pub fn save(config: Config) -> Result<()> {
    let mut all = CONFIG.lock().unwrap();
    *all = config;
    all.save()
}
