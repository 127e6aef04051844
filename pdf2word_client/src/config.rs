use serde::de::DeserializeOwned;
use serde::{Serialize, Deserialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use pdf2word_l10n as l10n;

use crate::common;
use crate::converter::PageRange;
use crate::error;

pub const CFG_FILENAME: &str = "config.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[serde(rename(serialize = "converter-path", deserialize = "converter-path"))]
    pub converter_path: Option<String>,
    #[serde(rename(serialize = "page-start", deserialize = "page-start"))]
    pub page_start: usize,
    #[serde(rename(serialize = "page-end", deserialize = "page-end"))]
    pub page_end: Option<usize>,
    pub locale: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            converter_path : None,
            page_start     : 0,
            page_end       : None,
            locale         : None,
        }
    }
}

impl AppConfig {
    pub fn page_range(&self) -> PageRange {
        PageRange::new(self.page_start, self.page_end)
    }

    /// `PDF2WORD_LANGID`, then the configured locale, then the session language.
    pub fn resolve_locale(&self) -> String {
        if let Ok(selected_locale) = env::var(l10n::ENV_VAR_PDF2WORD_LANGID) {
            selected_locale
        } else if let Some(cfg_locale) = &self.locale {
            cfg_locale.clone()
        } else {
            l10n::sys_locale()
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config_dir| config_dir.join(common::NAMESPACE_APP).join(CFG_FILENAME))
}

/// Reads the user configuration, any missing or broken file gives the defaults.
pub fn load_config <T> () -> T where T: Default + DeserializeOwned {
    match config_file_path() {
        Some(config_appfile) => load_config_or_default(&config_appfile),
        None                 => T::default(),
    }
}

pub fn load_config_or_default <T> (config_appfile: &Path) -> T where T: Default + DeserializeOwned {
    if !config_appfile.exists() {
        return T::default();
    }

    match load_config_from(config_appfile) {
        Ok(data) => data,
        Err(ex)  => {
            tracing::warn!("Ignoring configuration file {}: {}", config_appfile.display(), ex);
            T::default()
        }
    }
}

pub fn load_config_from <T> (config_appfile: &Path) -> Result<T, error::Failure> where T: DeserializeOwned {
    let config_appdata = fs::read_to_string(config_appfile)?;
    parse_config(&config_appdata)
}

pub fn parse_config <T> (config_appdata: &str) -> Result<T, error::Failure> where T: DeserializeOwned {
    Ok(toml::from_str(config_appdata)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_gives_defaults() {
        let cfg: AppConfig = parse_config("").unwrap();

        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.page_range(), PageRange::full());
    }

    #[test]
    fn kebab_case_keys_are_read() {
        let cfg: AppConfig = parse_config(r#"
converter-path = "/opt/pdf2docx/bin/pdf2docx"
page-start = 2
page-end = 5
locale = "zh-CN"
"#).unwrap();

        assert_eq!(cfg.converter_path.as_deref(), Some("/opt/pdf2docx/bin/pdf2docx"));
        assert_eq!(cfg.page_range(), PageRange::new(2, Some(5)));
        assert_eq!(cfg.locale.as_deref(), Some("zh-CN"));
    }

    #[test]
    fn malformed_config_is_an_error() {
        let ret: Result<AppConfig, error::Failure> = parse_config("page-start = \"first\"");

        assert!(matches!(ret, Err(error::Failure::ConfigurationError(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let missing = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string()).join(CFG_FILENAME);
        let ret: Result<AppConfig, error::Failure> = load_config_from(&missing);

        assert!(matches!(ret, Err(error::Failure::IoFailed(_))));
    }

    #[test]
    fn broken_or_missing_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&dir).unwrap();
        let cfg_file = dir.join(CFG_FILENAME);

        let cfg: AppConfig = load_config_or_default(&cfg_file);
        assert_eq!(cfg, AppConfig::default());

        fs::write(&cfg_file, "page-start = \"first\"").unwrap();
        let cfg: AppConfig = load_config_or_default(&cfg_file);
        assert_eq!(cfg, AppConfig::default());

        fs::write(&cfg_file, "page-end = 3").unwrap();
        let cfg: AppConfig = load_config_or_default(&cfg_file);
        assert_eq!(cfg.page_range(), PageRange::new(0, Some(3)));

        let _ = fs::remove_dir_all(&dir);
    }
}
