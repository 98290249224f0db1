use crate::shared::analysis::layout::LayoutSettings;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api: ApiConfig,
    pub layout: LayoutConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    /// Empty means same origin
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub columns: u32,
    pub cell_height: u32,
    pub margin: u32,
    pub mobile_breakpoint: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PaginationConfig {
    pub rows_per_page: u32,
    pub detail_rows_per_page: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid dashboard config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {key}")]
    Override { key: &'static str, value: String },
}

/// Default configuration embedded in the bundle
const DEFAULT_CONFIG: &str = r#"
[api]
base_url = ""

[layout]
columns = 12
cell_height = 70
margin = 10
mobile_breakpoint = 768

[pagination]
rows_per_page = 50
detail_rows_per_page = 25
"#;

pub const API_URL_ATTR: &str = "data-api-url";
pub const ROWS_PER_PAGE_ATTR: &str = "data-rows-per-page";

impl DashboardConfig {
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            columns: self.layout.columns,
            mobile_breakpoint: self.layout.mobile_breakpoint,
        }
    }

    /// Applies `data-*` overrides; `lookup` returns the attribute value if present
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ATTR) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ROWS_PER_PAGE_ATTR) {
            match raw.trim().parse::<u32>() {
                Ok(rows) if rows > 0 => self.pagination.rows_per_page = rows,
                _ => {
                    return Err(ConfigError::Override {
                        key: ROWS_PER_PAGE_ATTR,
                        value: raw,
                    })
                }
            }
        }
        Ok(())
    }
}

pub fn default_config() -> Result<DashboardConfig, ConfigError> {
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Embedded defaults overridden by attributes of the document root element
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    let mut config = default_config()?;
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element());
    if let Some(root) = root {
        if let Err(e) = config.apply_overrides(|name| root.get_attribute(name)) {
            log::warn!("{}; keeping defaults", e);
        }
    }
    log::debug!("Dashboard config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = default_config().unwrap();
        assert_eq!(config.api.base_url, "");
        assert_eq!(config.layout.columns, 12);
        assert_eq!(config.pagination.rows_per_page, 50);
        assert_eq!(config.pagination.detail_rows_per_page, 25);
    }

    #[test]
    fn test_overrides() {
        let mut config = default_config().unwrap();
        config
            .apply_overrides(|name| match name {
                API_URL_ATTR => Some(" http://10.0.0.5:5000 ".to_string()),
                ROWS_PER_PAGE_ATTR => Some("100".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.5:5000");
        assert_eq!(config.pagination.rows_per_page, 100);

        let rejected = config.apply_overrides(|name| {
            (name == ROWS_PER_PAGE_ATTR).then(|| "0".to_string())
        });
        assert!(matches!(rejected, Err(ConfigError::Override { .. })));
        assert_eq!(config.pagination.rows_per_page, 100);
    }
}
