use crate::utils::error::{Result, WageClockError};
use crate::utils::validation::{
    validate_data_attribute, validate_identifier, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// How prices are rendered on the page, plus loop tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub selectors: Selectors,
    pub standalone: Vec<ScopedSelector>,
    pub stamp: StampConfig,
    #[serde(rename = "loop")]
    pub apply_loop: LoopConfig,
}

/// Class names of a structured price container and its parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub price_container: String,
    pub whole: String,
    pub fraction: String,
    pub symbol: String,
    pub offscreen: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            price_container: "a-price".to_string(),
            whole: "a-price-whole".to_string(),
            fraction: "a-price-fraction".to_string(),
            symbol: "a-price-symbol".to_string(),
            offscreen: "a-offscreen".to_string(),
        }
    }
}

/// `#scope_id .class`: bare price strings living outside any container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedSelector {
    pub scope_id: String,
    pub class: String,
}

impl ScopedSelector {
    pub fn new(scope_id: &str, class: &str) -> Self {
        Self {
            scope_id: scope_id.to_string(),
            class: class.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampConfig {
    pub original_attribute: String,
    pub label_attribute: String,
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            original_attribute: "data-original-price".to_string(),
            label_attribute: "data-time-label".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub frame_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
        }
    }
}

impl LoopConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl SiteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WageClockError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn frame_interval(&self) -> Duration {
        self.apply_loop.frame_interval()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let selectors = &self.selectors;
        validate_identifier("selectors.price_container", &selectors.price_container)?;
        validate_identifier("selectors.whole", &selectors.whole)?;
        validate_identifier("selectors.fraction", &selectors.fraction)?;
        validate_identifier("selectors.symbol", &selectors.symbol)?;
        validate_identifier("selectors.offscreen", &selectors.offscreen)?;

        for scoped in &self.standalone {
            validate_identifier("standalone.scope_id", &scoped.scope_id)?;
            validate_identifier("standalone.class", &scoped.class)?;
        }

        validate_data_attribute("stamp.original_attribute", &self.stamp.original_attribute)?;
        validate_data_attribute("stamp.label_attribute", &self.stamp.label_attribute)?;
        if self.stamp.original_attribute == self.stamp.label_attribute {
            return Err(WageClockError::ConfigError {
                message: "stamp.original_attribute and stamp.label_attribute must differ"
                    .to_string(),
            });
        }

        validate_range(
            "loop.frame_interval_ms",
            self.apply_loop.frame_interval_ms,
            1,
            1000,
        )?;

        Ok(())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let selectors = Selectors::default();
        Self {
            standalone: vec![
                ScopedSelector::new("corePrice_feature_div", &selectors.offscreen),
                ScopedSelector::new("corePriceDisplay_desktop_feature_div", &selectors.offscreen),
            ],
            selectors,
            stamp: StampConfig::default(),
            apply_loop: LoopConfig::default(),
        }
    }
}

impl Validate for SiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
