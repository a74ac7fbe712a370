pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::SiteConfig;
pub use crate::core::{
    duration::format_duration,
    engine::{EngineHandle, TimeEngine},
    parser::parse_price,
    replacer::PriceReplacer,
};
pub use domain::model::Settings;
pub use utils::error::{Result, WageClockError};
