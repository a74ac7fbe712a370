pub mod apply_loop;
pub mod bridge;
pub mod duration;
pub mod engine;
pub mod parser;
pub mod replacer;
pub mod salary;
pub mod scheduler;

pub use crate::domain::model::{PassReport, Settings};
pub use crate::domain::ports::{PriceDom, SettingsStore};
pub use crate::utils::error::Result;
