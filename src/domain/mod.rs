// Domain layer: core models and ports (interfaces) for the page and the settings store.

pub mod model;
pub mod ports;
