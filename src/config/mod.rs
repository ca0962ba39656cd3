pub mod mapping_config;
pub mod settings;

pub use mapping_config::*;
pub use settings::Settings;
