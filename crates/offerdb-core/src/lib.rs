//! Shared domain types and configuration for offerdb.

pub mod app_config;
pub mod config;
pub mod error;
pub mod offers;
pub mod regions;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use offers::{
    tab_for_program_type, CanonicalOffer, SPECIAL_PROGRAM_TAB, SPECIAL_PROGRAM_TYPES,
};
pub use regions::RegionCode;
