pub mod api;
pub mod app_config;
pub mod database;
pub mod observability;
pub mod scheduling;

pub use api::*;
pub use app_config::*;
pub use database::*;
pub use observability::*;
pub use scheduling::*;
