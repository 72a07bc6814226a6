pub mod app;
pub mod args;
mod backup;
pub mod codec;
pub mod commands;
mod config;
pub mod defaults;
mod error;
pub mod filter;
pub mod import;
pub mod model;
pub mod preferences;
pub mod storage;
pub mod store;
mod utils;


pub use app::App;
pub use backup::Backup;
pub use config::Config;
pub use error::Error;
pub use error::ErrorType;
pub use error::IntoResult;
pub use error::Result;
