pub mod api;
pub mod args;
pub mod commands;
mod config;
pub mod email;
mod error;
pub mod event;
pub mod model;
pub mod report;
mod utils;


pub use api::{Mode, Providers};
pub use config::{Addresses, Config};
pub use error::Error;
pub use error::Result;
