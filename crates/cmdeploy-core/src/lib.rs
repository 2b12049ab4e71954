pub mod actions;
pub mod component;
pub mod config;
pub mod error;
pub mod host;
pub mod invoker;
pub mod io;
pub mod ledger;
pub mod notify;
pub mod operations;
pub mod paths;
pub mod resolver;
pub mod types;

pub use error::{DeployError, Result};
