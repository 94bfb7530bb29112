pub mod action;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod governance;
pub mod io;
pub mod paths;
pub mod registry;
pub mod shared;
pub mod types;
pub mod wallet;

pub use error::{MsigError, Result};
