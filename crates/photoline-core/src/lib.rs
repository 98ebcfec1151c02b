pub mod error;
pub mod config;
pub mod event;
pub mod signature;
pub mod compose;
pub mod store;
pub mod relay;
pub mod channel;
pub mod router;
pub mod service;
pub mod util;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
