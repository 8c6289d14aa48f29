//! Command implementations.

pub mod ask;
pub mod chunks;
pub mod config;

pub use self::ask::execute_ask;
pub use self::chunks::execute_chunks;
pub use self::config::execute_config;
