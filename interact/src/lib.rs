pub mod artifacts;
pub mod connectors;
pub mod credentials;
pub mod dispatch;
pub mod error;
pub mod invoker;
pub mod prompt;
pub mod utils;
