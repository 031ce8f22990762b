pub mod config;
pub mod error;
pub mod providers;
pub mod server;
pub mod stream;
pub mod translate;
pub(crate) mod utils;
