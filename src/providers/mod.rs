pub mod geminiweb;

mod bootstrap;

pub use bootstrap::Providers;
