pub mod commands;
pub mod config;
pub mod init;
pub mod models;
pub mod prelude;

pub use twilight_gateway as gateway;
pub use twilight_http as http;
