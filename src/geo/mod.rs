pub mod client;
pub mod detail;
pub mod resolver;
