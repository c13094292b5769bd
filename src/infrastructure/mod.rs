pub mod config;
pub mod repository;
pub mod stripe;

pub use config::*;
pub use repository::*;
pub use stripe::*;
