pub mod connection;
pub mod models;
pub mod players;
pub mod results;
pub mod setup;
pub mod teams;
pub mod tournaments;

pub use connection::{DbConn, DbPool, create_memory_pool, create_pool, get_connection};
pub use models::*;
