pub mod connection;

pub use connection::{connection_url, create_pool, test_connection};
