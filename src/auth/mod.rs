//! Accounts, password hashing and bearer-token sessions.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

pub use handlers::*;
pub use middleware::AuthContext;
