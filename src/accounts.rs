//! User accounts, password hashing and bearer tokens.

mod password;
mod store;
mod token;

pub use password::{hash_password, verify_password};
pub use store::*;
pub use token::*;
