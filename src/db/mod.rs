//! Single-connection SQLite client.
//!
//! Every named database is an SQLite file (or an in-memory database) attached
//! to one connection under its own schema name. Operations that can target a
//! database other than the current one take it as an explicit argument and
//! qualify their SQL with it.

pub mod client;
pub mod error;
pub mod value;

pub use client::*;
pub use error::*;
pub use value::*;
