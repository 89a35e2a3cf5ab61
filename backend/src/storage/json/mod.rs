//! File-backed storage: one JSON document per key inside the data directory.

pub mod connection;

pub use connection::JsonConnection;
