//! Postgres adapter for the record sink.

pub mod connection;
pub mod sink;

pub use connection::SinkConnection;
pub use sink::PostgresSink;
