//! Domain ports: capabilities the core consumes or exposes.

pub mod page_source;
pub mod record_sink;

pub use page_source::PageSource;
pub use record_sink::RecordSink;
