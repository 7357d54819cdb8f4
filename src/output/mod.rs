//! Serialized documents handed to downstream tooling

pub mod schema;

pub use schema::SegmentDocument;
