//! File domain types

pub mod model;

pub use model::{FileRecord, ProcessingStatus, Segment};
