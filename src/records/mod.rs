//! Record store — JSON documents of slug-keyed records on the local filesystem

mod store;

pub use store::{Document, RecordStore};
