//! Document acquisition
//!
//! Fetches a referenced document from object storage, stages it locally,
//! and extracts plain text by file type (PDF page by page, text/markdown
//! verbatim).

pub mod acquirer;
pub mod error;
pub mod extract;
pub mod staging;
pub mod store;

pub use acquirer::{AcquireConfig, DocumentAcquirer};
pub use error::{AcquireError, StoreError};
pub use extract::FileType;
pub use store::{BucketStore, DocumentStore, ObjectStoreSource, StoreConfig};
