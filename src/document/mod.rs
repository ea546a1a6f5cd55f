pub mod loader;

pub use loader::{load, Document, IngestError};
