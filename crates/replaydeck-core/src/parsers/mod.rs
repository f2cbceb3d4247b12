//! Readers and extractors for analysis artifacts and replay directories

pub mod artifact;
pub mod preview;
pub mod tree;

pub use artifact::{read_artifact, read_artifact_graceful};
pub use preview::{build_preview, preview_file};
pub use tree::TreeScanner;
