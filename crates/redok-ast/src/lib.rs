//! redok-ast - Document tree definitions
//!
//! This crate provides the in-memory document tree shared by every stage
//! of the redok restyling pipeline: typed blocks, inline text runs, and
//! document metadata.

pub mod block;
pub mod document;
pub mod inline;

pub use block::{
    Block, BlockId, BlockKind, Callout, CalloutType, Heading, Image, ListItem, Paragraph,
    Procedure, StepItem, Table,
};
pub use document::{DocumentMeta, DocumentTree};
pub use inline::{plain_text, TextRun};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
