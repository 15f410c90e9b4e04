//! Container codec interface
//!
//! The production package codec (zip + XML) lives outside this crate.
//! The pipeline only sees a flat sequence of typed raw blocks on the way
//! in, and hands a fully buffered render document back on the way out.
//! A JSON-backed reference codec is provided for tests and fixtures.

use std::path::Path;

use serde::{Deserialize, Serialize};

use redok_ast::{DocumentMeta, TextRun};

use crate::error::ContainerError;
use crate::generator::RenderDoc;

/// List numbering scheme reported by the source container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawNumbering {
    Bullet,
    Decimal,
}

/// One untyped content block as the codec yields it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawBlock {
    /// Source style name, when the container recorded one
    #[serde(default)]
    pub style_name: Option<String>,
    /// Flattened text content
    #[serde(default)]
    pub text: String,
    /// Source nesting level (heading outline or list indent)
    #[serde(default)]
    pub level: u8,
    /// Formatted runs, when the container preserved them
    #[serde(default)]
    pub runs: Option<Vec<TextRun>>,
    /// Table cells row by row; present only for table blocks
    #[serde(default)]
    pub table_cells: Option<Vec<Vec<String>>>,
    /// Reference into the container's media store; present for images
    #[serde(default)]
    pub image_ref: Option<String>,
    /// Image width in twentieths of a point
    #[serde(default)]
    pub width: Option<u32>,
    /// Image height in twentieths of a point
    #[serde(default)]
    pub height: Option<u32>,
    /// Numbering scheme for list paragraphs
    #[serde(default)]
    pub numbering: Option<RawNumbering>,
    /// Source ordinal for numbered list paragraphs
    #[serde(default)]
    pub ordinal: Option<u32>,
    /// Explicit page break marker
    #[serde(default)]
    pub page_break: bool,
}

/// A source document as handed over by the codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RawDocument {
    #[serde(default)]
    pub metadata: DocumentMeta,
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

/// Boundary to the external package format
pub trait ContainerCodec {
    /// Decode package bytes into the raw block sequence
    fn read(&self, bytes: &[u8]) -> Result<RawDocument, ContainerError>;

    /// Serialize a fully generated render document to package bytes
    fn write(&self, doc: &RenderDoc) -> Result<Vec<u8>, ContainerError>;
}

/// JSON reference codec
///
/// Reads and writes the raw/render documents as JSON. Used by the test
/// suite and as a fixture format; the zip+XML codec implements the same
/// trait out of tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ContainerCodec for JsonCodec {
    fn read(&self, bytes: &[u8]) -> Result<RawDocument, ContainerError> {
        serde_json::from_slice(bytes).map_err(|e| ContainerError::Malformed(e.to_string()))
    }

    fn write(&self, doc: &RenderDoc) -> Result<Vec<u8>, ContainerError> {
        Ok(serde_json::to_vec_pretty(doc)?)
    }
}

/// Commit generated bytes to a path atomically
///
/// Writes to a sibling temp file first and renames it into place, so the
/// destination either holds the complete document or its previous state.
pub fn commit<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), ContainerError> {
    let path = path.as_ref();
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = std::path::PathBuf::from(tmp);
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_codec_rejects_garbage() {
        let err = JsonCodec.read(b"not json").unwrap_err();
        assert!(matches!(err, ContainerError::Malformed(_)));
    }

    #[test]
    fn test_json_codec_reads_minimal_document() {
        let doc = JsonCodec
            .read(br#"{"blocks": [{"text": "Hello"}]}"#)
            .unwrap();
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].text, "Hello");
        assert!(doc.metadata.title.is_none());
    }

    #[test]
    fn test_raw_block_defaults() {
        let block: RawBlock = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert!(block.style_name.is_none());
        assert!(!block.page_break);
        assert_eq!(block.level, 0);
    }

    #[test]
    fn test_commit_writes_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.json");
        commit(&dest, b"payload").unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
        // No temp file left behind
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }
}
