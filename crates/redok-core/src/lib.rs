//! redok-core - Theme-driven document restyling
//!
//! Core library for redok: a four-stage pipeline (parse, detect, map,
//! generate) that takes a semi-structured document from a container
//! codec, recovers its semantic structure, and re-emits it with a
//! consistent visual design driven entirely by a theme.
//!
//! # Example
//!
//! ```
//! use redok_core::container::{RawBlock, RawDocument};
//! use redok_core::{detect, from_raw, KeywordTable};
//!
//! let raw = RawDocument {
//!     metadata: Default::default(),
//!     blocks: vec![
//!         RawBlock {
//!             style_name: Some("Heading 1".to_string()),
//!             text: "Introduction".to_string(),
//!             ..Default::default()
//!         },
//!         RawBlock {
//!             text: "Note : pensez à sauvegarder.".to_string(),
//!             ..Default::default()
//!         },
//!     ],
//! };
//!
//! let base = from_raw(raw).unwrap();
//! let tree = detect(&base, &KeywordTable::builtin());
//! assert_eq!(tree.headings().count(), 1);
//! ```

pub mod container;
pub mod cover;
pub mod detector;
pub mod error;
pub mod generator;
pub mod keywords;
pub mod mapper;
pub mod parser;
pub mod theme;
pub mod toc;

use std::path::Path;

use log::info;

pub use container::{commit, ContainerCodec, JsonCodec, RawBlock, RawDocument};
pub use cover::split_title;
pub use detector::detect;
pub use error::{ContainerError, Error, ParseError, Result, Stage, ThemeResolutionError};
pub use generator::{
    generate, validate_theme, Field, GenerateOptions, Piece, RenderDoc, RenderOp,
};
pub use keywords::KeywordTable;
pub use mapper::{map, StyledNode};
pub use parser::{from_raw, parse};
pub use theme::{StyleAttributes, TextAlign, Theme};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the full pipeline on one document
///
/// Returns the generated package bytes, fully buffered. Each run is
/// stateless given its inputs; the theme and keyword table are never
/// mutated and may be shared across runs.
pub fn transform(
    codec: &dyn ContainerCodec,
    input: &[u8],
    theme: &Theme,
    keywords: &KeywordTable,
    options: &GenerateOptions,
) -> Result<Vec<u8>> {
    let base = parser::parse(codec, input)?;
    info!("parsed {} blocks", base.len());

    let tree = detector::detect(&base, keywords);
    let styled = mapper::map(&tree, theme)?;
    generator::validate_theme(theme, options)?;
    let doc = generator::generate(&tree, &styled, theme, options)?;

    let bytes = codec.write(&doc).map_err(Error::Container)?;
    info!("generated {} bytes", bytes.len());
    Ok(bytes)
}

/// Run the pipeline and commit the result to `path` atomically
///
/// The destination is only touched after the whole document has been
/// generated and serialized; on any failure it keeps its previous
/// state.
pub fn transform_to_file<P: AsRef<Path>>(
    codec: &dyn ContainerCodec,
    input: &[u8],
    theme: &Theme,
    keywords: &KeywordTable,
    options: &GenerateOptions,
    path: P,
) -> Result<()> {
    let bytes = transform(codec, input, theme, keywords, options)?;
    commit(path, &bytes).map_err(Error::Container)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
