//! Structural parsing of the raw block sequence
//!
//! The parser turns the codec's flat block sequence into an initial
//! document tree, preserving source order. Kinds are inferred only from
//! each block's own style name and numbering metadata, never from
//! content heuristics; a block with no recoverable type falls back to a
//! plain paragraph. Semantic enrichment (callouts, procedures, heading
//! promotion) happens later, in detection.

use log::debug;
use regex::Regex;

use redok_ast::{
    BlockKind, DocumentTree, Heading, Image, ListItem, Paragraph, Table, TextRun,
};

use crate::container::{ContainerCodec, RawBlock, RawDocument, RawNumbering};
use crate::error::ParseError;

/// Decode `bytes` through the codec and build the base document tree
pub fn parse(codec: &dyn ContainerCodec, bytes: &[u8]) -> Result<DocumentTree, ParseError> {
    let raw = codec.read(bytes)?;
    from_raw(raw)
}

/// Build the base document tree from an already-decoded raw document
pub fn from_raw(raw: RawDocument) -> Result<DocumentTree, ParseError> {
    let mut tree = DocumentTree::with_metadata(raw.metadata);
    let count = raw.blocks.len();
    let heading_re = heading_style_regex();

    for raw_block in raw.blocks {
        push_raw(&mut tree, raw_block, &heading_re);
    }
    infer_title(&mut tree);

    debug!(
        "parsed {} raw blocks into {} tree blocks ({} headings)",
        count,
        tree.len(),
        tree.headings().count()
    );
    Ok(tree)
}

fn push_raw(tree: &mut DocumentTree, raw: RawBlock, heading_re: &Regex) {
    let style_hint = raw.style_name.clone();
    let runs = runs_of(&raw);

    let (kind, level) = if raw.page_break {
        (BlockKind::PageBreak, 0)
    } else if let Some(image_ref) = raw.image_ref {
        (
            BlockKind::Image(Image {
                image_ref,
                width: raw.width,
                height: raw.height,
                alt: None,
            }),
            0,
        )
    } else if let Some(cells) = raw.table_cells {
        (BlockKind::Table(table_of(cells)), 0)
    } else if let Some(level) = raw
        .style_name
        .as_deref()
        .and_then(|s| heading_level_from_style(s, heading_re))
    {
        (
            BlockKind::Heading(Heading {
                runs,
                section_path: vec![],
            }),
            level,
        )
    } else if let Some(numbering) = raw.numbering {
        (
            BlockKind::ListItem(ListItem {
                runs,
                ordered: numbering == RawNumbering::Decimal,
                ordinal: raw.ordinal,
            }),
            raw.level,
        )
    } else {
        // No recoverable content type: best-effort paragraph
        (BlockKind::Paragraph(Paragraph { runs }), 0)
    };

    let block = tree.push(kind);
    block.style_hint = style_hint;
    block.level = level;
}

fn runs_of(raw: &RawBlock) -> Vec<TextRun> {
    match &raw.runs {
        Some(runs) => runs.clone(),
        None if raw.text.is_empty() => vec![],
        None => vec![TextRun::plain(raw.text.clone())],
    }
}

fn table_of(cells: Vec<Vec<String>>) -> Table {
    let mut rows: Vec<Vec<Vec<TextRun>>> = cells
        .into_iter()
        .map(|row| row.into_iter().map(|c| vec![TextRun::plain(c)]).collect())
        .collect();

    // With two or more rows the first one is treated as the header
    let headers = if rows.len() >= 2 { rows.remove(0) } else { vec![] };
    Table { headers, rows }
}

/// Pattern for the numbered heading style families, compiled once per
/// document
fn heading_style_regex() -> Regex {
    Regex::new(r"(?i)^(?:heading|titre)\s*([1-9])$").unwrap()
}

/// Map a source style name to a heading level, if it names one
///
/// Recognized: "Title" (level 1), "Subtitle" (level 2), and the
/// "Heading N" / "Titre N" families. Anything else is not a heading as
/// far as structural typing is concerned.
fn heading_level_from_style(style: &str, numbered: &Regex) -> Option<u8> {
    let style = style.trim();
    if style.eq_ignore_ascii_case("title") {
        return Some(1);
    }
    if style.eq_ignore_ascii_case("subtitle") {
        return Some(2);
    }
    numbered
        .captures(style)
        .and_then(|caps| caps[1].parse::<u8>().ok())
        .map(|n| n.min(6))
}

/// Fill in a missing document title from the first top-level heading
fn infer_title(tree: &mut DocumentTree) {
    if tree.metadata.title.is_some() {
        return;
    }
    let inferred = tree
        .headings()
        .find(|b| b.level == 1)
        .map(|b| b.raw_text())
        .filter(|t| !t.is_empty());
    if let Some(title) = inferred {
        debug!("inferred document title from first heading: {title}");
        tree.metadata.title = Some(title);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redok_ast::BlockKind;

    fn raw(text: &str) -> RawBlock {
        RawBlock {
            text: text.to_string(),
            ..RawBlock::default()
        }
    }

    fn styled(text: &str, style: &str) -> RawBlock {
        RawBlock {
            style_name: Some(style.to_string()),
            ..raw(text)
        }
    }

    #[test]
    fn test_heading_styles() {
        let re = heading_style_regex();
        assert_eq!(heading_level_from_style("Heading 1", &re), Some(1));
        assert_eq!(heading_level_from_style("heading3", &re), Some(3));
        assert_eq!(heading_level_from_style("Titre 2", &re), Some(2));
        assert_eq!(heading_level_from_style("Title", &re), Some(1));
        assert_eq!(heading_level_from_style("Subtitle", &re), Some(2));
        assert_eq!(heading_level_from_style("Heading 9", &re), Some(6));
        assert_eq!(heading_level_from_style("Quote", &re), None);
    }

    #[test]
    fn test_unknown_style_falls_back_to_paragraph() {
        let tree = from_raw(RawDocument {
            metadata: Default::default(),
            blocks: vec![styled("body text", "FancyCustomStyle")],
        })
        .unwrap();
        assert!(matches!(tree.blocks[0].kind, BlockKind::Paragraph(_)));
        assert_eq!(tree.blocks[0].style_hint.as_deref(), Some("FancyCustomStyle"));
    }

    #[test]
    fn test_source_order_preserved() {
        let tree = from_raw(RawDocument {
            metadata: Default::default(),
            blocks: vec![styled("Intro", "Heading 1"), raw("first"), raw("second")],
        })
        .unwrap();
        assert_eq!(tree.blocks[1].raw_text(), "first");
        assert_eq!(tree.blocks[2].raw_text(), "second");
    }

    #[test]
    fn test_numbered_list_item() {
        let tree = from_raw(RawDocument {
            metadata: Default::default(),
            blocks: vec![RawBlock {
                numbering: Some(RawNumbering::Decimal),
                ordinal: Some(3),
                level: 1,
                ..raw("troisième")
            }],
        })
        .unwrap();
        match &tree.blocks[0].kind {
            BlockKind::ListItem(li) => {
                assert!(li.ordered);
                assert_eq!(li.ordinal, Some(3));
            }
            other => panic!("expected list item, got {other:?}"),
        }
        assert_eq!(tree.blocks[0].level, 1);
    }

    #[test]
    fn test_table_header_split() {
        let tree = from_raw(RawDocument {
            metadata: Default::default(),
            blocks: vec![RawBlock {
                table_cells: Some(vec![
                    vec!["Nom".into(), "Valeur".into()],
                    vec!["a".into(), "1".into()],
                ]),
                ..RawBlock::default()
            }],
        })
        .unwrap();
        match &tree.blocks[0].kind {
            BlockKind::Table(t) => {
                assert_eq!(t.headers.len(), 2);
                assert_eq!(t.rows.len(), 1);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_single_row_table_has_no_header() {
        let tree = from_raw(RawDocument {
            metadata: Default::default(),
            blocks: vec![RawBlock {
                table_cells: Some(vec![vec!["Note : seule cellule".into()]]),
                ..RawBlock::default()
            }],
        })
        .unwrap();
        match &tree.blocks[0].kind {
            BlockKind::Table(t) => assert!(t.is_single_cell()),
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_title_inference() {
        let tree = from_raw(RawDocument {
            metadata: Default::default(),
            blocks: vec![styled("Guide Utilisateur", "Heading 1")],
        })
        .unwrap();
        assert_eq!(tree.metadata.title.as_deref(), Some("Guide Utilisateur"));
    }

    #[test]
    fn test_explicit_title_not_overwritten() {
        let mut meta = redok_ast::DocumentMeta::default();
        meta.title = Some("Titre officiel".to_string());
        let tree = from_raw(RawDocument {
            metadata: meta,
            blocks: vec![styled("Autre chose", "Heading 1")],
        })
        .unwrap();
        assert_eq!(tree.metadata.title.as_deref(), Some("Titre officiel"));
    }
}
