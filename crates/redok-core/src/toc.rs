//! Table of contents synthesis
//!
//! One entry per heading in document order, down to the configured
//! depth. Entries reuse the exact section label rendered in the body
//! and carry a live page-reference field; actual page numbers are
//! resolved by the rendering layer, never computed here.

use redok_ast::{plain_text, BlockKind};

use crate::error::ThemeResolutionError;
use crate::generator::{Field, GenerateOptions, Piece, RenderOp};
use crate::mapper::{resolve_chain, StyledNode, BASE_ROLE};
use crate::theme::Theme;

const DEFAULT_TITLE: &str = "Table des matières";

/// Heading nodes that belong in a TOC of the given depth
pub fn entries<'a, 'b>(
    styled: &'a [StyledNode<'b>],
    max_level: u8,
) -> impl Iterator<Item = &'a StyledNode<'b>> {
    styled.iter().filter(move |node| match &node.block.kind {
        BlockKind::Heading(h) => {
            let depth = h.section_path.len().max(1) as u8;
            depth <= max_level
        }
        _ => false,
    })
}

pub(crate) fn emit(
    styled: &[StyledNode<'_>],
    theme: &Theme,
    options: &GenerateOptions,
    ops: &mut Vec<RenderOp>,
) -> Result<(), ThemeResolutionError> {
    let title_attrs = resolve_chain(theme, &["toc-title", "heading-1", BASE_ROLE])?;
    let title = options
        .toc_title
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    ops.push(RenderOp::Para {
        attrs: title_attrs,
        pieces: vec![Piece::Text(title)],
    });

    for node in entries(styled, options.toc_depth) {
        let BlockKind::Heading(h) = &node.block.kind else {
            continue;
        };
        let depth = h.section_path.len().max(1) as u8;
        let exact = format!("toc-{depth}");
        let attrs = resolve_chain(theme, &[exact.as_str(), "toc", BASE_ROLE])?;
        ops.push(RenderOp::TocEntry {
            attrs,
            label: node.label.clone(),
            title: plain_text(&h.runs),
            level: depth,
            page: Field::PageRef {
                target: node.block.id,
            },
        });
    }

    ops.push(RenderOp::PageBreak);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::detect;
    use crate::keywords::KeywordTable;
    use crate::mapper::map;
    use crate::theme::StyleAttributes;
    use redok_ast::{DocumentTree, Heading, TextRun};

    fn heading_tree(levels: &[u8]) -> DocumentTree {
        let mut base = DocumentTree::new();
        for (i, level) in levels.iter().enumerate() {
            base.push(BlockKind::Heading(Heading {
                runs: vec![TextRun::plain(format!("Titre {i}"))],
                section_path: vec![],
            }))
            .level = *level;
        }
        detect(&base, &KeywordTable::builtin())
    }

    fn body_theme() -> Theme {
        let mut theme = Theme::default();
        theme
            .roles
            .insert("body".into(), StyleAttributes::default());
        theme
    }

    #[test]
    fn test_entry_count_matches_headings() {
        let tree = heading_tree(&[1, 2, 1]);
        let theme = body_theme();
        let styled = map(&tree, &theme).unwrap();
        assert_eq!(entries(&styled, 2).count(), tree.headings().count());
    }

    #[test]
    fn test_depth_filter() {
        let tree = heading_tree(&[1, 2, 3]);
        let theme = body_theme();
        let styled = map(&tree, &theme).unwrap();
        assert_eq!(entries(&styled, 2).count(), 2);
        assert_eq!(entries(&styled, 6).count(), 3);
    }

    #[test]
    fn test_entries_in_document_order() {
        let tree = heading_tree(&[1, 2, 1]);
        let theme = body_theme();
        let styled = map(&tree, &theme).unwrap();
        let mut ops = Vec::new();
        emit(&styled, &theme, &GenerateOptions::default(), &mut ops).unwrap();

        let labels: Vec<Option<String>> = ops
            .iter()
            .filter_map(|op| match op {
                RenderOp::TocEntry { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                Some("Section 01".to_string()),
                Some("1.1".to_string()),
                Some("Section 02".to_string()),
            ]
        );
    }

    #[test]
    fn test_entries_carry_page_refs() {
        let tree = heading_tree(&[1]);
        let theme = body_theme();
        let styled = map(&tree, &theme).unwrap();
        let mut ops = Vec::new();
        emit(&styled, &theme, &GenerateOptions::default(), &mut ops).unwrap();

        let heading_id = tree.headings().next().unwrap().id;
        let page = ops
            .iter()
            .find_map(|op| match op {
                RenderOp::TocEntry { page, .. } => Some(*page),
                _ => None,
            })
            .unwrap();
        assert_eq!(page, Field::PageRef { target: heading_id });
    }
}
