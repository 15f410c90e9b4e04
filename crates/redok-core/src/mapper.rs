//! Theme resolution: typed blocks to styled nodes
//!
//! The mapper is a pure function of the annotated tree and the theme.
//! It never mutates the tree; it builds a parallel sequence of styled
//! nodes, each borrowing its block and carrying resolved attributes and,
//! for headings, the formatted section label. Calling it twice with the
//! same inputs yields identical output.

use redok_ast::{Block, BlockKind, DocumentTree};

use crate::error::ThemeResolutionError;
use crate::theme::{StyleAttributes, Theme};

/// Role every fallback chain ends at
pub const BASE_ROLE: &str = "body";

/// A block paired with its resolved visual attributes
#[derive(Debug, Clone, PartialEq)]
pub struct StyledNode<'a> {
    pub block: &'a Block,
    /// The role the chain started from, e.g. "callout-warning"
    pub role: String,
    pub attributes: StyleAttributes,
    /// Formatted section label for headings ("Section 01", "1.2")
    pub label: Option<String>,
}

/// Resolve every top-level block of the tree against the theme
pub fn map<'a>(
    tree: &'a DocumentTree,
    theme: &Theme,
) -> Result<Vec<StyledNode<'a>>, ThemeResolutionError> {
    tree.blocks
        .iter()
        .map(|block| {
            let chain = role_chain(block);
            let refs: Vec<&str> = chain.iter().map(|s| s.as_str()).collect();
            let attributes = resolve_chain(theme, &refs)?;
            Ok(StyledNode {
                block,
                role: chain[0].clone(),
                attributes,
                label: section_label(block),
            })
        })
        .collect()
}

/// Fallback chain for a block: exact role, generic role, base role
fn role_chain(block: &Block) -> Vec<String> {
    match &block.kind {
        BlockKind::Heading(h) => {
            let depth = if h.section_path.is_empty() {
                block.level.max(1)
            } else {
                h.section_path.len() as u8
            };
            vec![
                format!("heading-{}", depth.min(6)),
                "heading".to_string(),
                BASE_ROLE.to_string(),
            ]
        }
        BlockKind::Paragraph(_) | BlockKind::PageBreak => vec![BASE_ROLE.to_string()],
        BlockKind::Table(_) => vec!["table".to_string(), BASE_ROLE.to_string()],
        BlockKind::ListItem(_) => vec!["list-item".to_string(), BASE_ROLE.to_string()],
        BlockKind::Image(_) => vec!["image".to_string(), BASE_ROLE.to_string()],
        BlockKind::Callout(c) => vec![
            format!("callout-{}", c.callout_type.role_suffix()),
            "callout".to_string(),
            BASE_ROLE.to_string(),
        ],
        BlockKind::Procedure(_) => vec![
            "procedure-step".to_string(),
            "procedure".to_string(),
            BASE_ROLE.to_string(),
        ],
    }
}

/// Walk a fallback chain and return the first style the theme defines
///
/// Palette tokens in the winning style are resolved to concrete hex
/// values here. Exhausting the chain is a `ThemeResolutionError`.
pub(crate) fn resolve_chain(
    theme: &Theme,
    chain: &[&str],
) -> Result<StyleAttributes, ThemeResolutionError> {
    for role in chain {
        if let Some(attrs) = theme.get(role) {
            return resolve_colors(theme, attrs.clone());
        }
    }
    Err(ThemeResolutionError::MissingRole {
        role: chain.first().copied().unwrap_or(BASE_ROLE).to_string(),
        base: chain.last().copied().unwrap_or(BASE_ROLE).to_string(),
    })
}

fn resolve_colors(
    theme: &Theme,
    mut attrs: StyleAttributes,
) -> Result<StyleAttributes, ThemeResolutionError> {
    if let Some(color) = &attrs.color {
        attrs.color = Some(theme.resolve_color(color)?);
    }
    if let Some(background) = &attrs.background {
        attrs.background = Some(theme.resolve_color(background)?);
    }
    Ok(attrs)
}

/// Human-visible section label for a heading
///
/// Top-level sections read "Section 01"; deeper levels use dotted
/// notation ("1.2"). Identical strings are later reused verbatim by the
/// table of contents.
fn section_label(block: &Block) -> Option<String> {
    let BlockKind::Heading(h) = &block.kind else {
        return None;
    };
    match h.section_path.as_slice() {
        [] => None,
        [top] => Some(format!("Section {top:02}")),
        path => Some(
            path.iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join("."),
        ),
    }
}
