//! Block-level document elements
//!
//! Blocks are the atomic content units of the document tree. Each block
//! carries a stable identifier, the advisory style name it had in the
//! source container, a nesting level, and a kind-specific payload.

use serde::{Deserialize, Serialize};

use crate::inline::{plain_text, TextRun};

/// Stable block identifier
///
/// Assigned once when the block enters the tree, monotonically
/// increasing, never reused. Wrapper blocks created during detection get
/// fresh ids; their children keep the ids they were born with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct BlockId(pub u64);

/// An atomic content unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier, assigned at creation
    pub id: BlockId,
    /// Original style name from the source container, advisory only
    #[serde(default)]
    pub style_hint: Option<String>,
    /// Heading or list nesting depth
    #[serde(default)]
    pub level: u8,
    /// Kind-specific payload
    pub kind: BlockKind,
}

impl Block {
    /// Create a block with no style hint at level 0
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            style_hint: None,
            level: 0,
            kind,
        }
    }

    /// The block's text content, flattened to a plain string
    pub fn raw_text(&self) -> String {
        match &self.kind {
            BlockKind::Heading(h) => plain_text(&h.runs),
            BlockKind::Paragraph(p) => plain_text(&p.runs),
            BlockKind::ListItem(li) => plain_text(&li.runs),
            BlockKind::Table(t) => t
                .cells()
                .map(|c| plain_text(c))
                .collect::<Vec<_>>()
                .join(" "),
            BlockKind::Callout(c) => c
                .children
                .iter()
                .map(|b| b.raw_text())
                .collect::<Vec<_>>()
                .join(" "),
            BlockKind::Procedure(p) => p
                .steps
                .iter()
                .map(|s| plain_text(&s.runs))
                .collect::<Vec<_>>()
                .join(" "),
            BlockKind::Image(_) | BlockKind::PageBreak => String::new(),
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, BlockKind::Heading(_))
    }
}

/// Kind-specific block payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BlockKind {
    /// A section heading
    Heading(Heading),
    /// A body paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
    /// A single list item (bulleted or numbered)
    ListItem(ListItem),
    /// An image reference
    Image(Image),
    /// A highlighted note/warning/tip wrapping original blocks
    Callout(Callout),
    /// A grouped, renumbered sequence of steps
    Procedure(Procedure),
    /// An explicit page break
    PageBreak,
}

/// A section heading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Heading {
    /// Heading text
    pub runs: Vec<TextRun>,
    /// Position in the section hierarchy, filled in during detection
    ///
    /// `[2, 3]` means third child of the second top-level section.
    /// Empty until detection has run.
    #[serde(default)]
    pub section_path: Vec<u32>,
}

/// A body paragraph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Paragraph {
    pub runs: Vec<TextRun>,
}

/// A table with an optional header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Table {
    /// Header row cells, empty when the source table had no header
    #[serde(default)]
    pub headers: Vec<Vec<TextRun>>,
    /// Body rows
    #[serde(default)]
    pub rows: Vec<Vec<Vec<TextRun>>>,
}

impl Table {
    /// Total cell count across header and body
    pub fn cell_count(&self) -> usize {
        self.headers.len() + self.rows.iter().map(|r| r.len()).sum::<usize>()
    }

    /// Whether the table consists of exactly one cell
    pub fn is_single_cell(&self) -> bool {
        self.cell_count() == 1
    }

    /// Iterate over every cell in source order
    pub fn cells(&self) -> impl Iterator<Item = &Vec<TextRun>> {
        self.headers.iter().chain(self.rows.iter().flatten())
    }
}

/// A single list item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ListItem {
    pub runs: Vec<TextRun>,
    /// Numbered item (true) or bulleted (false)
    #[serde(default)]
    pub ordered: bool,
    /// Source ordinal for numbered items, before any renumbering
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// An image reference
///
/// Dimensions are in twentieths of a point, matching the container's
/// native unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Image {
    /// Reference into the source container's media store
    pub image_ref: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Semantic flavor of a callout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutType {
    Note,
    Warning,
    Tip,
    Info,
}

impl CalloutType {
    /// Suffix used when composing the semantic role name
    pub fn role_suffix(&self) -> &'static str {
        match self {
            CalloutType::Note => "note",
            CalloutType::Warning => "warning",
            CalloutType::Tip => "tip",
            CalloutType::Info => "info",
        }
    }
}

/// A highlighted note/warning/tip
///
/// Wraps the original blocks it was detected from. The children are kept
/// byte-identical to their pre-detection state; `title` and `body` are
/// what the generator actually renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    pub callout_type: CalloutType,
    /// Keyword-derived label as written in the source, e.g. "Attention"
    #[serde(default)]
    pub title: Option<String>,
    /// Body content with the trigger keyword and separator stripped
    #[serde(default)]
    pub body: Vec<TextRun>,
    /// The original blocks this callout was detected from, unchanged
    pub children: Vec<Block>,
}

/// One step of a procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StepItem {
    /// Renumbered position, 1-based and contiguous
    pub number: u32,
    /// Step title
    pub runs: Vec<TextRun>,
    /// Optional absorbed follow-up paragraph
    #[serde(default)]
    pub description: Vec<TextRun>,
}

/// A grouped sequence of steps
///
/// Step order equals source order; numbering restarts at 1 regardless of
/// gaps in the source ordinals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Procedure {
    pub steps: Vec<StepItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_text_paragraph() {
        let block = Block::new(
            BlockId(1),
            BlockKind::Paragraph(Paragraph {
                runs: vec![TextRun::plain("Hello "), TextRun::bold("world")],
            }),
        );
        assert_eq!(block.raw_text(), "Hello world");
    }

    #[test]
    fn test_single_cell_table() {
        let one = Table {
            headers: vec![],
            rows: vec![vec![vec![TextRun::plain("Note : x")]]],
        };
        assert!(one.is_single_cell());

        let two = Table {
            headers: vec![vec![TextRun::plain("a")], vec![TextRun::plain("b")]],
            rows: vec![],
        };
        assert!(!two.is_single_cell());
    }

    #[test]
    fn test_callout_keeps_children() {
        let child = Block::new(
            BlockId(3),
            BlockKind::Paragraph(Paragraph {
                runs: vec![TextRun::plain("Attention : danger")],
            }),
        );
        let callout = Callout {
            callout_type: CalloutType::Warning,
            title: Some("Attention".to_string()),
            body: vec![TextRun::plain("danger")],
            children: vec![child.clone()],
        };
        assert_eq!(callout.children[0], child);
        assert_eq!(callout.children[0].id, BlockId(3));
    }

    #[test]
    fn test_callout_type_role_suffix() {
        assert_eq!(CalloutType::Warning.role_suffix(), "warning");
        assert_eq!(CalloutType::Tip.role_suffix(), "tip");
    }

    #[test]
    fn test_block_serde_roundtrip() {
        let block = Block {
            id: BlockId(7),
            style_hint: Some("Heading 1".to_string()),
            level: 1,
            kind: BlockKind::Heading(Heading {
                runs: vec![TextRun::plain("Introduction")],
                section_path: vec![1],
            }),
        };
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(back, block);
    }
}
