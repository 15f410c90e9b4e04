//! Document tree structure
//!
//! The tree is an ordered sequence of top-level blocks; headings define
//! implicit section nesting (a heading at level N owns everything up to
//! the next heading at level <= N). Order is append-only: later stages
//! annotate or wrap blocks but never reorder them.

use serde::{Deserialize, Serialize};

use crate::block::{Block, BlockId, BlockKind};

/// Document-level metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentMeta {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Document date as the source recorded it, free-form
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Document reference code, e.g. "RT-MAN-2026-001"
    #[serde(default)]
    pub reference: Option<String>,
}

/// The in-memory document representation shared by all pipeline stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DocumentTree {
    pub metadata: DocumentMeta,
    pub blocks: Vec<Block>,
    /// Next id to hand out; ids are monotonic and never reused
    next_id: u64,
}

impl DocumentTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: DocumentMeta) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Start a derived tree that continues this tree's id sequence
    ///
    /// Used when a stage builds a new annotated tree: wrapper blocks it
    /// creates must not collide with ids already handed out.
    pub fn derive(&self) -> Self {
        Self {
            metadata: self.metadata.clone(),
            blocks: Vec::new(),
            next_id: self.next_id,
        }
    }

    /// Hand out the next block id
    pub fn fresh_id(&mut self) -> BlockId {
        let id = BlockId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a block built from a kind payload, assigning a fresh id
    pub fn push(&mut self, kind: BlockKind) -> &mut Block {
        let id = self.fresh_id();
        self.blocks.push(Block::new(id, kind));
        self.blocks.last_mut().unwrap()
    }

    /// Append an already-built block, keeping its id
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Iterate over heading blocks in document order
    pub fn headings(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(|b| b.is_heading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Heading, Paragraph};
    use crate::inline::TextRun;

    fn heading(text: &str) -> BlockKind {
        BlockKind::Heading(Heading {
            runs: vec![TextRun::plain(text)],
            section_path: vec![],
        })
    }

    #[test]
    fn test_push_assigns_monotonic_ids() {
        let mut tree = DocumentTree::new();
        let a = tree.push(heading("One")).id;
        let b = tree
            .push(BlockKind::Paragraph(Paragraph {
                runs: vec![TextRun::plain("body")],
            }))
            .id;
        assert!(a < b);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_derive_continues_id_sequence() {
        let mut tree = DocumentTree::new();
        let last = {
            tree.push(heading("One"));
            tree.push(heading("Two")).id
        };
        let mut derived = tree.derive();
        assert!(derived.is_empty());
        assert!(derived.fresh_id() > last);
    }

    #[test]
    fn test_headings_iterator() {
        let mut tree = DocumentTree::new();
        tree.push(heading("One"));
        tree.push(BlockKind::Paragraph(Paragraph {
            runs: vec![TextRun::plain("body")],
        }));
        tree.push(heading("Two"));
        assert_eq!(tree.headings().count(), 2);
    }
}
