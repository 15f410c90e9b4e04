//! Output generation
//!
//! The generator walks the styled nodes exactly once and produces a
//! fully buffered render document: cover page, table of contents, body,
//! and document-level running fields. It never computes page numbers;
//! anything layout-dependent is emitted as a deferred [`Field`] the
//! rendering layer resolves. The buffered document is handed to the
//! container codec in one piece, so a failed write leaves nothing
//! half-written.

use log::debug;
use serde::{Deserialize, Serialize};

use redok_ast::{BlockId, BlockKind, CalloutType, DocumentMeta, DocumentTree, TextRun};

use crate::cover;
use crate::error::ThemeResolutionError;
use crate::mapper::{resolve_chain, StyledNode, BASE_ROLE};
use crate::theme::{StyleAttributes, Theme};
use crate::toc;

/// Deferred-resolution placeholder for rendering-time values
///
/// Page numbers depend on layout the pipeline does not control, so they
/// are emitted as live fields and never as literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum Field {
    /// The page the field lands on
    PageNumber,
    /// The page the block with this id lands on
    PageRef { target: BlockId },
}

/// One fragment of a rendered line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Piece {
    Text(String),
    Runs(Vec<TextRun>),
    Field(Field),
    Tab,
}

/// A renderable unit of the output stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOp {
    /// A styled paragraph
    Para {
        attrs: StyleAttributes,
        pieces: Vec<Piece>,
    },
    /// A purely visual themed separator
    AccentBar { attrs: StyleAttributes },
    /// A table with optional header emphasis and zebra striping
    Table {
        attrs: StyleAttributes,
        headers: Vec<Vec<TextRun>>,
        rows: Vec<Vec<Vec<TextRun>>>,
        header_emphasis: bool,
        zebra: bool,
    },
    /// A bordered, shaded callout container
    CalloutBox {
        attrs: StyleAttributes,
        kind: CalloutType,
        title: Option<String>,
        body: Vec<TextRun>,
    },
    Image {
        attrs: StyleAttributes,
        image_ref: String,
        width: Option<u32>,
        height: Option<u32>,
    },
    /// A single list item, bullet or numbered marker chosen by renderer
    ListItem {
        attrs: StyleAttributes,
        runs: Vec<TextRun>,
        ordered: bool,
        ordinal: Option<u32>,
    },
    /// One procedure step with its badge number
    Step {
        attrs: StyleAttributes,
        number: u32,
        runs: Vec<TextRun>,
        description: Vec<TextRun>,
    },
    /// One table-of-contents line
    TocEntry {
        attrs: StyleAttributes,
        label: Option<String>,
        title: String,
        level: u8,
        page: Field,
    },
    PageBreak,
}

/// Document-level running header/footer content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunningFields {
    #[serde(default)]
    pub header: Option<Vec<Piece>>,
    #[serde(default)]
    pub footer: Option<Vec<Piece>>,
}

/// The fully generated document, buffered before any commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderDoc {
    pub meta: DocumentMeta,
    pub running: RunningFields,
    pub ops: Vec<RenderOp>,
}

/// Generation switches, all front matter on by default
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub cover: bool,
    pub toc: bool,
    pub number_sections: bool,
    pub header_footer: bool,
    /// Deepest heading level listed in the table of contents
    ///
    /// Defaults to 6, so every heading gets an entry; lowering it is
    /// the opt-in way to shorten the listing.
    pub toc_depth: u8,
    pub toc_title: Option<String>,
    pub cover_title_override: Option<String>,
    /// Confidentiality or distribution mention, shown on cover and footer
    pub mention: Option<String>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            cover: true,
            toc: true,
            number_sections: true,
            header_footer: true,
            toc_depth: 6,
            toc_title: None,
            cover_title_override: None,
            mention: None,
        }
    }
}

/// Resolve every role chain the generator itself will need
///
/// The cover, TOC, section labels and accent bars use roles that no
/// tree block carries, so block mapping alone does not prove the theme
/// can style them. This runs as part of the map stage; once it passes,
/// [`generate`] cannot fail on theme resolution.
pub fn validate_theme(
    theme: &Theme,
    options: &GenerateOptions,
) -> Result<(), ThemeResolutionError> {
    if options.cover {
        resolve_chain(theme, &["title", "heading-1", BASE_ROLE])?;
        resolve_chain(theme, &["subtitle", BASE_ROLE])?;
        resolve_chain(theme, &["cover-meta", BASE_ROLE])?;
    }
    if options.toc {
        resolve_chain(theme, &["toc-title", "heading-1", BASE_ROLE])?;
        for depth in 1..=options.toc_depth.max(1) {
            let exact = format!("toc-{depth}");
            resolve_chain(theme, &[exact.as_str(), "toc", BASE_ROLE])?;
        }
    }
    if options.number_sections {
        resolve_chain(theme, &["section-label", BASE_ROLE])?;
    }
    // Accent bars accompany top-level headings and the cover
    resolve_chain(theme, &["accent", BASE_ROLE])?;
    Ok(())
}

/// Produce the render document for a mapped tree
pub fn generate(
    tree: &DocumentTree,
    styled: &[StyledNode<'_>],
    theme: &Theme,
    options: &GenerateOptions,
) -> Result<RenderDoc, ThemeResolutionError> {
    let mut ops = Vec::new();

    if options.cover {
        cover::emit(&tree.metadata, theme, options, &mut ops)?;
    }
    if options.toc {
        toc::emit(styled, theme, options, &mut ops)?;
    }
    for node in styled {
        emit_block(node, theme, options, &mut ops)?;
    }

    let running = if options.header_footer {
        running_fields(&tree.metadata, options)
    } else {
        RunningFields::default()
    };

    debug!("generated {} render ops", ops.len());
    Ok(RenderDoc {
        meta: tree.metadata.clone(),
        running,
        ops,
    })
}

fn emit_block(
    node: &StyledNode<'_>,
    theme: &Theme,
    options: &GenerateOptions,
    ops: &mut Vec<RenderOp>,
) -> Result<(), ThemeResolutionError> {
    match &node.block.kind {
        BlockKind::Heading(h) => {
            let top_level = h.section_path.len() <= 1;
            if top_level {
                if options.number_sections {
                    if let Some(label) = &node.label {
                        let attrs = resolve_chain(theme, &["section-label", BASE_ROLE])?;
                        ops.push(RenderOp::Para {
                            attrs,
                            pieces: vec![Piece::Text(label.clone())],
                        });
                    }
                }
                ops.push(RenderOp::Para {
                    attrs: node.attributes.clone(),
                    pieces: vec![Piece::Runs(h.runs.clone())],
                });
                let accent = resolve_chain(theme, &["accent", BASE_ROLE])?;
                ops.push(RenderOp::AccentBar { attrs: accent });
            } else {
                let mut pieces = Vec::new();
                if options.number_sections {
                    if let Some(label) = &node.label {
                        pieces.push(Piece::Text(label.clone()));
                        pieces.push(Piece::Text(" ".to_string()));
                    }
                }
                pieces.push(Piece::Runs(h.runs.clone()));
                ops.push(RenderOp::Para {
                    attrs: node.attributes.clone(),
                    pieces,
                });
            }
        }
        BlockKind::Paragraph(p) => ops.push(RenderOp::Para {
            attrs: node.attributes.clone(),
            pieces: vec![Piece::Runs(p.runs.clone())],
        }),
        BlockKind::Table(t) => ops.push(RenderOp::Table {
            attrs: node.attributes.clone(),
            headers: t.headers.clone(),
            rows: t.rows.clone(),
            header_emphasis: !t.headers.is_empty(),
            zebra: true,
        }),
        BlockKind::ListItem(li) => ops.push(RenderOp::ListItem {
            attrs: node.attributes.clone(),
            runs: li.runs.clone(),
            ordered: li.ordered,
            ordinal: li.ordinal,
        }),
        BlockKind::Image(img) => ops.push(RenderOp::Image {
            attrs: node.attributes.clone(),
            image_ref: img.image_ref.clone(),
            width: img.width,
            height: img.height,
        }),
        BlockKind::Callout(c) => ops.push(RenderOp::CalloutBox {
            attrs: node.attributes.clone(),
            kind: c.callout_type,
            title: c.title.clone(),
            body: c.body.clone(),
        }),
        BlockKind::Procedure(p) => {
            // Numbering always restarts at 1, whatever the source said
            for step in &p.steps {
                ops.push(RenderOp::Step {
                    attrs: node.attributes.clone(),
                    number: step.number,
                    runs: step.runs.clone(),
                    description: step.description.clone(),
                });
            }
        }
        BlockKind::PageBreak => ops.push(RenderOp::PageBreak),
    }
    Ok(())
}

fn running_fields(meta: &DocumentMeta, options: &GenerateOptions) -> RunningFields {
    let header = meta
        .title
        .as_ref()
        .map(|title| vec![Piece::Text(title.clone())]);

    let mut footer = Vec::new();
    if let Some(mention) = &options.mention {
        footer.push(Piece::Text(mention.clone()));
    }
    footer.push(Piece::Tab);
    footer.push(Piece::Field(Field::PageNumber));

    RunningFields {
        header,
        footer: Some(footer),
    }
}
