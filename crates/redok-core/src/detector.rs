//! Semantic enrichment of the document tree
//!
//! Detection runs after parsing and before mapping. It takes the base
//! tree read-only and hands back a new annotated tree: heading levels
//! normalized, callouts wrapped, numbered runs grouped into procedures,
//! and every heading given its section path. All passes are idempotent
//! and order-preserving; no block is ever dropped or reordered.

use log::debug;
use regex::Regex;

use redok_ast::{
    plain_text, Block, BlockKind, Callout, CalloutType, DocumentTree, Heading, ListItem,
    Procedure, StepItem, TextRun,
};

use crate::keywords::{KeywordMatcher, KeywordTable};

/// Table styles that do not count as a distinct callout cue
const DEFAULT_TABLE_STYLES: &[&str] = &["Table Grid", "TableGrid", "TableNormal", "Normal Table"];

/// Annotate a base tree
///
/// The input tree is left untouched; wrapper blocks created here get
/// fresh ids continuing the base tree's sequence.
pub fn detect(base: &DocumentTree, keywords: &KeywordTable) -> DocumentTree {
    let matcher = keywords.compile();

    let tree = normalize_headings(base.clone());
    let tree = detect_callouts(tree, &matcher);
    let mut tree = group_procedures(tree);
    assign_section_paths(&mut tree);

    debug!(
        "detection: {} blocks, {} headings, {} callouts, {} procedures",
        tree.len(),
        tree.headings().count(),
        tree.blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Callout(_)))
            .count(),
        tree.blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Procedure(_)))
            .count(),
    );
    tree
}

// ---------------------------------------------------------------------------
// Pass 1: heading normalization
// ---------------------------------------------------------------------------

/// Clamp heading levels to 1..=6 and promote heading-looking paragraphs
///
/// A paragraph with short ALL-CAPS text and no recognized body style is
/// promoted to a heading one level below the deepest heading seen so
/// far (level 1 when none has been seen yet).
fn normalize_headings(mut tree: DocumentTree) -> DocumentTree {
    let mut deepest: u8 = 0;

    for block in &mut tree.blocks {
        match &block.kind {
            BlockKind::Heading(_) => {
                block.level = block.level.clamp(1, 6);
                deepest = deepest.max(block.level);
            }
            BlockKind::Paragraph(p) => {
                if looks_like_shouted_heading(&plain_text(&p.runs)) {
                    let level = (deepest + 1).clamp(1, 6);
                    let runs = p.runs.clone();
                    block.level = level;
                    block.kind = BlockKind::Heading(Heading {
                        runs,
                        section_path: vec![],
                    });
                    deepest = deepest.max(level);
                }
            }
            _ => {}
        }
    }
    tree
}

fn looks_like_shouted_heading(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > 60 {
        return false;
    }
    // A colon marks a labelled note, not a heading
    if text.ends_with('.') || text.contains(':') {
        return false;
    }
    let has_letters = text.chars().any(|c| c.is_alphabetic());
    has_letters && text == text.to_uppercase()
}

// ---------------------------------------------------------------------------
// Pass 2: callout detection
// ---------------------------------------------------------------------------

struct CalloutSignal {
    callout_type: CalloutType,
    title: Option<String>,
    body: Vec<TextRun>,
}

/// Wrap paragraphs and tables that signal a callout
///
/// Two signal classes per block: a leading trigger keyword, or the
/// structural cue of a single-cell table with a distinct style name.
/// The keyword wins when both fire. Blocks already wrapped, and blocks
/// inside a callout, are never re-evaluated.
fn detect_callouts(tree: DocumentTree, matcher: &KeywordMatcher) -> DocumentTree {
    let mut out = tree.derive();

    for block in tree.blocks {
        let signal = match &block.kind {
            BlockKind::Paragraph(p) => paragraph_signal(p.runs.as_slice(), matcher),
            BlockKind::Table(t) if t.is_single_cell() => {
                let cell = t.cells().next().cloned().unwrap_or_default();
                table_signal(&cell, block.style_hint.as_deref(), matcher)
            }
            _ => None,
        };

        match signal {
            Some(s) => {
                let id = out.fresh_id();
                out.push_block(Block::new(
                    id,
                    BlockKind::Callout(Callout {
                        callout_type: s.callout_type,
                        title: s.title,
                        body: s.body,
                        children: vec![block],
                    }),
                ));
            }
            None => out.push_block(block),
        }
    }
    out
}

fn paragraph_signal(runs: &[TextRun], matcher: &KeywordMatcher) -> Option<CalloutSignal> {
    let text = plain_text(runs);
    let m = matcher.match_prefix(&text)?;
    Some(CalloutSignal {
        callout_type: m.callout_type,
        title: Some(m.title),
        body: runs_after(runs, m.body_start),
    })
}

fn table_signal(
    cell: &[TextRun],
    style_hint: Option<&str>,
    matcher: &KeywordMatcher,
) -> Option<CalloutSignal> {
    // Keyword first, structural cue second
    if let Some(s) = paragraph_signal(cell, matcher) {
        return Some(s);
    }
    let distinct = style_hint.is_some_and(|s| !DEFAULT_TABLE_STYLES.contains(&s));
    if distinct {
        return Some(CalloutSignal {
            callout_type: CalloutType::Info,
            title: None,
            body: cell.to_vec(),
        });
    }
    None
}

/// Clip a run sequence to everything at or after a byte offset
///
/// The offset comes from a regex match on the concatenated run text, so
/// it always lands on a char boundary.
fn runs_after(runs: &[TextRun], offset: usize) -> Vec<TextRun> {
    let mut out = Vec::new();
    let mut pos = 0;
    for run in runs {
        let end = pos + run.text.len();
        if end <= offset {
            pos = end;
            continue;
        }
        if pos >= offset {
            out.push(run.clone());
        } else {
            let mut clipped = run.clone();
            clipped.text = run.text[offset - pos..].to_string();
            out.push(clipped);
        }
        pos = end;
    }
    out
}

// ---------------------------------------------------------------------------
// Pass 3: procedure grouping
// ---------------------------------------------------------------------------

/// Group numbered runs into procedures, greedily and left to right
///
/// Two shapes qualify: a contiguous run of same-level numbered list
/// items with increasing ordinals, or a run of step-prefixed paragraphs
/// ("Étape 1", "Step 2", "3. ..."), each optionally followed by one
/// plain paragraph absorbed as the step description. A run shorter than
/// two stays untouched.
fn group_procedures(tree: DocumentTree) -> DocumentTree {
    let mut out = tree.derive();
    let blocks = tree.blocks;
    let step_re = step_prefix_regex();

    let mut i = 0;
    while i < blocks.len() {
        if let Some((steps, consumed, level)) = take_list_run(&blocks[i..]) {
            let id = out.fresh_id();
            let block = Block {
                id,
                style_hint: None,
                level,
                kind: BlockKind::Procedure(Procedure { steps }),
            };
            out.push_block(block);
            i += consumed;
        } else if let Some((steps, consumed)) = take_step_paragraph_run(&blocks[i..], &step_re) {
            let id = out.fresh_id();
            out.push_block(Block::new(id, BlockKind::Procedure(Procedure { steps })));
            i += consumed;
        } else {
            out.push_block(blocks[i].clone());
            i += 1;
        }
    }
    out
}

fn numbered_item(block: &Block) -> Option<(&ListItem, u32)> {
    match &block.kind {
        BlockKind::ListItem(li) if li.ordered => li.ordinal.map(|o| (li, o)),
        _ => None,
    }
}

fn take_list_run(blocks: &[Block]) -> Option<(Vec<StepItem>, usize, u8)> {
    let (first, mut prev) = numbered_item(blocks.first()?)?;
    let level = blocks[0].level;
    let mut items = vec![first];

    for block in &blocks[1..] {
        match numbered_item(block) {
            // Gaps allowed, a decrease or repeat breaks the run
            Some((li, ordinal)) if block.level == level && ordinal > prev => {
                prev = ordinal;
                items.push(li);
            }
            _ => break,
        }
    }
    if items.len() < 2 {
        return None;
    }

    let consumed = items.len();
    let steps = items
        .into_iter()
        .enumerate()
        .map(|(idx, li)| StepItem {
            number: idx as u32 + 1,
            runs: li.runs.clone(),
            description: vec![],
        })
        .collect();
    Some((steps, consumed, level))
}

fn step_prefix_regex() -> Regex {
    Regex::new(r"(?i)^\s*(?:(?:étape|step)\s+(\d+)|(\d{1,2})[.)])\s*[:.\-]?\s+").unwrap()
}

fn step_prefix(text: &str, re: &Regex) -> Option<(u32, usize)> {
    let caps = re.captures(text)?;
    let number = caps
        .get(1)
        .or_else(|| caps.get(2))?
        .as_str()
        .parse::<u32>()
        .ok()?;
    Some((number, caps.get(0).map(|m| m.end()).unwrap_or(0)))
}

fn take_step_paragraph_run(blocks: &[Block], re: &Regex) -> Option<(Vec<StepItem>, usize)> {
    let mut steps: Vec<StepItem> = Vec::new();
    let mut prev: Option<u32> = None;
    let mut i = 0;

    while i < blocks.len() {
        let BlockKind::Paragraph(p) = &blocks[i].kind else {
            break;
        };
        let text = plain_text(&p.runs);
        match step_prefix(&text, re) {
            Some((n, offset)) if prev.map_or(true, |p| n > p) => {
                let mut step = StepItem {
                    number: steps.len() as u32 + 1,
                    runs: runs_after(&p.runs, offset),
                    description: vec![],
                };
                prev = Some(n);
                i += 1;
                // Absorb one following plain paragraph as the description
                if let Some(BlockKind::Paragraph(next)) = blocks.get(i).map(|b| &b.kind) {
                    let next_text = plain_text(&next.runs);
                    if step_prefix(&next_text, re).is_none()
                        && !looks_like_shouted_heading(&next_text)
                    {
                        step.description = next.runs.clone();
                        i += 1;
                    }
                }
                steps.push(step);
            }
            _ => break,
        }
    }

    if steps.len() < 2 {
        return None;
    }
    Some((steps, i))
}

// ---------------------------------------------------------------------------
// Pass 4: section paths
// ---------------------------------------------------------------------------

/// Number headings in pre-order, contiguous from 1 per sibling group
///
/// Levels that jump deeper than the current nesting allows are clamped
/// one below the enclosing depth, so the resulting paths never skip.
fn assign_section_paths(tree: &mut DocumentTree) {
    let mut counters: Vec<u32> = Vec::new();
    for block in &mut tree.blocks {
        if let BlockKind::Heading(h) = &mut block.kind {
            let level = block.level.max(1) as usize;
            let depth = level.min(counters.len() + 1);
            counters.truncate(depth);
            if counters.len() < depth {
                counters.push(0);
            }
            counters[depth - 1] += 1;
            h.section_path = counters.clone();
        }
    }
}
