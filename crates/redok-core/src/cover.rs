//! Cover page synthesis
//!
//! The cover consumes no tree content: it is driven by document
//! metadata and generation options alone. The title is rendered on two
//! lines, split at a delimiter or whitespace nearest its midpoint.

use chrono::{Datelike, Local};

use redok_ast::DocumentMeta;

use crate::error::ThemeResolutionError;
use crate::generator::{GenerateOptions, Piece, RenderOp};
use crate::mapper::{resolve_chain, BASE_ROLE};
use crate::theme::Theme;

/// Preferred split points, tried before plain whitespace
const SPLIT_DELIMITERS: [&str; 3] = [" — ", " - ", " : "];

pub(crate) fn emit(
    meta: &DocumentMeta,
    theme: &Theme,
    options: &GenerateOptions,
    ops: &mut Vec<RenderOp>,
) -> Result<(), ThemeResolutionError> {
    let title = options
        .cover_title_override
        .clone()
        .or_else(|| meta.title.clone())
        .unwrap_or_else(|| "Document".to_string());

    let title_attrs = resolve_chain(theme, &["title", "heading-1", BASE_ROLE])?;
    let (first, second) = split_title(&title);
    ops.push(RenderOp::Para {
        attrs: title_attrs.clone(),
        pieces: vec![Piece::Text(first)],
    });
    if let Some(second) = second {
        ops.push(RenderOp::Para {
            attrs: title_attrs,
            pieces: vec![Piece::Text(second)],
        });
    }

    let accent = resolve_chain(theme, &["accent", BASE_ROLE])?;
    ops.push(RenderOp::AccentBar { attrs: accent });

    let subtitle_attrs = resolve_chain(theme, &["subtitle", BASE_ROLE])?;
    if let Some(version) = &meta.version {
        ops.push(RenderOp::Para {
            attrs: subtitle_attrs,
            pieces: vec![Piece::Text(format!("Version {version}"))],
        });
    }

    let meta_attrs = resolve_chain(theme, &["cover-meta", BASE_ROLE])?;
    let mut lines = Vec::new();
    if let Some(author) = &meta.author {
        lines.push(author.clone());
    }
    lines.push(
        meta.date
            .clone()
            .unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
    );
    if let Some(mention) = &options.mention {
        lines.push(mention.clone());
    }
    lines.push(
        meta.reference
            .clone()
            .unwrap_or_else(|| auto_reference(&title)),
    );
    for line in lines {
        ops.push(RenderOp::Para {
            attrs: meta_attrs.clone(),
            pieces: vec![Piece::Text(line)],
        });
    }

    ops.push(RenderOp::PageBreak);
    Ok(())
}

/// Split a title across two lines
///
/// Tries the preferred delimiters first, then any whitespace, always
/// picking the split point nearest the midpoint. A title with no
/// splittable boundary stays on one line.
pub fn split_title(title: &str) -> (String, Option<String>) {
    let title = title.trim();
    let mid = title.len() / 2;

    let mut best: Option<(usize, usize, usize)> = None; // (distance, index, skip)
    for delim in SPLIT_DELIMITERS {
        for (idx, _) in title.match_indices(delim) {
            let distance = idx.abs_diff(mid);
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, idx, delim.len()));
            }
        }
    }
    if best.is_none() {
        for (idx, _) in title.match_indices(' ') {
            let distance = idx.abs_diff(mid);
            if best.map_or(true, |(d, _, _)| distance < d) {
                best = Some((distance, idx, 1));
            }
        }
    }

    match best {
        Some((_, idx, skip)) => (
            title[..idx].trim_end().to_string(),
            Some(title[idx + skip..].trim_start().to_string()),
        ),
        None => (title.to_string(), None),
    }
}

/// Reference code for documents that carry none, e.g. "RA-MAN-2026-001"
fn auto_reference(title: &str) -> String {
    let initials: String = title
        .split_whitespace()
        .filter_map(|w| w.chars().find(|c| c.is_alphabetic()))
        .take(3)
        .collect::<String>()
        .to_uppercase();
    let prefix = if initials.is_empty() {
        "DOC".to_string()
    } else {
        initials
    };
    format!("{}-MAN-{}-001", prefix, Local::now().year())
}
