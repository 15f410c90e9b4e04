//! Callout trigger configuration
//!
//! The keyword table maps callout types to ordered trigger phrases. It
//! is input data supplied by the caller, not hardcoded in the pipeline;
//! [`KeywordTable::builtin`] provides the stock bilingual set as a
//! convenience. Matching is case-insensitive, anchored at the start of
//! the block text, and requires a colon separator after the phrase.

use regex::Regex;
use serde::{Deserialize, Serialize};

use redok_ast::CalloutType;

/// Trigger phrases per callout type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KeywordTable {
    #[serde(default)]
    pub note: Vec<String>,
    #[serde(default)]
    pub warning: Vec<String>,
    #[serde(default)]
    pub tip: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
}

impl KeywordTable {
    /// Stock French/English trigger set
    pub fn builtin() -> Self {
        Self {
            note: vec!["note".into(), "remarque".into()],
            warning: vec!["attention".into(), "important".into(), "warning".into()],
            tip: vec!["conseil".into(), "bon à savoir".into(), "astuce".into(), "tip".into()],
            info: vec!["info".into()],
        }
    }

    fn entries(&self) -> Vec<(&str, CalloutType)> {
        let mut out = Vec::new();
        for (phrases, callout_type) in [
            (&self.note, CalloutType::Note),
            (&self.warning, CalloutType::Warning),
            (&self.tip, CalloutType::Tip),
            (&self.info, CalloutType::Info),
        ] {
            out.extend(phrases.iter().map(|s| (s.as_str(), callout_type)));
        }
        out
    }

    /// Compile the table into a matcher for one detection run
    ///
    /// Rules are ordered longest phrase first so "bon à savoir" wins
    /// over a shorter phrase that happens to prefix it.
    pub fn compile(&self) -> KeywordMatcher {
        let mut phrases = self.entries();
        phrases.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));

        let rules = phrases
            .into_iter()
            .filter(|(phrase, _)| !phrase.is_empty())
            .map(|(phrase, callout_type)| {
                let pattern = format!(r"(?i)^\s*({})\s*:\s*", regex::escape(phrase));
                // The pattern is built from an escaped literal, it cannot fail
                let regex = Regex::new(&pattern).unwrap();
                KeywordRule {
                    regex,
                    callout_type,
                }
            })
            .collect();
        KeywordMatcher { rules }
    }
}

struct KeywordRule {
    regex: Regex,
    callout_type: CalloutType,
}

/// Compiled trigger rules, evaluated in fixed priority order
pub struct KeywordMatcher {
    rules: Vec<KeywordRule>,
}

/// A successful trigger match at the start of a block's text
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch {
    pub callout_type: CalloutType,
    /// The phrase as written in the source, original casing kept
    pub title: String,
    /// Byte offset where the body starts (past phrase and separator)
    pub body_start: usize,
}

impl KeywordMatcher {
    /// Test a block's text against the rule table
    pub fn match_prefix(&self, text: &str) -> Option<KeywordMatch> {
        for rule in &self.rules {
            if let Some(caps) = rule.regex.captures(text) {
                let full = caps.get(0).expect("group 0 always present");
                let phrase = caps.get(1).expect("pattern has one capture group");
                return Some(KeywordMatch {
                    callout_type: rule.callout_type,
                    title: phrase.as_str().to_string(),
                    body_start: full.end(),
                });
            }
        }
        None
    }
}
