//! Splits a model completion into numbered variations.
//!
//! A variation starts at a line-leading `N.` marker and runs to the next one.
//! Anything before the first marker (a preamble) is dropped.

use std::sync::LazyLock;

use pw_core::PostVariation;
use regex::Regex;

use crate::error::GenerationError;

/// `N.` plus whitespace at the start of a line, optionally indented.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d+\.\s+").expect("invalid variation marker pattern"));

/// Parse `text` into variations indexed from 1.
///
/// With `strip_markup`, `*`, `#` and backticks are removed from each variation.
///
/// # Errors
///
/// Returns `GenerationError::EmptyGeneration` when no non-empty variation is found.
pub fn parse_variations(text: &str, strip_markup: bool) -> Result<Vec<PostVariation>, GenerationError> {
    let starts: Vec<(usize, usize)> = MARKER.find_iter(text).map(|m| (m.start(), m.end())).collect();

    let variations: Vec<PostVariation> = starts
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, body_start))| {
            let body_end = starts.get(i + 1).map_or(text.len(), |&(next, _)| next);
            clean_segment(&text[body_start..body_end], strip_markup)
        })
        .enumerate()
        .map(|(i, content)| PostVariation {
            index: i + 1,
            content,
        })
        .collect();

    if variations.is_empty() {
        return Err(GenerationError::EmptyGeneration);
    }
    Ok(variations)
}

fn clean_segment(segment: &str, strip_markup: bool) -> Option<String> {
    let mut body = segment.trim_end();
    // Trailing delimiter runs, possibly several separated by whitespace.
    while let Some(rest) = body.strip_suffix("---") {
        body = rest.trim_end_matches('-').trim_end();
    }
    let body = body.trim();

    let cleaned = if strip_markup {
        body.chars()
            .filter(|c| !matches!(c, '*' | '#' | '`'))
            .collect::<String>()
            .trim()
            .to_string()
    } else {
        body.to_string()
    };

    (!cleaned.is_empty()).then_some(cleaned)
}
