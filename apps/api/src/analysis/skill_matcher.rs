//! Skill Matcher: whole-word / whole-phrase search of every taxonomy skill
//! (canonical name and aliases) over the normalized line text.

use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::NormalizedDocument;
use crate::taxonomy::{Skill, Taxonomy};

/// Mentions needed before a skill reaches full confidence.
const FULL_CONFIDENCE_MENTIONS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMatch {
    pub skill: Skill,
    pub matched: bool,
    /// min(1, occurrences / 3)
    pub confidence: f64,
    pub occurrences: u32,
}

/// Evaluates every taxonomy skill against the document, in taxonomy order.
pub fn match_skills(doc: &NormalizedDocument, taxonomy: &Taxonomy) -> Vec<SkillMatch> {
    taxonomy
        .skills
        .iter()
        .map(|skill| {
            let occurrences: u32 = doc.lines.iter().map(|l| count_in_line(l, skill)).sum();
            SkillMatch {
                skill: skill.clone(),
                matched: occurrences > 0,
                confidence: (occurrences as f64 / FULL_CONFIDENCE_MENTIONS).min(1.0),
                occurrences,
            }
        })
        .collect()
}

/// Counts non-overlapping mentions of a skill in one line. When several search
/// terms hit the same span ("react" and "react.js"), the longest wins.
fn count_in_line(line: &str, skill: &Skill) -> u32 {
    let mut spans: Vec<(usize, usize)> = skill
        .search_terms()
        .flat_map(|term| find_phrase(line, term))
        .collect();

    if spans.is_empty() {
        return 0;
    }

    // Earliest start first, longest first on ties.
    spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

    let mut count = 0;
    let mut cursor = 0;
    for (start, end) in spans {
        if start >= cursor {
            count += 1;
            cursor = end;
        }
    }
    count
}

/// Byte spans of `term` in `line` that sit on word boundaries on both sides.
fn find_phrase(line: &str, term: &str) -> Vec<(usize, usize)> {
    if term.is_empty() {
        return Vec::new();
    }
    line.match_indices(term)
        .map(|(start, m)| (start, start + m.len()))
        .filter(|&(start, end)| is_boundary_before(line, start) && is_boundary_after(line, end))
        .collect()
}

/// Characters that glue onto a word ("c++", "c#") and so never end one.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '+' || c == '#'
}

/// `.` is word-internal when an alphanumeric sits on its far side ("node.js").
/// A hyphen always ends a word, so "python-based" still mentions python;
/// hyphenated names ("t-sql") are matched as whole aliases instead.
fn is_joiner(c: char) -> bool {
    c == '.'
}

fn is_boundary_before(line: &str, start: usize) -> bool {
    let mut before = line[..start].chars().rev();
    match before.next() {
        None => true,
        Some(c) if is_word_char(c) => false,
        Some(c) if is_joiner(c) => !before.next().is_some_and(char::is_alphanumeric),
        Some(_) => true,
    }
}

fn is_boundary_after(line: &str, end: usize) -> bool {
    let mut after = line[end..].chars();
    match after.next() {
        None => true,
        Some(c) if is_word_char(c) => false,
        Some(c) if is_joiner(c) => !after.next().is_some_and(char::is_alphanumeric),
        Some(_) => true,
    }
}
