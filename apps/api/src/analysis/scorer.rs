//! Scorer: keyword coverage, formatting quality, ATS compatibility, and the
//! weighted overall score. Every sub-score is an integer in [0, 100] and a pure
//! function of the document and its skill matches.
//!
//! Point values and penalties below are product defaults, kept as named
//! constants so they can be tuned without touching the checks themselves.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::analysis::normalizer::NormalizedDocument;
use crate::analysis::skill_matcher::SkillMatch;
use crate::taxonomy::Taxonomy;

// Formatting points (sum to 100)
const HEADERS_MANY_POINTS: u32 = 30;
const HEADERS_ONE_POINTS: u32 = 15;
const LINE_LENGTH_GOOD_POINTS: u32 = 25;
const LINE_LENGTH_FAIR_POINTS: u32 = 10;
const BULLETS_MANY_POINTS: u32 = 25;
const BULLETS_FEW_POINTS: u32 = 10;
const LENGTH_FULL_POINTS: u32 = 20;
const LENGTH_SHORT_POINTS: u32 = 10;

/// Lines longer than this read as unstructured paragraphs.
const MAX_READABLE_LINE_CHARS: usize = 120;
const FULL_LENGTH_WORDS: usize = 150;
const SHORT_LENGTH_WORDS: usize = 75;

// ATS penalties
const NO_HEADERS_PENALTY: u32 = 25;
const ONE_HEADER_PENALTY: u32 = 10;
const SPECIAL_CHARS_PENALTY: u32 = 15;
const MANY_COLUMN_LINES_PENALTY: u32 = 20;
const FEW_COLUMN_LINES_PENALTY: u32 = 10;
const NONSTANDARD_BULLET_PENALTY: u32 = 10;
const NO_EMAIL_PENALTY: u32 = 10;

/// Share of non-whitespace characters that may be decorative before ATS parsing suffers.
const MAX_SPECIAL_CHAR_RATIO: f64 = 0.05;

pub const SECTION_HEADERS: &[&str] = &[
    "summary",
    "professional summary",
    "profile",
    "objective",
    "experience",
    "work experience",
    "professional experience",
    "employment history",
    "work history",
    "education",
    "skills",
    "technical skills",
    "core competencies",
    "projects",
    "certifications",
    "awards",
    "publications",
    "languages",
    "volunteer experience",
    "interests",
    "contact",
];

const STANDARD_BULLETS: &[char] = &['-', '*', '•'];

const NONSTANDARD_BULLETS: &[char] = &[
    '●', '○', '◦', '▪', '■', '□', '◆', '◇', '►', '▶', '➢', '➤', '✓', '✔', '❖', '★', '☆', '·', '‣',
];

/// Punctuation that parsers handle without trouble.
const PLAIN_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '(', ')', '[', ']', '/', '\\', '-', '–', '—', '&',
    '+', '#', '@', '%', '$', '*', '_', '’', '“', '”',
];

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap());

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub keywords: f64,
    pub formatting: f64,
    pub ats: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keywords: 0.4,
            formatting: 0.3,
            ats: 0.3,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.keywords + self.formatting + self.ats
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeScore {
    pub overall: u32,
    pub keywords: u32,
    pub formatting: u32,
    pub ats_compatibility: u32,
}

pub fn score_resume(
    doc: &NormalizedDocument,
    matches: &[SkillMatch],
    taxonomy: &Taxonomy,
    weights: &ScoringWeights,
) -> ResumeScore {
    let keywords = keyword_score(matches, taxonomy);
    let formatting = formatting_score(doc);
    let ats_compatibility = ats_score(doc);
    let overall = overall_score(keywords, formatting, ats_compatibility, weights);

    ResumeScore {
        overall,
        keywords,
        formatting,
        ats_compatibility,
    }
}

/// Weighted mean of the three sub-scores, rounded and clamped to [0, 100].
pub fn overall_score(keywords: u32, formatting: u32, ats: u32, weights: &ScoringWeights) -> u32 {
    let total = weights.total();
    if !total.is_finite() || total <= 0.0 {
        return 0;
    }
    let weighted = weights.keywords * keywords as f64
        + weights.formatting * formatting as f64
        + weights.ats * ats as f64;
    (weighted / total).round().clamp(0.0, 100.0) as u32
}

/// `100 × distinct matched skills / relevant skills`, capped at 100.
///
/// The relevant set is the union of required skills of the career path(s)
/// sharing the most matched skills with the resume. With no overlap at all
/// the whole taxonomy is the denominator.
pub fn keyword_score(matches: &[SkillMatch], taxonomy: &Taxonomy) -> u32 {
    let matched: HashSet<&str> = matches
        .iter()
        .filter(|m| m.matched)
        .map(|m| m.skill.name.as_str())
        .collect();

    let overlap = |path: &crate::taxonomy::CareerPath| {
        path.required_skills
            .keys()
            .filter(|s| matched.contains(s.as_str()))
            .count()
    };

    let best = taxonomy.career_paths.iter().map(overlap).max().unwrap_or(0);

    let relevant = if best == 0 {
        taxonomy.skills.len()
    } else {
        taxonomy
            .career_paths
            .iter()
            .filter(|p| overlap(p) == best)
            .flat_map(|p| p.required_skills.keys())
            .collect::<HashSet<_>>()
            .len()
    };

    if relevant == 0 {
        return 0;
    }
    ((100.0 * matched.len() as f64 / relevant as f64).round() as u32).min(100)
}

pub fn formatting_score(doc: &NormalizedDocument) -> u32 {
    let mut points = 0;

    points += match count_section_headers(doc) {
        0 => 0,
        1 => HEADERS_ONE_POINTS,
        _ => HEADERS_MANY_POINTS,
    };

    let readable = doc
        .lines
        .iter()
        .filter(|l| l.chars().count() <= MAX_READABLE_LINE_CHARS)
        .count() as f64
        / doc.lines.len().max(1) as f64;
    points += if readable >= 0.9 {
        LINE_LENGTH_GOOD_POINTS
    } else if readable >= 0.7 {
        LINE_LENGTH_FAIR_POINTS
    } else {
        0
    };

    points += match doc.lines.iter().filter(|l| is_bullet_line(l)).count() {
        0 => 0,
        1..=2 => BULLETS_FEW_POINTS,
        _ => BULLETS_MANY_POINTS,
    };

    points += match doc.word_count() {
        n if n >= FULL_LENGTH_WORDS => LENGTH_FULL_POINTS,
        n if n >= SHORT_LENGTH_WORDS => LENGTH_SHORT_POINTS,
        _ => 0,
    };

    points.min(100)
}

pub fn ats_score(doc: &NormalizedDocument) -> u32 {
    let mut score: u32 = 100;

    score = score.saturating_sub(match count_section_headers(doc) {
        0 => NO_HEADERS_PENALTY,
        1 => ONE_HEADER_PENALTY,
        _ => 0,
    });

    if special_char_ratio(doc) > MAX_SPECIAL_CHAR_RATIO {
        score = score.saturating_sub(SPECIAL_CHARS_PENALTY);
    }

    let column_lines = doc.raw_lines.iter().filter(|l| has_column_gap(l)).count();
    score = score.saturating_sub(match column_lines {
        0 => 0,
        1..=2 => FEW_COLUMN_LINES_PENALTY,
        _ => MANY_COLUMN_LINES_PENALTY,
    });

    if doc.lines.iter().any(|l| starts_with_any(l, NONSTANDARD_BULLETS)) {
        score = score.saturating_sub(NONSTANDARD_BULLET_PENALTY);
    }

    if !doc.lines.iter().any(|l| EMAIL_RE.is_match(l)) {
        score = score.saturating_sub(NO_EMAIL_PENALTY);
    }

    score
}

/// Distinct standard section headers that appear as standalone lines.
pub fn count_section_headers(doc: &NormalizedDocument) -> usize {
    doc.lines
        .iter()
        .filter_map(|l| {
            let candidate = l.trim_end_matches(':').trim();
            SECTION_HEADERS.iter().find(|h| **h == candidate)
        })
        .collect::<HashSet<_>>()
        .len()
}

fn is_bullet_line(line: &str) -> bool {
    let mut chars = line.chars();
    match chars.next() {
        Some(c) if STANDARD_BULLETS.contains(&c) => chars.next() == Some(' '),
        Some(c) if NONSTANDARD_BULLETS.contains(&c) => true,
        Some(c) if c.is_ascii_digit() => {
            let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
            rest.starts_with(". ") || rest.starts_with(") ")
        }
        _ => false,
    }
}

fn starts_with_any(line: &str, glyphs: &[char]) -> bool {
    line.chars().next().is_some_and(|c| glyphs.contains(&c))
}

fn special_char_ratio(doc: &NormalizedDocument) -> f64 {
    let mut total = 0usize;
    let mut special = 0usize;
    for c in doc.lines.iter().flat_map(|l| l.chars()) {
        if c.is_whitespace() {
            continue;
        }
        total += 1;
        if !c.is_alphanumeric()
            && !PLAIN_PUNCTUATION.contains(&c)
            && !STANDARD_BULLETS.contains(&c)
            && !NONSTANDARD_BULLETS.contains(&c)
        {
            special += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        special as f64 / total as f64
    }
}

/// A tab or a run of three or more spaces between words: text laid out in
/// columns or tables.
fn has_column_gap(raw_line: &str) -> bool {
    let content = raw_line.trim();
    content.contains('\t') || content.contains("   ")
}
