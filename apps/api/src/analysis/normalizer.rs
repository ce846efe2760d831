//! Normalizer: lower-cases extracted text, strips control characters, and
//! tokenizes while keeping line structure for the formatting heuristics.

use crate::errors::AppError;

/// Lower-cased view of a document.
///
/// `lines` and `raw_lines` are index-aligned: `lines[i]` is `raw_lines[i]`
/// with whitespace runs collapsed and trimmed. Blank lines are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDocument {
    pub lines: Vec<String>,
    /// Original spacing (tabs included), needed to spot column layouts.
    pub raw_lines: Vec<String>,
    pub tokens: Vec<String>,
}

impl NormalizedDocument {
    pub fn word_count(&self) -> usize {
        self.tokens.len()
    }
}

pub fn normalize(raw_text: &str) -> Result<NormalizedDocument, AppError> {
    let unified = raw_text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines = Vec::new();
    let mut raw_lines = Vec::new();

    for line in unified.lines() {
        let raw: String = line
            .chars()
            .filter(|c| *c == '\t' || !c.is_control())
            .collect::<String>()
            .to_lowercase();

        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }

        lines.push(collapsed);
        raw_lines.push(raw.trim_end().to_string());
    }

    if lines.is_empty() {
        return Err(AppError::EmptyDocument);
    }

    let tokens = lines.iter().flat_map(|l| tokenize(l)).collect();

    Ok(NormalizedDocument {
        lines,
        raw_lines,
        tokens,
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | '+' | '#')
}

/// Splits on anything that is not a word character; hyphens and dots only
/// survive inside a token ("node.js", "end-to-end").
fn tokenize(line: &str) -> Vec<String> {
    line.split(|c: char| !is_word_char(c))
        .map(|t| t.trim_matches(|c| c == '-' || c == '.'))
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}
