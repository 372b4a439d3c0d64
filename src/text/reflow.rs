use std::sync::OnceLock;

use regex::Regex;

/// Column width every display line is wrapped to.
pub const WRAP_COLUMNS: usize = 30;

/// One display line of the answer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AnswerLine {
    pub text: String,
    /// Any line of a paragraph after its first: follows a wrap, a sentence end or a `\n`.
    pub is_after_line_break: bool,
    /// First line of every paragraph but the first.
    pub is_new_paragraph: bool,
}

fn paragraph_splitter() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("static paragraph regex"))
}

fn sentence_matcher() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]+|[^.!?]+$").expect("static sentence regex"))
}

/// Split answer text into display lines.
///
/// Paragraphs are separated by blank lines, sentences end in runs of `.`, `!` or `?`, and any
/// sentence longer than [`WRAP_COLUMNS`] characters is greedily wrapped on word boundaries.
pub fn reflow_answer(answer: &str) -> Vec<AnswerLine> {
    let normalized = answer.replace("\r\n", "\n");
    let mut lines = Vec::new();

    let paragraphs = paragraph_splitter()
        .split(&normalized)
        .map(str::trim)
        .filter(|p| !p.is_empty());

    for (p_idx, paragraph) in paragraphs.enumerate() {
        let segments = paragraph
            .split('\n')
            .map(str::trim)
            .filter(|s| !s.is_empty());

        for (s_idx, segment) in segments.enumerate() {
            let mut first_in_segment = true;
            for sentence in split_sentences(segment) {
                for text in wrap_words(&sentence, WRAP_COLUMNS) {
                    let is_first_of_paragraph = first_in_segment && s_idx == 0;
                    lines.push(AnswerLine {
                        text,
                        is_after_line_break: !is_first_of_paragraph,
                        is_new_paragraph: is_first_of_paragraph && p_idx > 0,
                    });
                    first_in_segment = false;
                }
            }
        }
    }

    lines
}

/// Sentences of `segment`, trimmed, terminators kept.
pub fn split_sentences(segment: &str) -> Vec<String> {
    let found: Vec<String> = sentence_matcher()
        .find_iter(segment)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if found.is_empty() && !segment.trim().is_empty() {
        return vec![segment.trim().to_string()];
    }
    found
}

/// Greedy word wrap to at most `columns` characters per line.
///
/// Words longer than `columns` are hard-split so the width limit always holds.
pub fn wrap_words(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(columns) {
            let piece: String = chunk.iter().collect();
            let piece_len = chunk.len();
            if current_len == 0 {
                current = piece;
                current_len = piece_len;
            } else if current_len + 1 + piece_len <= columns {
                current.push(' ');
                current.push_str(&piece);
                current_len += 1 + piece_len;
            } else {
                out.push(std::mem::take(&mut current));
                current = piece;
                current_len = piece_len;
            }
        }
    }
    if current_len > 0 {
        out.push(current);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/text/reflow.rs"]
mod tests;
