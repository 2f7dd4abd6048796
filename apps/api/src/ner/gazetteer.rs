//! Gazetteer-backed name tagger.
//!
//! The model file is JSON:
//!
//! ```json
//! {
//!   "label": "NAME",
//!   "given_names": ["jane", "john"],
//!   "stop_words": ["resume", "university"],
//!   "max_span_tokens": 3,
//!   "max_input_chars": 200000
//! }
//! ```
//!
//! A name is a run of capitalised words on one line, separated only by spaces
//! or tabs, that starts with a known given name and spans at least two words.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::{Entity, EntityRecognizer, ModelError, NAME_LABEL};

#[derive(Debug, Deserialize)]
struct ModelFile {
    #[serde(default = "default_label")]
    label: String,
    given_names: Vec<String>,
    #[serde(default)]
    stop_words: Vec<String>,
    #[serde(default = "default_max_span_tokens")]
    max_span_tokens: usize,
    #[serde(default = "default_max_input_chars")]
    max_input_chars: usize,
}

fn default_label() -> String {
    NAME_LABEL.to_string()
}

fn default_max_span_tokens() -> usize {
    3
}

fn default_max_input_chars() -> usize {
    200_000
}

#[derive(Debug, Clone)]
pub struct GazetteerModel {
    label: String,
    given_names: HashSet<String>,
    stop_words: HashSet<String>,
    max_span_tokens: usize,
    max_input_chars: usize,
}

/// A word inside one line; offsets are relative to the line.
#[derive(Debug)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    /// Only spaces or tabs separate this token from the previous one.
    joined: bool,
}

impl GazetteerModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let file: ModelFile = serde_json::from_str(raw)?;

        if file.given_names.is_empty() {
            return Err(ModelError::Invalid("given_names is empty".into()));
        }
        if file.max_span_tokens < 2 {
            return Err(ModelError::Invalid(format!(
                "max_span_tokens must be at least 2, got {}",
                file.max_span_tokens
            )));
        }

        Ok(Self {
            label: file.label,
            given_names: normalise(file.given_names),
            stop_words: normalise(file.stop_words),
            max_span_tokens: file.max_span_tokens,
            max_input_chars: file.max_input_chars,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn is_given_name(&self, token: &str) -> bool {
        self.given_names.contains(&token.to_lowercase())
    }

    fn is_name_word(&self, token: &str) -> bool {
        token.chars().next().is_some_and(char::is_uppercase)
            && !self
                .stop_words
                .contains(&token.trim_end_matches('.').to_lowercase())
    }

    fn tag_line(&self, line: &str, line_offset: usize, out: &mut Vec<Entity>) {
        let tokens = tokenize(line);
        let mut i = 0;
        while i < tokens.len() {
            if !(self.is_name_word(tokens[i].text) && self.is_given_name(tokens[i].text)) {
                i += 1;
                continue;
            }

            let mut j = i + 1;
            while j < tokens.len()
                && j - i < self.max_span_tokens
                && tokens[j].joined
                && self.is_name_word(tokens[j].text)
            {
                j += 1;
            }

            if j - i >= 2 {
                let (start, end) = (tokens[i].start, tokens[j - 1].end);
                out.push(Entity {
                    text: line[start..end].to_string(),
                    label: self.label.clone(),
                    start: line_offset + start,
                    end: line_offset + end,
                });
                i = j;
            } else {
                i += 1;
            }
        }
    }
}

impl EntityRecognizer for GazetteerModel {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, ModelError> {
        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(ModelError::InputTooLarge {
                len,
                max: self.max_input_chars,
            });
        }

        let mut entities = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            self.tag_line(line, offset, &mut entities);
            offset += line.len() + 1;
        }
        Ok(entities)
    }
}

fn normalise(words: Vec<String>) -> HashSet<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '\'' | '-' | '.' | '\u{2019}')
}

/// Splits a line into words. Apostrophes and hyphens stay inside words;
/// a trailing period is kept only for single-letter initials ("J.").
fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut gap_is_blank = false;
    let mut word_start: Option<usize> = None;

    let bounds = line
        .char_indices()
        .map(|(idx, c)| (idx, Some(c)))
        .chain(std::iter::once((line.len(), None)));

    for (idx, c) in bounds {
        if c.is_some_and(is_word_char) {
            word_start.get_or_insert(idx);
            continue;
        }
        if let Some(start) = word_start.take() {
            let joined = gap_is_blank && !tokens.is_empty();
            match make_token(line, start, idx, joined) {
                Some(token) => {
                    tokens.push(token);
                    gap_is_blank = true;
                }
                None => gap_is_blank = false,
            }
        }
        if !matches!(c, Some(' ' | '\t' | '\r')) {
            gap_is_blank = false;
        }
    }

    tokens
}

fn make_token(line: &str, start: usize, end: usize, joined: bool) -> Option<Token<'_>> {
    let raw = &line[start..end];
    let lead = raw.len() - raw.trim_start_matches(|c: char| !c.is_alphabetic()).len();
    let mut body = raw[lead..].trim_end_matches(['\'', '-', '\u{2019}']);

    let mut chars = body.chars();
    let is_initial = matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.'), None) if c.is_alphabetic()
    );
    if !is_initial {
        body = body.trim_end_matches(['.', '\'', '-', '\u{2019}']);
    }
    if body.is_empty() {
        return None;
    }

    let start = start + lead;
    Some(Token {
        text: body,
        start,
        end: start + body.len(),
        joined,
    })
}
