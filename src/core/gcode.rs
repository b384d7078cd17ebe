//! Minimal G-code lexing shared by stages and the stream context
//!
//! Only what the stages need: separating comments from code, reading
//! letter/number words, and formatting numbers back into text.

use regex::Regex;
use std::sync::LazyLock;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z])\s*([-+]?(?:\d+\.?\d*|\.\d+))").expect("word pattern is valid")
});

/// A piece of a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Code(&'a str),
    /// Includes its delimiters: `(...)` or `;...`
    Comment(&'a str),
}

/// Split a line into code and comment segments, preserving order
pub fn segments(line: &str) -> Vec<Segment<'_>> {
    let bytes = line.as_bytes();
    let mut result = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'(' => {
                if i > start {
                    result.push(Segment::Code(&line[start..i]));
                }
                let end = line[i..]
                    .find(')')
                    .map(|offset| i + offset + 1)
                    .unwrap_or(line.len());
                result.push(Segment::Comment(&line[i..end]));
                start = end;
                i = end;
            }
            b';' => {
                if i > start {
                    result.push(Segment::Code(&line[start..i]));
                }
                result.push(Segment::Comment(&line[i..]));
                start = line.len();
                i = line.len();
            }
            _ => i += 1,
        }
    }

    if start < line.len() {
        result.push(Segment::Code(&line[start..]));
    }
    result
}

/// The line with every comment removed (surrounding whitespace kept)
pub fn strip_comments(line: &str) -> String {
    segments(line)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Code(code) => Some(code),
            Segment::Comment(_) => None,
        })
        .collect()
}

/// A single letter/number word such as `G1` or `X-1.25`
#[derive(Debug, Clone, PartialEq)]
pub struct Word<'a> {
    /// Uppercased word letter
    pub letter: char,
    pub value: f64,
    /// The word as written, including any inner whitespace
    pub raw: &'a str,
    /// Byte offset of the word within the code it was read from
    pub offset: usize,
}

impl Word<'_> {
    /// Whether this is the code `letter` + `number`, e.g. `G` + `2`
    pub fn is_code(&self, letter: char, number: f64) -> bool {
        self.letter == letter && (self.value - number).abs() < 1e-9
    }

    /// The number part of the word as written
    pub fn number_text(&self) -> &str {
        self.raw[1..].trim_start()
    }
}

/// Read every word out of a piece of code (comments must already be removed)
pub fn words(code: &str) -> Vec<Word<'_>> {
    WORD_RE
        .captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let letter = caps.get(1)?.as_str().chars().next()?.to_ascii_uppercase();
            let value = caps.get(2)?.as_str().parse::<f64>().ok()?;
            Some(Word {
                letter,
                value,
                raw: whole.as_str(),
                offset: whole.start(),
            })
        })
        .collect()
}

/// Words of a full line, comments skipped
pub fn line_words(line: &str) -> Vec<(char, f64)> {
    words(&strip_comments(line))
        .into_iter()
        .map(|word| (word.letter, word.value))
        .collect()
}

/// Format a number with at most `decimals` fractional digits, trailing zeros trimmed
pub fn format_number(value: f64, decimals: usize) -> String {
    let mut text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}
