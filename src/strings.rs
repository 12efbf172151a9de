//! String inspection and conversion helpers
//! Author: kartik4091
//! Created: 2025-06-04

use tracing::debug;

use crate::error::{Error, Result};

/// True when `s` is present and contains something other than whitespace.
///
/// Accepts both `&str` and `Option<&str>`.
pub fn is_valid_string<'a>(s: impl Into<Option<&'a str>>) -> bool {
    s.into().map_or(false, |s| !s.trim().is_empty())
}

pub fn is_blank<'a>(s: impl Into<Option<&'a str>>) -> bool {
    !is_valid_string(s)
}

/// Trimmed, case-insensitive comparison. Two absent values are equal.
pub fn equals_ignore_case<'a, 'b>(a: impl Into<Option<&'a str>>, b: impl Into<Option<&'b str>>) -> bool {
    match (a.into(), b.into()) {
        (None, None) => true,
        (Some(a), Some(b)) => a.trim().to_lowercase() == b.trim().to_lowercase(),
        _ => false,
    }
}

/// Upper-cases the first character and leaves the rest untouched.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Non-empty and made only of ASCII digits.
pub fn is_numeric<'a>(s: impl Into<Option<&'a str>>) -> bool {
    s.into()
        .map_or(false, |s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
}

pub fn is_alpha_numeric<'a>(s: impl Into<Option<&'a str>>) -> bool {
    s.into()
        .map_or(false, |s| !s.is_empty() && s.chars().all(char::is_alphanumeric))
}

/// `Some(true)` only for a case-insensitive "true"; absent input stays absent.
pub fn string_to_boolean<'a>(s: impl Into<Option<&'a str>>) -> Option<bool> {
    s.into().map(|s| s.eq_ignore_ascii_case("true"))
}

/// Parses a base-10 integer without trimming; anything unparsable is `None`.
pub fn string_to_integer<'a>(s: impl Into<Option<&'a str>>) -> Option<i32> {
    let s = s.into()?;
    match s.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Not an integer {:?}: {}", s, e);
            None
        }
    }
}

pub fn join_string<I, S>(delimiter: &str, parts: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push_str(delimiter);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// Collapses runs of whitespace into one space and trims both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max_chars` characters.
pub fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

pub fn reverse(s: &str) -> String {
    s.chars().rev().collect()
}

/// Splits on whitespace, `-`, `_` and lower-to-upper case transitions.
fn words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for c in s.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev = None;
            continue;
        }
        let boundary = c.is_uppercase()
            && prev.map_or(false, |p| p.is_lowercase() || p.is_ascii_digit());
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev = Some(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

pub fn to_camel_case(s: &str) -> String {
    words(s)
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let lower = word.to_lowercase();
            if i == 0 {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect()
}

pub fn to_snake_case(s: &str) -> String {
    words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Percent-encodes everything outside the unreserved set; space becomes `%20`.
pub fn url_encode(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

pub fn url_decode(s: &str) -> Result<String> {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::parse(format!("Invalid percent-encoded UTF-8 in {:?}: {}", s, e)))
}
