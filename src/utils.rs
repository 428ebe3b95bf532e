//! Small string helpers shared by the rule classifier and the converters.

#[cfg(not(target_arch = "wasm32"))]
use std::fs::File;
#[cfg(not(target_arch = "wasm32"))]
use std::io::{BufRead, BufReader};

/// Everything before the first occurrence of `separator`. If `separator` does not occur, the
/// whole string is returned.
#[inline]
pub fn substring_before<'a>(s: &'a str, separator: &str) -> &'a str {
    match s.find(separator) {
        Some(i) => &s[..i],
        None => s,
    }
}

/// Everything after the first occurrence of `separator`, or an empty string if it does not
/// occur.
#[inline]
pub fn substring_after<'a>(s: &'a str, separator: &str) -> &'a str {
    match s.find(separator) {
        Some(i) => &s[i + separator.len()..],
        None => "",
    }
}

/// The contents between the first `(` and the last `)`.
pub fn string_in_braces(s: &str) -> &str {
    let start = s.find('(').map(|i| i + 1).unwrap_or(0);
    let end = s.rfind(')').unwrap_or(s.len());
    if start <= end {
        &s[start..end]
    } else {
        ""
    }
}

/// Splits `s` on `separator`, ignoring any occurrence that falls inside a double-quoted span.
pub fn split_outside_double_quotes(s: &str, separator: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == separator && !in_quotes {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Replaces every occurrence of `quote` not already preceded by a backslash with `\` + `quote`.
pub fn escape_unescaped(s: &str, quote: char) -> String {
    let mut escaped = String::with_capacity(s.len());
    let mut previous: Option<char> = None;
    for c in s.chars() {
        if c == quote && previous != Some('\\') {
            escaped.push('\\');
        }
        escaped.push(c);
        previous = Some(c);
    }
    escaped
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read_file_lines(filename: &str) -> std::io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(filename)?);
    reader.lines().collect()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn rules_from_lists(lists: &[String]) -> std::io::Result<Vec<String>> {
    let mut rules: Vec<String> = Vec::new();
    for filename in lists {
        rules.extend(read_file_lines(filename)?);
    }
    Ok(rules)
}

#[cfg(test)]
#[path = "../tests/unit/utils.rs"]
mod unit_tests;
