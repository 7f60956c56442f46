//! Character-level scanning over a single source line.
//!
//! Every function takes the line as a char slice plus a char index and returns
//! the index just past what it consumed, so callers can report columns and
//! compare how far competing parses got.

use dg_core::Enclosure;

/// A scan failure at a char index of the line being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub message: &'static str,
    pub pos: usize,
}

impl ScanError {
    #[must_use]
    pub const fn new(message: &'static str, pos: usize) -> Self {
        Self { message, pos }
    }
}

pub type ScanResult<T> = Result<(T, usize), ScanError>;

#[must_use]
pub fn skip_blank(line: &[char], pos: usize) -> usize {
    let mut pos = pos;
    while matches!(line.get(pos), Some(' ' | '\t')) {
        pos += 1;
    }
    pos
}

/// Truncates at the first `#` that is not inside a `"..."` span.
#[must_use]
pub fn strip_comment(line: &[char]) -> &[char] {
    let mut in_quote = false;
    for (index, ch) in line.iter().enumerate() {
        match ch {
            '"' => in_quote = !in_quote,
            '#' if !in_quote => return &line[..index],
            _ => {}
        }
    }
    line
}

/// Greedy run of ASCII letters after optional blanks. Yields an empty string
/// and the original position when no letter follows.
#[must_use]
pub fn scan_letters(line: &[char], pos: usize) -> (String, usize) {
    let start = skip_blank(line, pos);
    let end = line[start.min(line.len())..]
        .iter()
        .position(|ch| !ch.is_ascii_alphabetic())
        .map_or(line.len(), |offset| start + offset);
    if end <= start {
        return (String::new(), pos);
    }
    (line[start..end].iter().collect(), end)
}

/// A `"..."` string after optional blanks; the text stops at the next quote.
pub fn scan_quoted(line: &[char], pos: usize) -> ScanResult<String> {
    let start = skip_blank(line, pos);
    if line.get(start) != Some(&'"') {
        return Err(ScanError::new("invalid string", start));
    }
    let body = start + 1;
    let Some(offset) = line[body..].iter().position(|ch| *ch == '"') else {
        return Err(ScanError::new("invalid string", start));
    };
    let close = body + offset;
    Ok((line[body..close].iter().collect(), close + 1))
}

/// `[name]`, `(name)`, `/name/` or `<name>`.
pub fn scan_enclosed_reference(line: &[char], pos: usize) -> ScanResult<(String, Enclosure)> {
    scan_enclosed(line, pos, |line, inner| {
        let (name, end) = scan_letters(line, inner);
        if name.is_empty() {
            return Err(ScanError::new("expected a variable name", skip_blank(line, inner)));
        }
        Ok((name, end))
    })
}

/// `["text"]`, `("text")`, `/"text"/` or `<"text">`.
pub fn scan_enclosed_literal(line: &[char], pos: usize) -> ScanResult<(String, Enclosure)> {
    scan_enclosed(line, pos, scan_quoted)
}

fn scan_enclosed(
    line: &[char],
    pos: usize,
    inner: impl FnOnce(&[char], usize) -> ScanResult<String>,
) -> ScanResult<(String, Enclosure)> {
    let open = skip_blank(line, pos);
    let Some(enclosure) = line.get(open).copied().and_then(Enclosure::from_opener) else {
        return Err(ScanError::new("string should be enclosed", open));
    };
    let (text, after) = inner(line, open + 1)?;
    let close = skip_blank(line, after);
    if line.get(close) != Some(&enclosure.closer()) {
        return Err(ScanError::new("invalid enclosure", close));
    }
    Ok(((text, enclosure), close + 1))
}
