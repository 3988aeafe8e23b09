//! Clipboard codec: blocks of cell text to and from tab-separated text.
//!
//! Rows are newline separated and columns tab separated. Fields containing a tab, a
//! newline or a quote are quoted, so multi-line text survives a round trip.

pub mod system;

use tracing::warn;

use crate::error::{GridError, Result};

pub use system::SystemClipboard;

/// Serialize a block of cell texts. Rows may be ragged.
pub fn encode(block: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in block {
        writer
            .write_record(row)
            .map_err(|e| GridError::Clipboard(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| GridError::Clipboard(e.to_string()))?;
    let mut text = String::from_utf8(bytes).map_err(|e| GridError::Clipboard(e.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Parse clipboard text into rows of values.
///
/// One trailing line terminator is ignored. A blank line is a row holding one empty
/// value, so the rows after it keep their positions. Text that is not valid quoted TSV
/// falls back to a plain split on newlines and tabs.
pub fn decode(text: &str) -> Vec<Vec<String>> {
    let text = match text.strip_suffix('\n') {
        Some(rest) => rest.strip_suffix('\r').unwrap_or(rest),
        None => text,
    };
    if text.is_empty() {
        return Vec::new();
    }

    let mut rows = Vec::new();
    for line in split_records(text) {
        if line.is_empty() {
            rows.push(vec![String::new()]);
            continue;
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        match reader.records().next() {
            Some(Ok(record)) => rows.push(record.iter().map(str::to_string).collect()),
            Some(Err(e)) => {
                warn!(error = %e, "clipboard text is not valid TSV, splitting plainly");
                return split_plain(text);
            }
            None => rows.push(vec![String::new()]),
        }
    }
    rows
}

/// Split into records on newlines outside quoted fields. A quote opens a quoted field
/// only at the start of a field, as the csv reader treats it.
fn split_records(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut records = Vec::new();
    let (mut start, mut in_quotes, mut field_start) = (0, false, true);
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if in_quotes {
            if b == b'"' {
                if bytes.get(i + 1) == Some(&b'"') {
                    i += 1;
                } else {
                    in_quotes = false;
                }
            }
        } else if b == b'\n' {
            records.push(trim_cr(&text[start..i]));
            start = i + 1;
            field_start = true;
            i += 1;
            continue;
        } else {
            if b == b'"' && field_start {
                in_quotes = true;
            }
            field_start = b == b'\t';
        }
        i += 1;
    }
    records.push(trim_cr(&text[start..]));
    records
}

fn trim_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn split_plain(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

#[cfg(test)]
mod test;
