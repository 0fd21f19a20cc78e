//! The numbered listing handed to the editor.
//!
//! Each line is `{counter}\t{name}`. Leading whitespace is ignored, a leading
//! `#` comments the line out (deleting its entry), and everything after the
//! whitespace that follows the counter is the name, verbatim.

use crate::errors::{FormatError, FormatErrorKind};
use crate::helpers::listing_path;
use crate::models::{EditedLine, Entry};
use std::collections::HashSet;

/// Writes one line per entry.
pub fn serialize(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(|entry| {
            format!(
                "{}\t{}\n",
                entry.counter,
                listing_path(&entry.original_path, entry.is_directory)
            )
        })
        .collect()
}

/// Parses the edited listing. `max` is the highest counter handed out.
///
/// All lines are validated before anything is returned, so a caller that
/// aborts on error has touched nothing.
pub fn parse(text: &str, max: usize) -> Result<Vec<EditedLine>, FormatError> {
    let mut lines = Vec::new();
    let mut seen = HashSet::new();
    let mut commented = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        let raw = raw.trim_end_matches('\r');
        let line = raw.trim_start();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            // A commented-out entry still names its counter; anything else
            // is free-form commentary.
            if let Ok((counter, _)) = split_line(rest.trim_start(), max) {
                commented.push(counter);
            }
            continue;
        }

        let (counter, name) =
            split_line(line, max).map_err(|kind| FormatError::new(number, kind, raw))?;
        if !seen.insert(counter) {
            return Err(FormatError::new(
                number,
                FormatErrorKind::DuplicateCounter(counter as u64),
                raw,
            ));
        }
        lines.push(EditedLine {
            counter,
            new_name: name.to_string(),
            is_deleted: false,
        });
    }

    for counter in commented {
        if seen.insert(counter) {
            lines.push(EditedLine {
                counter,
                new_name: String::new(),
                is_deleted: true,
            });
        }
    }

    Ok(lines)
}

fn split_line(line: &str, max: usize) -> Result<(usize, &str), FormatErrorKind> {
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    if digits_end == 0 {
        return Err(FormatErrorKind::MissingCounter);
    }
    let (digits, rest) = line.split_at(digits_end);

    let counter: u64 = digits
        .parse()
        .map_err(|_| FormatErrorKind::InvalidCounter(digits.to_string()))?;
    if counter == 0 || counter > max as u64 {
        return Err(FormatErrorKind::OutOfRange { counter, max });
    }

    if rest.is_empty() {
        return Err(FormatErrorKind::EmptyName);
    }
    if !rest.starts_with(char::is_whitespace) {
        return Err(FormatErrorKind::MissingSeparator);
    }
    let name = rest.trim_start();
    if name.is_empty() {
        return Err(FormatErrorKind::EmptyName);
    }

    Ok((counter as usize, name))
}
