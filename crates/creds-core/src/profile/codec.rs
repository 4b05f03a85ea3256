//! Text codec for the credentials file dialect
//!
//! The dialect is a strict subset of INI: `[name]` section headers, each
//! followed by `key = value` lines. There is no quoting, escaping or comment
//! syntax.

use tracing::{debug, warn};

use super::types::{ProfileAttributes, ProfileSet};
use crate::error::{CredsError, Result};

/// Parse credentials file text into a profile set.
///
/// Content before the first section header is ignored. A header without a
/// closing bracket is a format error; `[]` names the empty profile.
pub fn parse(text: &str) -> Result<ProfileSet> {
    let mut set = ProfileSet::new();
    let mut current: Option<String> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            let name = section_name(line, index + 1)?;
            set.insert(name.to_string(), ProfileAttributes::new());
            current = Some(name.to_string());
            continue;
        }

        match &current {
            Some(profile) => {
                if let Some((key, value)) = split_pair(line, index + 1) {
                    set.entry(profile).insert(key, value);
                }
            }
            None => debug!("Ignoring line {} before first section", index + 1),
        }
    }

    Ok(set)
}

/// Parse a header-less block of `key = value` lines
pub fn parse_attributes(text: &str) -> ProfileAttributes {
    text.lines()
        .enumerate()
        .map(|(index, raw)| (index, raw.trim()))
        .filter(|(_, line)| !line.is_empty())
        .filter_map(|(index, line)| split_pair(line, index + 1))
        .collect()
}

/// Serialize a profile set, one section per profile in set order
pub fn serialize(set: &ProfileSet) -> String {
    let mut out = String::new();

    for (name, attributes) in set.iter() {
        out.push_str(&format!("[{}]\n", name));
        for (key, value) in attributes {
            out.push_str(&format!("{} = {}\n", key, value));
        }
        out.push('\n');
    }

    out
}

fn section_name(line: &str, line_no: usize) -> Result<&str> {
    let name = line[1..].strip_suffix(']').ok_or_else(|| CredsError::Format {
        line: line_no,
        message: format!("section header '{}' lacks a closing bracket", line),
    })?;

    Ok(name)
}

fn split_pair(line: &str, line_no: usize) -> Option<(String, String)> {
    match line.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Some((key.trim().to_string(), value.trim().to_string()))
        }
        _ => {
            warn!("Ignoring malformed attribute on line {}", line_no);
            None
        }
    }
}
