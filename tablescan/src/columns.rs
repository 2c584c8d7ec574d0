//! Column classification
//!
//! Header keywords are matched ignoring case and whitespace. Registered
//! special columns take precedence over keywords. Any other header names a
//! device, optionally prefixed:
//!
//! - `+p X`: set X in parallel with neighbouring `+p` columns
//! - `-c X`, `-r X`, `-cr X`: no completion and/or readback check for X
//! - `+log X`: only log X, never write it

use crate::ast::{Column, ColumnRole};
use std::collections::HashSet;
use tablescan_core::ScanError;
use tablescan_plugin::{normalize_header, ColumnRegistry, Overrides};

const PARALLEL_PREFIX: &str = "+p";
const LOG_PREFIX: &str = "+log";

/// Classified columns plus the positions of the keyword columns
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    pub columns: Vec<Column>,
    pub comment: Option<usize>,
    pub wait_for: Option<usize>,
    pub value: Option<usize>,
    pub or_time: Option<usize>,
}

impl ColumnLayout {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn role(&self, index: usize) -> Option<&ColumnRole> {
        self.columns.get(index).map(|c| &c.role)
    }
}

/// Classify a header row
pub fn classify(headers: &[String], registry: &ColumnRegistry) -> Result<ColumnLayout, ScanError> {
    let mut layout = ColumnLayout {
        columns: Vec::with_capacity(headers.len()),
        comment: None,
        wait_for: None,
        value: None,
        or_time: None,
    };
    let mut seen = HashSet::new();

    for (index, raw) in headers.iter().enumerate() {
        let header = raw.trim();
        let key = normalize_header(header);

        let role = if registry.contains(header) {
            ColumnRole::Special(header.to_string())
        } else {
            match key.as_str() {
                "comment" => ColumnRole::Comment,
                "waitfor" => ColumnRole::WaitFor,
                "value" => ColumnRole::WaitValue,
                "ortime" => ColumnRole::WaitOrTime,
                "delay" => ColumnRole::Delay,
                _ => device_role(header),
            }
        };

        let repeatable = matches!(role, ColumnRole::Device { .. } | ColumnRole::LogOnly(_));
        if !repeatable && !seen.insert(key) {
            return Err(ScanError::duplicate_column(header));
        }

        match role {
            ColumnRole::Comment => layout.comment = Some(index),
            ColumnRole::WaitFor => layout.wait_for = Some(index),
            ColumnRole::WaitOrTime => layout.or_time = Some(index),
            ColumnRole::WaitValue => {
                match layout.wait_for {
                    Some(w) if w + 1 == index => {}
                    Some(_) => return Err(ScanError::wait_for_value().in_column(header)),
                    None => return Err(ScanError::value_without_wait_for().in_column(header)),
                }
                layout.value = Some(index);
            }
            _ => {}
        }

        layout.columns.push(Column {
            header: header.to_string(),
            role,
        });
    }

    if let Some(wait_for) = layout.wait_for {
        if layout.value != Some(wait_for + 1) {
            let column = headers.get(wait_for + 1).map(|h| h.trim().to_string());
            let mut err = ScanError::wait_for_value();
            if let Some(column) = column {
                err = err.in_column(column);
            }
            return Err(err);
        }
    }

    Ok(layout)
}

/// `[+p] [-c|-r|-cr|-rc] name` or `+log name`
fn device_role(header: &str) -> ColumnRole {
    let (first, rest) = match header.split_once(char::is_whitespace) {
        Some((first, rest)) => (first, rest.trim_start()),
        None => (header, ""),
    };

    if first.eq_ignore_ascii_case(LOG_PREFIX) && !rest.is_empty() {
        return ColumnRole::LogOnly(rest.to_string());
    }

    let (parallel, rest) = if first.eq_ignore_ascii_case(PARALLEL_PREFIX) && !rest.is_empty() {
        (true, rest)
    } else {
        (false, header)
    };
    let (overrides, name) = Overrides::split(rest);

    ColumnRole::Device {
        name: name.to_string(),
        parallel,
        overrides,
    }
}
