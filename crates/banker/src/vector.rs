// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Amount vectors: validation and human-readable parsing.
//!
//! Callers hand the engine signed integers (TOML integers, CLI arguments) so
//! that a negative entry is reported as [`BankerError::MalformedVector`]
//! rather than silently wrapping. Once validated, amounts are stored as
//! [`Units`].

use crate::BankerError;

/// A count of interchangeable resource units.
pub type Units = u64;

/// Validates a signed amount vector against the expected arity.
///
/// Returns the vector as [`Units`] if it has exactly `arity` entries and none
/// of them is negative.
pub fn validate_amounts(amounts: &[i64], arity: usize) -> Result<Vec<Units>, BankerError> {
    if amounts.len() != arity {
        return Err(BankerError::malformed(format!(
            "expected {arity} entr{}, got {}",
            if arity == 1 { "y" } else { "ies" },
            amounts.len(),
        )));
    }

    amounts
        .iter()
        .enumerate()
        .map(|(i, &a)| {
            Units::try_from(a)
                .map_err(|_| BankerError::malformed(format!("entry {i} is negative ({a})")))
        })
        .collect()
}

/// Parses a comma- or whitespace-separated amount list.
///
/// Accepted formats: `"2,0,1"`, `"2, 0, 1"`, `"2 0 1"`, `"[2, 0, 1]"`.
/// An empty (or `"[]"`) string yields an empty vector. Signs are kept so
/// that [`validate_amounts`] can reject negatives with a precise message.
///
/// # Examples
/// ```
/// use banker::vector::parse_amounts;
///
/// assert_eq!(parse_amounts("3, 0,2").unwrap(), vec![3, 0, 2]);
/// assert_eq!(parse_amounts("[1 -1]").unwrap(), vec![1, -1]);
/// assert!(parse_amounts("1,x").is_err());
/// ```
pub fn parse_amounts(s: &str) -> Result<Vec<i64>, BankerError> {
    let s = s.trim();
    let s = s
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(s);

    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<i64>().map_err(|_| {
                BankerError::malformed(format!(
                    "'{tok}' is not an integer; expected a list such as '2,0,1'"
                ))
            })
        })
        .collect()
}

/// Formats a unit vector as `[a, b, c]`.
pub fn format_units(units: &[Units]) -> String {
    let parts: Vec<String> = units.iter().map(|u| u.to_string()).collect();
    format!("[{}]", parts.join(", "))
}
