//! Argument conventions shared by the reports
//!
//! `args[0]` is always the command name as typed. Scope values may span
//! several tokens (`Southern Europe`, `North America`); the last token of a
//! "top" report is its row count.

use crate::core::{Result, WorldError};

/// Row count of world-wide "top" reports when none is given
pub const DEFAULT_COUNT: u32 = 5;

/// The tokens after the command name joined by single spaces
pub fn scope(args: &[String], usage: &str) -> Result<String> {
    let value = join(args.get(1..).unwrap_or_default());
    if value.is_empty() {
        return Err(WorldError::invalid_input(usage));
    }
    Ok(value)
}

/// A multi-token scope followed by a mandatory positive count
pub fn scope_and_count(args: &[String], usage: &str) -> Result<(String, u32)> {
    let rest = args.get(1..).unwrap_or_default();
    let Some((last, scope_tokens)) = rest.split_last() else {
        return Err(WorldError::invalid_input(usage));
    };

    let count = parse_count(last, usage)?;
    let value = join(scope_tokens);
    if value.is_empty() {
        return Err(WorldError::invalid_input(usage));
    }
    Ok((value, count))
}

/// An optional positive count, [`DEFAULT_COUNT`] when absent
pub fn optional_count(args: &[String], usage: &str) -> Result<u32> {
    match args.get(1..).unwrap_or_default() {
        [] => Ok(DEFAULT_COUNT),
        [count] => parse_count(count, usage),
        _ => Err(WorldError::invalid_input(usage)),
    }
}

fn parse_count(token: &str, usage: &str) -> Result<u32> {
    match token.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(WorldError::invalid_input(format!(
            "'{}' is not a positive number. {}",
            token, usage
        ))),
    }
}

fn join(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|token| token.trim())
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
