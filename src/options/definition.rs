//! Immutable, validated metadata for a single command-line option.

use crate::error::{AppError, Result};
use std::fmt;

/// The four values that describe one option: short flag, long flag,
/// whether it takes an argument, and its help text.
///
/// Instances only exist in a valid state; see [`OptionDefinition::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDefinition {
    short: String,
    long: String,
    has_arg: bool,
    description: String,
}

impl OptionDefinition {
    /// Creates a new definition after validating the flag names.
    ///
    /// Either name may be empty, but not both. A short name is a single
    /// ASCII alphanumeric character, `?` or `@`. A long name must not start
    /// with `-` and may only contain ASCII alphanumerics, `-` and `_`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidOptionDefinition` if the names break these rules.
    pub fn new(
        short: impl Into<String>,
        long: impl Into<String>,
        has_arg: bool,
        description: impl Into<String>,
    ) -> Result<Self> {
        let short = short.into();
        let long = long.into();

        if short.is_empty() && long.is_empty() {
            return Err(AppError::InvalidOptionDefinition(
                "an option needs a short or a long name".to_string(),
            ));
        }
        validate_short(&short)?;
        validate_long(&long)?;

        Ok(Self {
            short,
            long,
            has_arg,
            description: description.into(),
        })
    }

    pub fn short(&self) -> &str {
        &self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn has_arg(&self) -> bool {
        self.has_arg
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// The short name as a `char`, if one was given.
    pub fn short_char(&self) -> Option<char> {
        self.short.chars().next()
    }

    /// Stable identifier used when registering the option with `clap`:
    /// the long name when present, the short name otherwise.
    pub fn id(&self) -> &str {
        if self.long.is_empty() {
            &self.short
        } else {
            &self.long
        }
    }
}

impl fmt::Display for OptionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.long.is_empty() {
            write!(f, "-{}", self.short)
        } else {
            write!(f, "--{}", self.long)
        }
    }
}

fn validate_short(short: &str) -> Result<()> {
    if short.is_empty() {
        return Ok(());
    }
    let mut chars = short.chars();
    let first = chars.next();
    if chars.next().is_some() {
        return Err(AppError::InvalidOptionDefinition(format!(
            "short name '{}' must be a single character",
            short
        )));
    }
    match first {
        Some(c) if c.is_ascii_alphanumeric() || c == '?' || c == '@' => Ok(()),
        _ => Err(AppError::InvalidOptionDefinition(format!(
            "short name '{}' contains an illegal character",
            short
        ))),
    }
}

fn validate_long(long: &str) -> Result<()> {
    if long.is_empty() {
        return Ok(());
    }
    if long.starts_with('-') {
        return Err(AppError::InvalidOptionDefinition(format!(
            "long name '{}' must not start with '-'",
            long
        )));
    }
    if let Some(bad) = long
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(AppError::InvalidOptionDefinition(format!(
            "long name '{}' contains illegal character '{}'",
            long, bad
        )));
    }
    Ok(())
}
