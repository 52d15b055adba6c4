use std::fmt;

use anyhow::{ensure, Context, Result};
use regex::Regex;

/// Default width of a ZSJ code inside a longer national identifier,
/// e.g. `SK01012045520` -> `2045520`.
pub const DEFAULT_KEY_WIDTH: usize = 7;

/// Rule deriving a join key from a geometry identifier: the trailing `width`
/// characters, expected to be all digits.
#[derive(Debug, Clone)]
pub struct KeyRule {
    width: usize,
    shape: Regex,
}

impl Default for KeyRule {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_WIDTH).expect("default key width is valid")
    }
}

impl KeyRule {
    pub fn new(width: usize) -> Result<Self> {
        ensure!(width > 0, "[types::zsj_key] key width must be positive");
        let shape = Regex::new(&format!(r"^\d{{{width}}}$"))
            .context("[types::zsj_key] failed to build key pattern")?;
        Ok(Self { width, shape })
    }

    #[inline] pub fn width(&self) -> usize { self.width }

    /// Derive the short key from an identifier.
    /// Identifiers shorter than the width are kept whole and flagged as malformed.
    pub fn derive(&self, identifier: &str) -> ShortKey {
        let identifier = identifier.trim();
        let start = identifier.char_indices()
            .rev()
            .nth(self.width - 1)
            .map_or(0, |(i, _)| i);
        let key = &identifier[start..];

        ShortKey {
            key: key.to_string(),
            well_formed: self.shape.is_match(key),
        }
    }
}

/// Join key derived from a geometry identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShortKey {
    pub key: String,
    /// Whether the key has the expected all-digit shape.
    pub well_formed: bool,
}

impl fmt::Display for ShortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Normalize a population-side code to the same string shape as a short key.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_string()
}
