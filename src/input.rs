use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenerationMode {
    #[default]
    General,
    SixDigit,
    EightDigit,
}

impl GenerationMode {
    pub const ALL: [Self; 3] = [Self::General, Self::SixDigit, Self::EightDigit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::SixDigit => "6-digit",
            Self::EightDigit => "8-digit",
        }
    }

    pub fn required_digits(&self) -> Option<usize> {
        match self {
            Self::General => None,
            Self::SixDigit => Some(6),
            Self::EightDigit => Some(8),
        }
    }

    pub fn output_len(&self) -> usize {
        self.required_digits().unwrap_or(crate::engine::GENERAL_LENGTH)
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown generation mode \"{0}\" (expected general, 6-digit or 8-digit)")]
pub struct ParseModeError(String);

impl FromStr for GenerationMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseModeError(s.to_string()))
    }
}

/// Which character of the general-mode prefix gets uppercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CapitalizationRule {
    #[default]
    FirstAlphabetic,
    FirstCharacter,
}

#[derive(Clone)]
pub struct DerivationInput {
    pub master_secret: Zeroizing<String>,
    pub salt: Zeroizing<String>,
    pub mode: GenerationMode,
    pub year_suffix: bool,
    pub underscore_wrap: bool,
    pub capitalization: CapitalizationRule,
}

impl DerivationInput {
    pub fn new(master_secret: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            master_secret: Zeroizing::new(master_secret.into()),
            salt: Zeroizing::new(salt.into()),
            mode: GenerationMode::default(),
            year_suffix: false,
            underscore_wrap: false,
            capitalization: CapitalizationRule::default(),
        }
    }

    pub fn with_mode(mut self, mode: GenerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_year_suffix(mut self, enabled: bool) -> Self {
        self.year_suffix = enabled;
        self
    }

    pub fn with_underscore_wrap(mut self, enabled: bool) -> Self {
        self.underscore_wrap = enabled;
        self
    }

    pub fn with_capitalization(mut self, rule: CapitalizationRule) -> Self {
        self.capitalization = rule;
        self
    }

    pub fn has_empty_field(&self) -> bool {
        self.master_secret.is_empty() || self.salt.is_empty()
    }

    // `year` is only called when the suffix is enabled
    pub fn effective_salt(&self, year: impl FnOnce() -> i32) -> Zeroizing<String> {
        let mut salt = Zeroizing::new(String::with_capacity(self.salt.len() + 4));
        salt.push_str(&self.salt);
        if self.year_suffix {
            salt.push_str(&year().to_string());
        }
        salt
    }

    /// Secret and effective salt joined with no delimiter, so different
    /// splits of the same string hash identically.
    pub fn message(&self, year: impl FnOnce() -> i32) -> Zeroizing<String> {
        let salt = self.effective_salt(year);
        let mut message =
            Zeroizing::new(String::with_capacity(self.master_secret.len() + salt.len()));
        message.push_str(&self.master_secret);
        message.push_str(&salt);
        message
    }
}

impl fmt::Debug for DerivationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationInput")
            .field("master_secret", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("mode", &self.mode)
            .field("year_suffix", &self.year_suffix)
            .field("underscore_wrap", &self.underscore_wrap)
            .field("capitalization", &self.capitalization)
            .finish()
    }
}

/// Trim and NFC-normalize a user entry. Changes the derived value for
/// inputs not already in this form.
pub fn normalize(s: &str) -> Zeroizing<String> {
    Zeroizing::new(s.trim().nfc().collect())
}

pub fn control_character_positions(s: &str) -> Vec<usize> {
    s.chars()
        .enumerate()
        .filter(|(_, c)| c.is_control())
        .map(|(pos, _)| pos)
        .collect()
}
