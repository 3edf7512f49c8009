use std::fmt;

use chrono::{Datelike, Local};
use sha2::{Digest, Sha256};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::error::DerivationError;
use crate::input::{CapitalizationRule, DerivationInput, GenerationMode};

pub const GENERAL_LENGTH: usize = 10;

const WRAP: char = '_';

#[derive(Clone, PartialEq, Eq)]
pub struct DerivedOutput {
    value: Zeroizing<String>,
}

impl DerivedOutput {
    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl fmt::Debug for DerivedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedOutput")
            .field("len", &self.value.len())
            .finish_non_exhaustive()
    }
}

pub fn current_year() -> i32 {
    Local::now().year()
}

/// Derive a value, reading the clock when the year suffix is enabled.
pub fn derive(input: &DerivationInput) -> Result<DerivedOutput, DerivationError> {
    derive_with_clock(input, current_year)
}

/// Same as [`derive`] with the year fixed by the caller.
pub fn derive_for_year(
    input: &DerivationInput,
    year: i32,
) -> Result<DerivedOutput, DerivationError> {
    derive_with_clock(input, || year)
}

fn derive_with_clock(
    input: &DerivationInput,
    clock: impl FnOnce() -> i32,
) -> Result<DerivedOutput, DerivationError> {
    if input.has_empty_field() {
        debug!("rejected derivation with empty master secret or salt");
        return Err(DerivationError::EmptyInput);
    }

    debug!(
        mode = %input.mode,
        year_suffix = input.year_suffix,
        underscore_wrap = input.underscore_wrap,
        "deriving"
    );

    let message = input.message(clock);
    let hash = sha256_hex(&message);
    let extracted = extract(&hash, input.mode, input.capitalization)?;

    let value = if input.underscore_wrap {
        wrap(&extracted)
    } else {
        extracted
    };

    debug!(len = value.len(), "derivation complete");
    Ok(DerivedOutput { value })
}

/// SHA-256 of the UTF-8 bytes of `message` as 64 lowercase hex characters.
pub fn sha256_hex(message: &str) -> Zeroizing<String> {
    Zeroizing::new(format!("{:x}", Sha256::digest(message.as_bytes())))
}

pub fn extract(
    hash: &str,
    mode: GenerationMode,
    rule: CapitalizationRule,
) -> Result<Zeroizing<String>, DerivationError> {
    let Some(required) = mode.required_digits() else {
        return Ok(general(hash, rule));
    };

    let digits = digits_only(hash);
    require_digits(&digits, required)?;

    let start = match mode {
        // len >= required keeps mid >= required / 2
        GenerationMode::EightDigit => digits.len() / 2 - required / 2,
        _ => digits.len() - required,
    };
    window(&digits, start, required)
}

fn general(hash: &str, rule: CapitalizationRule) -> Zeroizing<String> {
    let mut value: Zeroizing<String> =
        Zeroizing::new(hash.chars().take(GENERAL_LENGTH).collect());

    let target = match rule {
        CapitalizationRule::FirstAlphabetic => value.find(|c: char| c.is_ascii_alphabetic()),
        CapitalizationRule::FirstCharacter => Some(0),
    };

    if let Some(pos) = target
        && let Some(ch) = value.get_mut(pos..pos + 1)
    {
        ch.make_ascii_uppercase();
    }

    value
}

fn digits_only(hash: &str) -> Zeroizing<String> {
    let digits: Zeroizing<String> =
        Zeroizing::new(hash.chars().filter(char::is_ascii_digit).collect());
    trace!(found = digits.len(), "digit-only subsequence");
    digits
}

fn require_digits(digits: &str, required: usize) -> Result<(), DerivationError> {
    if digits.len() < required {
        debug!(required, found = digits.len(), "not enough digits in hash");
        return Err(DerivationError::InsufficientDigits {
            required,
            found: digits.len(),
        });
    }
    Ok(())
}

fn window(digits: &str, start: usize, len: usize) -> Result<Zeroizing<String>, DerivationError> {
    digits
        .get(start..start + len)
        .map(|s| Zeroizing::new(s.to_string()))
        .ok_or_else(|| {
            DerivationError::Unexpected(format!(
                "digit window {}..{} out of range for {} digits",
                start,
                start + len,
                digits.len()
            ))
        })
}

fn wrap(value: &str) -> Zeroizing<String> {
    let mut wrapped = Zeroizing::new(String::with_capacity(value.len() + 2));
    wrapped.push(WRAP);
    wrapped.push_str(value);
    wrapped.push(WRAP);
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: i32 = 2026;

    fn derive_str(input: &DerivationInput) -> String {
        derive_for_year(input, YEAR).unwrap().as_str().to_string()
    }

    fn extract_str(hash: &str, mode: GenerationMode) -> Result<String, DerivationError> {
        extract(hash, mode, CapitalizationRule::FirstAlphabetic).map(|v| v.as_str().to_string())
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            *sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(sha256_hex("").len(), 64);
    }

    #[test]
    fn test_regression_general() {
        let input = DerivationInput::new("correct horse", "example.com");
        assert_eq!(derive_str(&input), "096E2d026d");
    }

    #[test]
    fn test_regression_six_digit() {
        let input =
            DerivationInput::new("correct horse", "example.com").with_mode(GenerationMode::SixDigit);
        assert_eq!(derive_str(&input), "912920");
    }

    #[test]
    fn test_regression_eight_digit() {
        let input = DerivationInput::new("correct horse", "example.com")
            .with_mode(GenerationMode::EightDigit);
        assert_eq!(derive_str(&input), "87970547");
    }

    #[test]
    fn test_regression_year_suffix() {
        let base = DerivationInput::new("correct horse", "example.com").with_year_suffix(true);

        assert_eq!(derive_str(&base), "Ac791b8b96");
        assert_eq!(
            derive_str(&base.clone().with_mode(GenerationMode::SixDigit)),
            "180946"
        );
        assert_eq!(
            derive_str(&base.with_mode(GenerationMode::EightDigit)),
            "69266857"
        );
    }

    #[test]
    fn test_regression_other_site() {
        let base = DerivationInput::new("hunter2", "github.com");
        assert_eq!(derive_str(&base), "73A1eeabe5");
        assert_eq!(
            derive_str(&base.clone().with_mode(GenerationMode::SixDigit)),
            "784972"
        );
        assert_eq!(
            derive_str(&base.clone().with_mode(GenerationMode::EightDigit)),
            "30885683"
        );

        let dated = base.with_year_suffix(true);
        assert_eq!(derive_for_year(&dated, 2025).unwrap().as_str(), "123B69b132");
    }

    #[test]
    fn test_eight_digit_odd_length_biased_left() {
        // "testsalt" has 35 digits: mid 17, window 13..21
        let input = DerivationInput::new("test", "salt").with_mode(GenerationMode::EightDigit);
        assert_eq!(derive_str(&input), "21226326");
    }

    #[test]
    fn test_general_all_digit_prefix_unchanged() {
        let input = DerivationInput::new("secret", "salt156");
        assert_eq!(derive_str(&input), "2951595846");

        let legacy = input.with_capitalization(CapitalizationRule::FirstCharacter);
        assert_eq!(derive_str(&legacy), "2951595846");
    }

    #[test]
    fn test_legacy_capitalization_diverges_on_leading_digit() {
        let input = DerivationInput::new("correct horse", "example.com")
            .with_capitalization(CapitalizationRule::FirstCharacter);
        assert_eq!(derive_str(&input), "096e2d026d");
    }

    #[test]
    fn test_legacy_capitalization_agrees_on_leading_letter() {
        let input = DerivationInput::new("secret", "salt0");
        let legacy = input
            .clone()
            .with_capitalization(CapitalizationRule::FirstCharacter);
        assert_eq!(derive_str(&input), "C86c681af3");
        assert_eq!(derive_str(&legacy), "C86c681af3");
    }

    #[test]
    fn test_unicode_input_hashed_as_utf8() {
        let input = DerivationInput::new("жизнь🔑", "site");
        assert_eq!(derive_str(&input), "8120906Fde");
    }

    #[test]
    fn test_underscore_wrap_all_modes() {
        let base = DerivationInput::new("correct horse", "example.com").with_underscore_wrap(true);
        assert_eq!(derive_str(&base), "_096E2d026d_");
        assert_eq!(
            derive_str(&base.clone().with_mode(GenerationMode::SixDigit)),
            "_912920_"
        );
        assert_eq!(
            derive_str(&base.with_mode(GenerationMode::EightDigit)),
            "_87970547_"
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        let cases = [("", "example.com"), ("secret", ""), ("", "")];

        for (secret, salt) in cases {
            for mode in GenerationMode::ALL {
                let input = DerivationInput::new(secret, salt)
                    .with_mode(mode)
                    .with_year_suffix(true);
                assert_eq!(derive(&input), Err(DerivationError::EmptyInput));
            }
        }
    }

    #[test]
    fn test_empty_input_does_not_read_clock() {
        let input = DerivationInput::new("", "salt").with_year_suffix(true);
        let result = derive_with_clock(&input, || panic!("clock read before validation"));
        assert_eq!(result, Err(DerivationError::EmptyInput));
    }

    #[test]
    fn test_clock_read_only_with_year_suffix() {
        let input = DerivationInput::new("secret", "salt");
        assert!(derive_with_clock(&input, || panic!("clock read without suffix")).is_ok());
    }

    #[test]
    fn test_collision_across_split() {
        let a = DerivationInput::new("ab", "c");
        let b = DerivationInput::new("a", "bc");
        assert_eq!(derive_str(&a), derive_str(&b));
        assert_eq!(derive_str(&a), "Ba7816bf8f");
    }

    #[test]
    fn test_extract_six_digit_exact_boundary() {
        assert_eq!(
            extract_str("abcdef123456abcdef", GenerationMode::SixDigit).unwrap(),
            "123456"
        );
    }

    #[test]
    fn test_extract_six_digit_takes_last() {
        assert_eq!(
            extract_str("9a8b7c6d5e4f3a2b1c0", GenerationMode::SixDigit).unwrap(),
            "543210"
        );
    }

    #[test]
    fn test_extract_six_digit_insufficient() {
        assert_eq!(
            extract_str("a1b2c3d4e5ffffff", GenerationMode::SixDigit),
            Err(DerivationError::InsufficientDigits {
                required: 6,
                found: 5
            })
        );
        assert_eq!(
            extract_str("abcdefabcdef", GenerationMode::SixDigit),
            Err(DerivationError::InsufficientDigits {
                required: 6,
                found: 0
            })
        );
    }

    #[test]
    fn test_extract_eight_digit_exact_boundary() {
        assert_eq!(
            extract_str("1a2b3c4d5e6f7a8b", GenerationMode::EightDigit).unwrap(),
            "12345678"
        );
    }

    #[test]
    fn test_extract_eight_digit_centering() {
        // nine digits: mid 4, window 0..8
        assert_eq!(
            extract_str("123456789", GenerationMode::EightDigit).unwrap(),
            "12345678"
        );
        // ten digits: mid 5, window 1..9
        assert_eq!(
            extract_str("0123456789", GenerationMode::EightDigit).unwrap(),
            "12345678"
        );
    }

    #[test]
    fn test_extract_eight_digit_insufficient() {
        assert_eq!(
            extract_str("abcdef123456abcdef", GenerationMode::EightDigit),
            Err(DerivationError::InsufficientDigits {
                required: 8,
                found: 6
            })
        );
    }

    #[test]
    fn test_extract_general_rules() {
        assert_eq!(
            extract_str("0123456789abcdef", GenerationMode::General).unwrap(),
            "0123456789"
        );
        assert_eq!(
            extract_str("01234567a9bcdef", GenerationMode::General).unwrap(),
            "01234567A9"
        );
        assert_eq!(
            extract_str("abcdefabcdefab", GenerationMode::General).unwrap(),
            "Abcdefabcd"
        );
    }

    #[test]
    fn test_deterministic_derivation() {
        let input = DerivationInput::new("test_master_secret", "layer1")
            .with_mode(GenerationMode::EightDigit)
            .with_year_suffix(true)
            .with_underscore_wrap(true);

        let first = derive_for_year(&input, YEAR).unwrap();
        let second = derive_for_year(&input, YEAR).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_clock_supplies_year_suffix() {
        let input = DerivationInput::new("correct horse", "example.com").with_year_suffix(true);
        let from_clock = derive_with_clock(&input, || YEAR).unwrap();

        assert_eq!(from_clock, derive_for_year(&input, YEAR).unwrap());
        assert_eq!(from_clock.as_str(), "Ac791b8b96");
    }

    #[test]
    fn test_extract_boundaries_follow_mode_requirement() {
        for mode in [GenerationMode::SixDigit, GenerationMode::EightDigit] {
            let required = mode.required_digits().unwrap();
            let exact: String = "0123456789".chars().cycle().take(required).collect();
            let short: String = exact.chars().skip(1).collect();

            assert_eq!(extract_str(&format!("ff{}ff", exact), mode).unwrap(), exact);
            assert_eq!(
                extract_str(&short, mode),
                Err(DerivationError::InsufficientDigits {
                    required,
                    found: required - 1
                })
            );
        }
    }

    #[test]
    fn test_output_debug_redacts_value() {
        let output = derive_for_year(&DerivationInput::new("correct horse", "example.com"), YEAR)
            .unwrap();
        let rendered = format!("{:?}", output);
        assert!(!rendered.contains("096E2d026d"));
        assert!(rendered.contains("len"));
    }
}
