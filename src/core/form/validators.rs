//! Field validators
//!
//! Same semantics as reactive-form validators: only [`Validator::Required`]
//! fires on an empty value; every other rule passes empty input and leaves it
//! to `Required`. Lengths count characters, not bytes.

use crate::domain::birth_date::BirthDate;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Letters (including Spanish accented vowels and ñ) and whitespace
const LETTERS_PATTERN: &str = r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$";

/// Email syntax accepted by the form (the WHATWG-style rule used by browser
/// email validators, with the 254/64 length caps)
const EMAIL_PATTERN: &str = r"^(?=.{1,254}$)(?=.{1,64}@)[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

fn letters_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LETTERS_PATTERN).expect("letters pattern is valid"))
}

fn email_regex() -> &'static fancy_regex::Regex {
    static RE: OnceLock<fancy_regex::Regex> = OnceLock::new();
    RE.get_or_init(|| fancy_regex::Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// A single validation rule attached to a form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Value must be non-empty
    Required,
    /// At least this many characters
    MinLength(usize),
    /// At most this many characters
    MaxLength(usize),
    /// Letters and whitespace only
    Letters,
    /// Email syntax
    Email,
    /// `YYYY-MM-DD` calendar date
    InputDate,
}

/// Why a value failed a [`Validator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Required,
    MinLength { required: usize, actual: usize },
    MaxLength { required: usize, actual: usize },
    Pattern,
    Email,
    Date,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Required => write!(f, "Este campo es obligatorio"),
            ValidationError::MinLength { required, .. } => {
                write!(f, "Debe tener al menos {required} caracteres")
            }
            ValidationError::MaxLength { required, .. } => {
                write!(f, "No puede superar {required} caracteres")
            }
            ValidationError::Pattern => write!(f, "Solo se permiten letras y espacios"),
            ValidationError::Email => write!(f, "Correo electrónico no válido"),
            ValidationError::Date => write!(f, "Fecha no válida (AAAA-MM-DD)"),
        }
    }
}

impl Validator {
    /// Checks `value` against this rule
    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return match self {
                Validator::Required => Err(ValidationError::Required),
                _ => Ok(()),
            };
        }

        match *self {
            Validator::Required => Ok(()),
            Validator::MinLength(required) => {
                let actual = value.chars().count();
                if actual < required {
                    Err(ValidationError::MinLength { required, actual })
                } else {
                    Ok(())
                }
            }
            Validator::MaxLength(required) => {
                let actual = value.chars().count();
                if actual > required {
                    Err(ValidationError::MaxLength { required, actual })
                } else {
                    Ok(())
                }
            }
            Validator::Letters => {
                if letters_regex().is_match(value) {
                    Ok(())
                } else {
                    Err(ValidationError::Pattern)
                }
            }
            Validator::Email => match email_regex().is_match(value) {
                Ok(true) => Ok(()),
                Ok(false) => Err(ValidationError::Email),
                Err(e) => {
                    tracing::warn!(error = %e, "Email pattern evaluation failed");
                    Err(ValidationError::Email)
                }
            },
            Validator::InputDate => {
                if BirthDate::parse_input(value).is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::Date)
                }
            }
        }
    }
}

/// Runs every validator and collects the failures
pub fn validate(value: &str, validators: &[Validator]) -> Vec<ValidationError> {
    validators
        .iter()
        .filter_map(|v| v.check(value).err())
        .collect()
}
