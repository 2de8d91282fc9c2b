use std::fmt;

use serde::{Deserialize, Serialize};

/// A CPF (Cadastro de Pessoas Fisicas), the Brazilian taxpayer id that keys
/// every account. Held in canonical form: exactly 11 digits, no punctuation.
///
/// `normalize` only canonicalizes and is the lookup-path constructor;
/// `validate` additionally verifies the two mod-11 check digits and is
/// required before an account may be created, so every stored account
/// carries a checksum-valid CPF.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cpf(String);

impl Cpf {
    /// Canonicalize an identifier: strip punctuation, keep digits only,
    /// left-pad to 11 digits (numeric handling upstream legitimately drops
    /// leading zeros). Fails on fewer than 9 or more than 11 digits.
    pub fn normalize(input: &str) -> Result<Self, CpfError> {
        let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < 9 {
            return Err(CpfError::TooFewDigits(digits.len()));
        }
        if digits.len() > 11 {
            return Err(CpfError::TooManyDigits(digits.len()));
        }
        Ok(Cpf(format!("{:0>11}", digits)))
    }

    /// Canonicalize and verify the check digits. All-identical sequences
    /// (111.111.111-11 and friends) satisfy the arithmetic but are never
    /// issued, so they are rejected as well.
    pub fn validate(input: &str) -> Result<Self, CpfError> {
        let cpf = Self::normalize(input)?;
        let digits: Vec<u32> = cpf.0.chars().filter_map(|c| c.to_digit(10)).collect();

        if digits.iter().all(|&d| d == digits[0]) {
            return Err(CpfError::RepeatedDigits);
        }
        if digits[9] != check_digit(&digits[..9]) || digits[10] != check_digit(&digits[..10]) {
            return Err(CpfError::InvalidCheckDigits);
        }
        Ok(cpf)
    }

    /// Canonical 11-digit form, used as the storage key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Conventional punctuated form: `529.982.247-25`.
    pub fn formatted(&self) -> String {
        format!(
            "{}.{}.{}-{}",
            &self.0[..3],
            &self.0[3..6],
            &self.0[6..9],
            &self.0[9..]
        )
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// Mod-11 check digit over the digits preceding it: the first check digit
/// weighs the nine leading digits with 10..2, the second weighs ten with
/// 11..2. A remainder below 2 maps to 0.
fn check_digit(digits: &[u32]) -> u32 {
    let weights = (2..=digits.len() as u32 + 1).rev();
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        remainder => 11 - remainder,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpfError {
    TooFewDigits(usize),
    TooManyDigits(usize),
    RepeatedDigits,
    InvalidCheckDigits,
}

impl fmt::Display for CpfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpfError::TooFewDigits(n) => {
                write!(f, "expected at least 9 digits, got {}", n)
            }
            CpfError::TooManyDigits(n) => {
                write!(f, "expected at most 11 digits, got {}", n)
            }
            CpfError::RepeatedDigits => {
                write!(f, "sequences of a single repeated digit are not issued")
            }
            CpfError::InvalidCheckDigits => write!(f, "check digits do not match"),
        }
    }
}

impl std::error::Error for CpfError {}
