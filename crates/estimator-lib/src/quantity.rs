//! Kubernetes resource quantity parsing
//!
//! Converts quantity strings such as `250m`, `1.5`, `64Mi`, `1G` or `12e6`
//! into exact integer values. CPU is held in nanocores and memory in bytes,
//! so summing and replica scaling never lose precision.
//!
//! Accepted grammar:
//! - optional `+` sign (a `-` sign is rejected for non-zero values)
//! - decimal number: `1`, `1.`, `.5`, `0.25`
//! - one suffix: none, `n`, `u`, `m`, `k`, `M`, `G`, `T`, `P`, `E`,
//!   `Ki`, `Mi`, `Gi`, `Ti`, `Pi`, `Ei`, or a decimal exponent `e3` / `E-2`
//!
//! Fractions below the base unit round up, matching how the API server
//! treats e.g. `0.5` bytes.

use crate::error::QuantityError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::Add;

/// Nanocores in one CPU core
pub const NANOCORES_PER_CORE: u128 = 1_000_000_000;

/// Nanocores in one millicore
const NANOCORES_PER_MILLICORE: u128 = 1_000_000;

/// Largest power of ten representable in u128
const MAX_POW10: u32 = 38;

/// Unit class of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    /// Stored in nanocores
    Cpu,
    /// Stored in bytes
    Memory,
}

impl ResourceClass {
    /// Power of ten from the quantity's unit to the stored base unit
    fn base_exponent(self) -> i32 {
        match self {
            ResourceClass::Cpu => 9,
            ResourceClass::Memory => 0,
        }
    }
}

/// Exact resource amount of one class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceQuantity {
    class: ResourceClass,
    value: u128,
}

/// Multiplier implied by a suffix
#[derive(Debug, Clone, Copy)]
struct Scale {
    /// Power of 1024
    binary: u32,
    /// Power of 10
    decimal: i32,
}

impl Scale {
    const fn decimal(exp: i32) -> Self {
        Self {
            binary: 0,
            decimal: exp,
        }
    }

    const fn binary(pow: u32) -> Self {
        Self {
            binary: pow,
            decimal: 0,
        }
    }
}

impl ResourceQuantity {
    pub fn zero(class: ResourceClass) -> Self {
        Self { class, value: 0 }
    }

    pub fn from_millicores(millicores: u64) -> Self {
        Self {
            class: ResourceClass::Cpu,
            value: millicores as u128 * NANOCORES_PER_MILLICORE,
        }
    }

    pub fn from_bytes(bytes: u64) -> Self {
        Self {
            class: ResourceClass::Memory,
            value: bytes as u128,
        }
    }

    /// Parse a CPU quantity
    pub fn cpu(input: &str) -> Result<Self, QuantityError> {
        Self::parse(ResourceClass::Cpu, input)
    }

    /// Parse a memory quantity
    pub fn memory(input: &str) -> Result<Self, QuantityError> {
        Self::parse(ResourceClass::Memory, input)
    }

    /// Parse a quantity string into the given class
    pub fn parse(class: ResourceClass, input: &str) -> Result<Self, QuantityError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, body) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let number_end = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (number, suffix) = body.split_at(number_end);

        let (mantissa, fraction_digits) = parse_decimal(number, input)?;
        let scale = parse_suffix(suffix, input)?;

        if negative && mantissa != 0 {
            return Err(QuantityError::Negative(input.to_string()));
        }

        let out_of_range = || QuantityError::OutOfRange(input.to_string());

        let numerator = 1024u128
            .checked_pow(scale.binary)
            .and_then(|m| mantissa.checked_mul(m))
            .ok_or_else(out_of_range)?;

        let exponent = scale.decimal as i64 + class.base_exponent() as i64 - fraction_digits as i64;

        let value = if exponent >= 0 {
            if numerator == 0 {
                0
            } else {
                let exponent = u32::try_from(exponent).map_err(|_| out_of_range())?;
                pow10(exponent)
                    .and_then(|m| numerator.checked_mul(m))
                    .ok_or_else(out_of_range)?
            }
        } else {
            match u32::try_from(-exponent).ok().and_then(pow10) {
                Some(divisor) => div_ceil(numerator, divisor),
                // Anything this small is a fraction of one base unit
                None => u128::from(numerator != 0),
            }
        };

        Ok(Self { class, value })
    }

    pub fn class(&self) -> ResourceClass {
        self.class
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }

    /// Raw stored value: nanocores for CPU, bytes for memory
    pub fn base_units(&self) -> u128 {
        self.value
    }

    /// CPU in millicores, rounded up
    pub fn millicores(&self) -> u128 {
        div_ceil(self.value, NANOCORES_PER_MILLICORE)
    }

    /// Lossy float view, for display only
    pub fn as_f64(&self) -> f64 {
        match self.class {
            ResourceClass::Cpu => self.value as f64 / NANOCORES_PER_CORE as f64,
            ResourceClass::Memory => self.value as f64,
        }
    }

    /// This quantity multiplied by a replica count
    pub fn scaled(&self, replicas: u32) -> Self {
        Self {
            class: self.class,
            value: self.value.saturating_mul(replicas as u128),
        }
    }
}

impl Add for ResourceQuantity {
    type Output = ResourceQuantity;

    fn add(self, rhs: ResourceQuantity) -> ResourceQuantity {
        debug_assert_eq!(self.class, rhs.class, "adding quantities of different classes");
        ResourceQuantity {
            class: self.class,
            value: self.value.saturating_add(rhs.value),
        }
    }
}

impl std::ops::AddAssign for ResourceQuantity {
    fn add_assign(&mut self, rhs: ResourceQuantity) {
        *self = *self + rhs;
    }
}

/// CPU renders as decimal cores (`0.25`), memory as whole bytes
impl fmt::Display for ResourceQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            ResourceClass::Cpu => {
                let whole = self.value / NANOCORES_PER_CORE;
                let frac = self.value % NANOCORES_PER_CORE;
                if frac == 0 {
                    write!(f, "{}", whole)
                } else {
                    let digits = format!("{:09}", frac);
                    write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
                }
            }
            ResourceClass::Memory => write!(f, "{}", self.value),
        }
    }
}

impl Serialize for ResourceQuantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Returns (digits as integer, number of fraction digits)
fn parse_decimal(number: &str, input: &str) -> Result<(u128, u32), QuantityError> {
    let invalid = || QuantityError::InvalidNumber(input.to_string());

    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };

    if fraction.contains('.') || (whole.is_empty() && fraction.is_empty()) {
        return Err(invalid());
    }

    let mut mantissa: u128 = 0;
    for digit in whole.bytes().chain(fraction.bytes()) {
        mantissa = mantissa
            .checked_mul(10)
            .and_then(|m| m.checked_add((digit - b'0') as u128))
            .ok_or_else(|| QuantityError::OutOfRange(input.to_string()))?;
    }

    let fraction_digits = u32::try_from(fraction.len()).map_err(|_| invalid())?;
    Ok((mantissa, fraction_digits))
}

fn parse_suffix(suffix: &str, input: &str) -> Result<Scale, QuantityError> {
    let scale = match suffix {
        "" => Scale::decimal(0),
        "n" => Scale::decimal(-9),
        "u" => Scale::decimal(-6),
        "m" => Scale::decimal(-3),
        "k" => Scale::decimal(3),
        "M" => Scale::decimal(6),
        "G" => Scale::decimal(9),
        "T" => Scale::decimal(12),
        "P" => Scale::decimal(15),
        "E" => Scale::decimal(18),
        "Ki" => Scale::binary(1),
        "Mi" => Scale::binary(2),
        "Gi" => Scale::binary(3),
        "Ti" => Scale::binary(4),
        "Pi" => Scale::binary(5),
        "Ei" => Scale::binary(6),
        other => {
            let exponent = other
                .strip_prefix('e')
                .or_else(|| other.strip_prefix('E'))
                .filter(|rest| !rest.is_empty())
                .and_then(|rest| rest.parse::<i32>().ok())
                .ok_or_else(|| QuantityError::UnknownSuffix {
                    input: input.to_string(),
                    suffix: other.to_string(),
                })?;
            Scale::decimal(exponent)
        }
    };
    Ok(scale)
}

fn pow10(exponent: u32) -> Option<u128> {
    if exponent > MAX_POW10 {
        return None;
    }
    10u128.checked_pow(exponent)
}

fn div_ceil(numerator: u128, divisor: u128) -> u128 {
    numerator / divisor + u128::from(numerator % divisor != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_millicores() {
        let q = ResourceQuantity::cpu("500m").unwrap();
        assert_eq!(q.base_units(), 500_000_000);
        assert_eq!(q.millicores(), 500);
        assert_eq!(q.to_string(), "0.5");
    }

    #[test]
    fn test_parse_plain_cores() {
        assert_eq!(ResourceQuantity::cpu("1.5").unwrap().to_string(), "1.5");
        assert_eq!(ResourceQuantity::cpu("2").unwrap().to_string(), "2");
        assert_eq!(ResourceQuantity::cpu(".25").unwrap().millicores(), 250);
        assert_eq!(ResourceQuantity::cpu("1.").unwrap().millicores(), 1000);
        assert_eq!(ResourceQuantity::cpu("  250m ").unwrap().millicores(), 250);
        assert_eq!(ResourceQuantity::cpu("+1").unwrap().millicores(), 1000);
    }

    #[test]
    fn test_parse_sub_millicore_suffixes() {
        assert_eq!(ResourceQuantity::cpu("100u").unwrap().base_units(), 100_000);
        assert_eq!(ResourceQuantity::cpu("5n").unwrap().base_units(), 5);
        assert_eq!(ResourceQuantity::cpu("5n").unwrap().to_string(), "0.000000005");
    }

    #[test]
    fn test_parse_binary_memory() {
        assert_eq!(ResourceQuantity::memory("2Gi").unwrap().base_units(), 2_147_483_648);
        assert_eq!(ResourceQuantity::memory("64Mi").unwrap().base_units(), 67_108_864);
        assert_eq!(ResourceQuantity::memory("1Ki").unwrap().base_units(), 1024);
        assert_eq!(ResourceQuantity::memory("1.5Gi").unwrap().base_units(), 1_610_612_736);
        assert_eq!(ResourceQuantity::memory("1Ei").unwrap().base_units(), 1u128 << 60);
    }

    #[test]
    fn test_parse_decimal_memory() {
        assert_eq!(ResourceQuantity::memory("100M").unwrap().base_units(), 100_000_000);
        assert_eq!(ResourceQuantity::memory("1k").unwrap().base_units(), 1000);
        assert_eq!(ResourceQuantity::memory("2G").unwrap().base_units(), 2_000_000_000);
        assert_eq!(
            ResourceQuantity::memory("1E").unwrap().base_units(),
            1_000_000_000_000_000_000
        );
        assert_eq!(ResourceQuantity::memory("1048576").unwrap().base_units(), 1_048_576);
    }

    #[test]
    fn test_parse_exponent() {
        assert_eq!(ResourceQuantity::memory("129e6").unwrap().base_units(), 129_000_000);
        assert_eq!(ResourceQuantity::memory("1E3").unwrap().base_units(), 1000);
        assert_eq!(ResourceQuantity::cpu("12e-1").unwrap().to_string(), "1.2");
        assert_eq!(ResourceQuantity::cpu("5e-3").unwrap().millicores(), 5);
    }

    #[test]
    fn test_fractional_bytes_round_up() {
        assert_eq!(ResourceQuantity::memory("0.5").unwrap().base_units(), 1);
        assert_eq!(ResourceQuantity::memory("1500m").unwrap().base_units(), 2);
        assert_eq!(ResourceQuantity::memory("1e-50").unwrap().base_units(), 1);
    }

    #[test]
    fn test_zero_values() {
        assert!(ResourceQuantity::cpu("0").unwrap().is_zero());
        assert!(ResourceQuantity::memory("0Mi").unwrap().is_zero());
        assert!(ResourceQuantity::cpu("-0").unwrap().is_zero());
        assert!(ResourceQuantity::memory("0e99").unwrap().is_zero());
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(ResourceQuantity::memory(""), Err(QuantityError::Empty));
        assert_eq!(ResourceQuantity::memory("   "), Err(QuantityError::Empty));
        assert_eq!(
            ResourceQuantity::memory("abc"),
            Err(QuantityError::InvalidNumber("abc".to_string()))
        );
        assert!(matches!(
            ResourceQuantity::cpu("1.2.3"),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(ResourceQuantity::cpu("."), Err(QuantityError::InvalidNumber(_))));
        assert!(matches!(ResourceQuantity::cpu("m"), Err(QuantityError::InvalidNumber(_))));
    }

    #[test]
    fn test_unknown_suffix() {
        let err = ResourceQuantity::memory("1Zi").unwrap_err();
        assert_eq!(
            err,
            QuantityError::UnknownSuffix {
                input: "1Zi".to_string(),
                suffix: "Zi".to_string(),
            }
        );
        assert!(ResourceQuantity::memory("10MB").is_err());
        assert!(ResourceQuantity::memory("10e").is_err());
        assert!(ResourceQuantity::memory("10 Mi").is_err());
    }

    #[test]
    fn test_negative_rejected() {
        assert_eq!(
            ResourceQuantity::cpu("-100m"),
            Err(QuantityError::Negative("-100m".to_string()))
        );
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            ResourceQuantity::memory("1e40"),
            Err(QuantityError::OutOfRange(_))
        ));
        assert!(matches!(
            ResourceQuantity::cpu("99999999999999999999999999999999999999999"),
            Err(QuantityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_addition_is_exact() {
        let mut total = ResourceQuantity::zero(ResourceClass::Cpu);
        for _ in 0..10 {
            total += ResourceQuantity::cpu("100m").unwrap();
        }
        assert_eq!(total, ResourceQuantity::cpu("1").unwrap());
        assert_eq!(total.to_string(), "1");
    }

    #[test]
    fn test_scaled() {
        let q = ResourceQuantity::cpu("100m").unwrap();
        assert_eq!(q.scaled(3).to_string(), "0.3");
        assert!(q.scaled(0).is_zero());

        let mem = ResourceQuantity::memory("64Mi").unwrap();
        assert_eq!(mem.scaled(2).base_units(), 134_217_728);
    }

    #[test]
    fn test_serializes_as_string() {
        let q = ResourceQuantity::cpu("250m").unwrap();
        assert_eq!(serde_json::to_string(&q).unwrap(), "\"0.25\"");
        let m = ResourceQuantity::memory("1Ki").unwrap();
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"1024\"");
    }
}
