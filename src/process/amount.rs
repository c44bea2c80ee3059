// src/process/amount.rs

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse an `AMOUNT` cell, treating thousands separators as noise.
///
/// After the commas are dropped, the longest leading decimal literal is
/// read, so `"100万"` is `100.0` and `"12abc"` is `12.0`. `"Infinity"` with an
/// optional sign is accepted; a cell with no numeric prefix becomes `0.0`,
/// as does negative zero. A garbled figure therefore shows as zero rather
/// than failing the row.
pub fn parse_amount(cell: &str) -> f64 {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    match leading_float(&cleaned) {
        Some(v) if v != 0.0 && !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Longest prefix of `s` of the form `[+-](Infinity | digits[.digits][e[+-]digits])`.
fn leading_float(s: &str) -> Option<f64> {
    let b = s.as_bytes();
    let mut i = 0;
    let negative = match b.first() {
        Some(b'-') => {
            i = 1;
            true
        }
        Some(b'+') => {
            i = 1;
            false
        }
        _ => false,
    };

    if s[i..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let skip_digits = |mut j: usize| {
        while j < b.len() && b[j].is_ascii_digit() {
            j += 1;
        }
        j
    };

    let int_end = skip_digits(i);
    let mut digits = int_end - i;
    let mut end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = skip_digits(end + 1);
        digits += frac_end - (end + 1);
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut j = end + 1;
        if matches!(b.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_end = skip_digits(j);
        if exp_end > j {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// Fixed two-decimal rendering with digit grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountFormat {
    pub grouping_separator: char,
    pub decimal_separator: char,
}

impl Default for AmountFormat {
    fn default() -> Self {
        Self::zh_cn()
    }
}

impl AmountFormat {
    /// `1,234.50`
    pub const fn zh_cn() -> Self {
        Self {
            grouping_separator: ',',
            decimal_separator: '.',
        }
    }

    pub const fn new(grouping_separator: char, decimal_separator: char) -> Self {
        Self {
            grouping_separator,
            decimal_separator,
        }
    }

    /// Round half away from zero on the shortest decimal form of `value`,
    /// then group the integer digits in threes. Infinities render as `∞`.
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-∞" } else { "∞" }.to_string();
        }

        let plain = round_to_cents(value);
        let (sign, digits) = match plain.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", plain.as_str()),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

        let mut out = String::with_capacity(plain.len() + int_part.len() / 3 + 1);
        out.push_str(sign);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push(self.grouping_separator);
            }
            out.push(ch);
        }
        out.push(self.decimal_separator);
        out.push_str(frac_part);
        out
    }
}

/// Finite `value` as `-?\d+\.\d\d`. Negatives keep their sign even when
/// they round to zero; only zero itself (either sign) is unsigned.
fn round_to_cents(value: f64) -> String {
    if value == 0.0 {
        return "0.00".to_string();
    }

    // `Display` for f64 is the shortest string that round-trips.
    match Decimal::from_str(&value.to_string()) {
        Ok(d) => {
            let mut rounded = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            if rounded.is_zero() {
                return if value < 0.0 { "-0.00" } else { "0.00" }.to_string();
            }
            rounded.rescale(2);
            rounded.to_string()
        }
        // Outside Decimal's range or precision; `{:.2}` keeps the sign of tiny negatives.
        Err(_) => format!("{:.2}", value),
    }
}
