//! Number parsing and normalization for receipt amounts.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use super::patterns::NUMBER;

/// Parse a receipt number such as `1,234.50`, `10,5`, `₹ 95.50` or `1.42`.
///
/// When both `.` and `,` appear, the right-most one is the decimal
/// separator. A lone comma is a decimal separator unless exactly three
/// digits follow it (`1,234` is a thousands group).
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let token = NUMBER.find(raw)?.as_str();

    let last_dot = token.rfind('.');
    let last_comma = token.rfind(',');

    let normalized = match (last_dot, last_comma) {
        (Some(dot), Some(comma)) => {
            let (decimal_at, group_sep) = if dot > comma { (dot, ',') } else { (comma, '.') };
            let (int_part, frac_part) = token.split_at(decimal_at);
            format!("{}.{}", int_part.replace(group_sep, ""), &frac_part[1..])
        }
        (None, Some(comma)) => {
            let commas = token.matches(',').count();
            let frac_len = token.len() - comma - 1;
            if commas == 1 && frac_len != 3 {
                token.replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
        (Some(dot), None) => {
            if token.matches('.').count() > 1 {
                let (int_part, frac_part) = token.split_at(dot);
                format!("{}.{}", int_part.replace('.', ""), &frac_part[1..])
            } else {
                token.to_string()
            }
        }
        (None, None) => token.to_string(),
    };

    Decimal::from_str(&normalized).ok()
}

/// Round a currency-like value to exactly two decimals (`1.5` becomes `1.50`).
pub fn round_currency(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Round a fuel volume to three decimals (pump displays show millilitres).
pub fn round_volume(value: Decimal) -> Decimal {
    value
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}
