// src/common/money.rs

use rust_decimal::{Decimal, RoundingStrategy};

// Regra única de arredondamento: meio para cima (afastando do zero).
const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// `part / whole * 100` com 2 casas. Zero quando o total é zero.
pub fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    (part / whole * Decimal::ONE_HUNDRED).round_dp_with_strategy(2, ROUNDING)
}

/// Média `sum / count` com `dp` casas. Zero quando não há amostras.
pub fn average(sum: i64, count: i64, dp: u32) -> Decimal {
    if count <= 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(sum) / Decimal::from(count)).round_dp_with_strategy(dp, ROUNDING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn percentage_of_zero_total_is_zero() {
        assert_eq!(percentage(d("10.00"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn percentage_rounds_half_up() {
        // 1 / 8 = 12.5%
        assert_eq!(percentage(d("1"), d("8")), d("12.50"));
        // 1 / 3 = 33.333...%
        assert_eq!(percentage(d("1"), d("3")), d("33.33"));
        // 2 / 3 = 66.666...%
        assert_eq!(percentage(d("2"), d("3")), d("66.67"));
        // 0.00125 * 100 = 0.125 -> 0.13
        assert_eq!(percentage(d("0.00125"), d("1")), d("0.13"));
    }

    #[test]
    fn average_with_one_decimal() {
        assert_eq!(average(55, 3, 1), d("18.3"));
        assert_eq!(average(3, 2, 1), d("1.5"));
        assert_eq!(average(0, 0, 1), Decimal::ZERO);
    }
}
