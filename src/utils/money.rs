use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{AppError, AppResult};

/// Échelle des montants (colones / dollars)
pub const MONEY_SCALE: u32 = 2;
/// Échelle des quantités d'or (grammes)
pub const GRAMS_SCALE: u32 = 6;

/// Arrondi HALF_UP puis fixe l'échelle (62 -> 62.00)
pub fn with_scale(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

pub fn money(value: Decimal) -> Decimal {
    with_scale(value, MONEY_SCALE)
}

pub fn grams(value: Decimal) -> Decimal {
    with_scale(value, GRAMS_SCALE)
}

fn out_of_range() -> AppError {
    AppError::validation("Amount out of range")
}

/// Produit sans panique : un dépassement devient une erreur de validation
pub fn checked_mul(a: Decimal, b: Decimal) -> AppResult<Decimal> {
    a.checked_mul(b).ok_or_else(out_of_range)
}

pub fn checked_add(a: Decimal, b: Decimal) -> AppResult<Decimal> {
    a.checked_add(b).ok_or_else(out_of_range)
}

pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> AppResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, checked_add)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_rounds_half_up() {
        assert_eq!(money(dec!(10.005)).to_string(), "10.01");
        assert_eq!(money(dec!(10.004)).to_string(), "10.00");
        assert_eq!(money(dec!(-2.345)).to_string(), "-2.35");
    }

    #[test]
    fn scale_is_padded() {
        assert_eq!(money(dec!(62)).to_string(), "62.00");
        assert_eq!(grams(dec!(1.5)).to_string(), "1.500000");
    }

    #[test]
    fn overflow_is_a_validation_error() {
        let huge = Decimal::MAX;
        assert!(matches!(checked_mul(huge, dec!(2)), Err(AppError::Validation(_))));
        assert!(matches!(checked_add(huge, dec!(1)), Err(AppError::Validation(_))));
        assert_eq!(checked_mul(dec!(1.5), dec!(2000)).unwrap(), dec!(3000.0));
        assert_eq!(checked_add(dec!(-3), dec!(1)).unwrap(), dec!(-2));
        assert_eq!(checked_sum([dec!(1.25), dec!(2.75)]).unwrap(), dec!(4));
        assert!(checked_sum([huge, huge]).is_err());
    }

    #[test]
    fn grams_keep_six_decimals() {
        assert_eq!(grams(dec!(0.1234565)).to_string(), "0.123457");
    }
}
