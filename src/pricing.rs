use thiserror::Error;

/// Price tiers in rupiah, keyed by the TMDB vote average.
/// Tier bounds are inclusive: (0,3] -> 3500, (3,6] -> 8250,
/// (6,8] -> 16350, (8,10] -> 21250.
const TIER_LOW: i64 = 3_500;
const TIER_MID: i64 = 8_250;
const TIER_HIGH: i64 = 16_350;
const TIER_TOP: i64 = 21_250;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum PricingError {
    #[error("rating {0} is outside the valid range 0-10")]
    RatingOutOfRange(f64),
}

/// Maps a rating to its price tier. Total over [0, 10]; anything else
/// (including NaN) is rejected rather than silently priced at zero.
pub fn price_for(rating: f64) -> Result<i64, PricingError> {
    if !(0.0..=10.0).contains(&rating) {
        return Err(PricingError::RatingOutOfRange(rating));
    }
    let price = if rating <= 3.0 {
        TIER_LOW
    } else if rating <= 6.0 {
        TIER_MID
    } else if rating <= 8.0 {
        TIER_HIGH
    } else {
        TIER_TOP
    };
    Ok(price)
}

/// Formats an amount the way the original storefront did: "Rp " prefix,
/// no decimals, '.' as the thousands separator.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("Rp -{}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_each_tier_at_its_bounds() {
        for r in [0.0, 1.5, 3.0] {
            assert_eq!(price_for(r), Ok(3_500));
        }
        for r in [3.1, 4.0, 6.0] {
            assert_eq!(price_for(r), Ok(8_250));
        }
        for r in [6.1, 7.2, 8.0] {
            assert_eq!(price_for(r), Ok(16_350));
        }
        for r in [8.1, 9.3, 10.0] {
            assert_eq!(price_for(r), Ok(21_250));
        }
    }

    #[test]
    fn rejects_out_of_range_ratings() {
        assert!(price_for(-0.1).is_err());
        assert!(price_for(10.1).is_err());
        assert!(price_for(f64::NAN).is_err());
    }

    #[test]
    fn formats_rupiah_with_dot_separators() {
        assert_eq!(format_rupiah(0), "Rp 0");
        assert_eq!(format_rupiah(3_500), "Rp 3.500");
        assert_eq!(format_rupiah(21_250), "Rp 21.250");
        assert_eq!(format_rupiah(200_000), "Rp 200.000");
        assert_eq!(format_rupiah(1_234_567), "Rp 1.234.567");
    }
}
