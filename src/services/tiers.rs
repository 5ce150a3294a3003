use rust_decimal::Decimal;

use crate::entities::{lead_time_tier, price_tier};
use crate::errors::ServiceError;

/// A quantity band. Price tiers and lead-time tiers share the same range
/// semantics and are resolved the same way.
pub trait QuantityTier {
    fn min_quantity(&self) -> i32;
    fn max_quantity(&self) -> i32;
}

impl QuantityTier for price_tier::Model {
    fn min_quantity(&self) -> i32 {
        self.min_quantity
    }
    fn max_quantity(&self) -> i32 {
        self.max_quantity
    }
}

impl QuantityTier for lead_time_tier::Model {
    fn min_quantity(&self) -> i32 {
        self.min_quantity
    }
    fn max_quantity(&self) -> i32 {
        self.max_quantity
    }
}

/// Find the first tier whose inclusive range covers the quantity.
pub fn resolve_tier<T: QuantityTier>(tiers: &[T], quantity: i32) -> Option<&T> {
    tiers
        .iter()
        .find(|t| t.min_quantity() <= quantity && quantity <= t.max_quantity())
}

/// Resolve a unit price for a quantity. A quantity outside every tier is
/// rejected rather than silently priced.
pub fn resolve_unit_price(
    tiers: &[price_tier::Model],
    quantity: i32,
) -> Result<Decimal, ServiceError> {
    resolve_tier(tiers, quantity)
        .map(|t| t.unit_price)
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Quantity {} is outside the configured price tiers",
                quantity
            ))
        })
}

/// Resolve lead-time days for a quantity.
pub fn resolve_lead_time_days(
    tiers: &[lead_time_tier::Model],
    quantity: i32,
) -> Result<i32, ServiceError> {
    resolve_tier(tiers, quantity).map(|t| t.days).ok_or_else(|| {
        ServiceError::ValidationError(format!(
            "Quantity {} is outside the configured lead-time tiers",
            quantity
        ))
    })
}

/// Validate a tier set before it is persisted. Each range must be
/// non-empty and start at 1 or above, and ranges may not overlap.
pub fn validate_tier_ranges(ranges: &[(i32, i32)]) -> Result<(), ServiceError> {
    for &(min, max) in ranges {
        if min < 1 {
            return Err(ServiceError::ValidationError(format!(
                "Tier minimum must be at least 1, got {}",
                min
            )));
        }
        if min > max {
            return Err(ServiceError::ValidationError(format!(
                "Tier range {}..={} is empty",
                min, max
            )));
        }
    }

    let mut sorted: Vec<(i32, i32)> = ranges.to_vec();
    sorted.sort_unstable();
    for pair in sorted.windows(2) {
        if pair[1].0 <= pair[0].1 {
            return Err(ServiceError::ValidationError(format!(
                "Tier ranges {}..={} and {}..={} overlap",
                pair[0].0, pair[0].1, pair[1].0, pair[1].1
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn price_tiers(ranges: &[(i32, i32, Decimal)]) -> Vec<price_tier::Model> {
        ranges
            .iter()
            .map(|&(min, max, price)| price_tier::Model {
                id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                min_quantity: min,
                max_quantity: max,
                unit_price: price,
            })
            .collect()
    }

    #[test]
    fn resolves_first_matching_band() {
        let tiers = price_tiers(&[(1, 10, dec!(100)), (11, 20, dec!(90))]);
        assert_eq!(resolve_unit_price(&tiers, 5).unwrap(), dec!(100));
        assert_eq!(resolve_unit_price(&tiers, 15).unwrap(), dec!(90));
    }

    #[test]
    fn band_boundaries_are_inclusive() {
        let tiers = price_tiers(&[(1, 10, dec!(100)), (11, 20, dec!(90))]);
        assert_eq!(resolve_unit_price(&tiers, 1).unwrap(), dec!(100));
        assert_eq!(resolve_unit_price(&tiers, 10).unwrap(), dec!(100));
        assert_eq!(resolve_unit_price(&tiers, 11).unwrap(), dec!(90));
        assert_eq!(resolve_unit_price(&tiers, 20).unwrap(), dec!(90));
    }

    #[test]
    fn out_of_range_quantity_is_an_error() {
        let tiers = price_tiers(&[(1, 10, dec!(100)), (11, 20, dec!(90))]);
        assert_matches!(
            resolve_unit_price(&tiers, 25),
            Err(ServiceError::ValidationError(_))
        );
        assert!(resolve_unit_price(&tiers, 0).is_err());
    }

    #[test]
    fn lead_time_uses_same_resolution() {
        let tiers = vec![
            lead_time_tier::Model {
                id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                min_quantity: 1,
                max_quantity: 50,
                days: 3,
            },
            lead_time_tier::Model {
                id: Uuid::new_v4(),
                product_id: Uuid::new_v4(),
                min_quantity: 51,
                max_quantity: 500,
                days: 10,
            },
        ];
        assert_eq!(resolve_lead_time_days(&tiers, 50).unwrap(), 3);
        assert_eq!(resolve_lead_time_days(&tiers, 51).unwrap(), 10);
        assert!(resolve_lead_time_days(&tiers, 501).is_err());
    }

    #[test]
    fn tier_range_validation() {
        assert!(validate_tier_ranges(&[(1, 10), (11, 20)]).is_ok());
        assert!(validate_tier_ranges(&[(0, 10)]).is_err());
        assert!(validate_tier_ranges(&[(10, 5)]).is_err());
        assert!(validate_tier_ranges(&[(1, 10), (10, 20)]).is_err());
        assert!(validate_tier_ranges(&[(11, 20), (1, 10)]).is_ok());
    }

    #[test]
    fn empty_tier_set_never_resolves() {
        let tiers: Vec<price_tier::Model> = vec![];
        assert!(resolve_unit_price(&tiers, 1).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn resolution_agrees_with_range_membership(
                quantity in 0i32..200,
                split in 1i32..100,
            ) {
                let tiers =
                    price_tiers(&[(1, split, dec!(100)), (split + 1, 100, dec!(90))]);
                let resolved = resolve_unit_price(&tiers, quantity);
                if (1..=100).contains(&quantity) {
                    let expected = if quantity <= split { dec!(100) } else { dec!(90) };
                    prop_assert_eq!(resolved.unwrap(), expected);
                } else {
                    prop_assert!(resolved.is_err());
                }
            }

            #[test]
            fn adjacent_ranges_always_validate(splits in proptest::collection::vec(1i32..50, 1..6)) {
                let mut next_min = 1;
                let mut ranges = Vec::new();
                for width in splits {
                    ranges.push((next_min, next_min + width - 1));
                    next_min += width;
                }
                prop_assert!(validate_tier_ranges(&ranges).is_ok());
            }
        }
    }
}
