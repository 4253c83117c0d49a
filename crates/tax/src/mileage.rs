use rust_decimal::Decimal;
use trajet_core::Money;

use crate::config::MileageRates;

/// CRA simplified-method allowance for `business_km`.
///
/// The first `tier_limit_km` kilometres are paid at the first-tier rate and
/// the rest at the second-tier rate. In a territory the bonus rate is added
/// on every business kilometre. Negative distances count as zero and the
/// result saturates instead of overflowing.
pub fn calculate_mileage_deduction(business_km: Decimal, rates: &MileageRates, in_territory: bool) -> Money {
    let km = business_km.max(Decimal::ZERO);
    let limit = rates.tier_limit_km.max(Decimal::ZERO);

    let first = km.min(limit);
    let rest = (km - limit).max(Decimal::ZERO);
    let mut total = first
        .saturating_mul(rates.first_tier_rate)
        .saturating_add(rest.saturating_mul(rates.second_tier_rate));
    if in_territory {
        total = total.saturating_add(km.saturating_mul(rates.territory_bonus_rate));
    }
    Money::from_decimal(total)
}
