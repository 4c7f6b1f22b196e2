use chrono::NaiveDate;
use serde::Serialize;

use crate::models::service::{Amount, Service};
use crate::services::currency::format_idr;

pub struct PricingService;

/// Price preview shown under a booking form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub unit_price: Amount,
    /// Participants, quantity or rental days, depending on the service.
    pub units: u32,
    pub base_subtotal: Amount,
    pub addons_total: Amount,
    pub discount: Amount,
    pub grand_total: Amount,
}

impl PriceBreakdown {
    pub fn formatted_total(&self) -> String {
        format_idr(self.grand_total)
    }
}

fn non_negative(amount: Amount) -> Amount {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

impl PricingService {
    /// Price per unit for `pax` participants.
    ///
    /// Tiers are tried in ascending `min_pax` order and the first range
    /// containing `pax` wins. A head count above every tier's maximum pays
    /// the last tier's price. Anything else (no tiers, a gap between tiers,
    /// below the first tier) pays the service's flat price.
    pub fn resolve_unit_price(service: &Service, pax: u32) -> Amount {
        let flat = non_negative(service.base_price());

        let mut tiers: Vec<_> = service.tiers().iter().collect();
        if tiers.is_empty() {
            return flat;
        }
        tiers.sort_by_key(|tier| tier.min_pax);

        if let Some(tier) = tiers.iter().find(|tier| tier.contains(pax)) {
            return non_negative(tier.price);
        }

        if pax > 0 {
            if let Some(last) = tiers.last() {
                if last.max_pax.map_or(false, |max| pax > max) {
                    return non_negative(last.price);
                }
            }
        }

        flat
    }

    /// Sum of the selected add-ons still offered by the service.
    pub fn compute_addons_total(service: &Service, selected: &[String]) -> Amount {
        let addons = service.addons();
        selected
            .iter()
            .filter_map(|name| addons.iter().find(|addon| &addon.name == name))
            .map(|addon| non_negative(addon.price))
            .sum()
    }

    /// `unit_price * units + addons_total - discount`, never below zero.
    pub fn compute_grand_total(
        unit_price: Amount,
        units: u32,
        addons_total: Amount,
        discount: Amount,
    ) -> Amount {
        let total = unit_price * units as f64 + addons_total - discount;
        total.max(0.0)
    }

    /// Days billed for a rental, counting both ends.
    pub fn rental_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> u32 {
        match (start, end) {
            (Some(start), Some(end)) => (end - start).num_days().unsigned_abs() as u32 + 1,
            _ => 0,
        }
    }

    pub fn breakdown(
        service: &Service,
        units: u32,
        selected_addons: &[String],
        discount: Amount,
    ) -> PriceBreakdown {
        let unit_price = Self::resolve_unit_price(service, units);
        let addons_total = Self::compute_addons_total(service, selected_addons);
        PriceBreakdown {
            unit_price,
            units,
            base_subtotal: unit_price * units as f64,
            addons_total,
            discount,
            grand_total: Self::compute_grand_total(unit_price, units, addons_total, discount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::service::{Addon, PriceTier};

    fn tier(min_pax: u32, max_pax: Option<u32>, price: Amount) -> PriceTier {
        PriceTier { min_pax, max_pax, price }
    }

    fn tiered_service() -> Service {
        Service {
            id: 1,
            starting_from_price: Some(120.0),
            // deliberately out of order
            price_tiers: Some(vec![
                tier(6, None, 80.0),
                tier(1, Some(2), 100.0),
                tier(3, Some(5), 90.0),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_tier_resolution() {
        let service = tiered_service();
        assert_eq!(PricingService::resolve_unit_price(&service, 1), 100.0);
        assert_eq!(PricingService::resolve_unit_price(&service, 3), 90.0);
        assert_eq!(PricingService::resolve_unit_price(&service, 5), 90.0);
        assert_eq!(PricingService::resolve_unit_price(&service, 6), 80.0);
        assert_eq!(PricingService::resolve_unit_price(&service, 100), 80.0);
    }

    #[test]
    fn test_pax_above_bounded_last_tier_uses_last_price() {
        let service = Service {
            id: 2,
            starting_from_price: Some(500.0),
            price_tiers: Some(vec![tier(1, Some(2), 100.0), tier(3, Some(5), 90.0)]),
            ..Default::default()
        };
        assert_eq!(PricingService::resolve_unit_price(&service, 9), 90.0);
    }

    #[test]
    fn test_gap_and_zero_pax_use_flat_price() {
        let service = Service {
            id: 3,
            starting_from_price: Some(150.0),
            price_tiers: Some(vec![tier(2, Some(3), 100.0), tier(6, Some(8), 90.0)]),
            ..Default::default()
        };
        assert_eq!(PricingService::resolve_unit_price(&service, 4), 150.0);
        assert_eq!(PricingService::resolve_unit_price(&service, 1), 150.0);
        assert_eq!(PricingService::resolve_unit_price(&service, 0), 150.0);
    }

    #[test]
    fn test_flat_price_without_tiers() {
        let service = Service { id: 4, price: Some(200000.0), ..Default::default() };
        assert_eq!(PricingService::resolve_unit_price(&service, 2), 200000.0);

        let free = Service { id: 5, ..Default::default() };
        assert_eq!(PricingService::resolve_unit_price(&free, 2), 0.0);

        let negative = Service { id: 6, price: Some(-10.0), ..Default::default() };
        assert_eq!(PricingService::resolve_unit_price(&negative, 1), 0.0);
    }

    #[test]
    fn test_addon_summation() {
        let service = Service {
            id: 7,
            addons: Some(vec![
                Addon { name: "Photo".into(), price: 50.0 },
                Addon { name: "Lunch".into(), price: 30.0 },
                Addon { name: "Guide".into(), price: 20.0 },
            ]),
            ..Default::default()
        };

        let selected = vec!["Photo".to_string(), "Lunch".to_string()];
        assert_eq!(PricingService::compute_addons_total(&service, &selected), 80.0);

        let stale = vec!["Photo".to_string(), "Helicopter".to_string()];
        assert_eq!(PricingService::compute_addons_total(&service, &stale), 50.0);

        assert_eq!(PricingService::compute_addons_total(&service, &[]), 0.0);
        let bare = Service { id: 8, ..Default::default() };
        assert_eq!(PricingService::compute_addons_total(&bare, &selected), 0.0);
    }

    #[test]
    fn test_grand_total_is_clamped() {
        assert_eq!(PricingService::compute_grand_total(100.0, 1, 0.0, 500.0), 0.0);
        assert_eq!(PricingService::compute_grand_total(100.0, 3, 25.0, 25.0), 300.0);
    }

    #[test]
    fn test_rental_days_inclusive() {
        let start = NaiveDate::from_ymd_opt(2026, 11, 1);
        let end = NaiveDate::from_ymd_opt(2026, 11, 3);
        assert_eq!(PricingService::rental_days(start, end), 3);
        assert_eq!(PricingService::rental_days(start, start), 1);
        assert_eq!(PricingService::rental_days(start, None), 0);
    }

    #[test]
    fn test_idr_scenario() {
        let service = Service { id: 9, price: Some(200000.0), ..Default::default() };
        let breakdown = PricingService::breakdown(&service, 2, &[], 50000.0);

        assert_eq!(breakdown.base_subtotal, 400000.0);
        assert_eq!(breakdown.grand_total, 350000.0);
        assert_eq!(breakdown.formatted_total(), "Rp350.000");
    }
}
