//! Price and duration estimation.
//!
//! The engine is pure: it takes catalog rows plus a selection and produces a
//! per-line estimate, leaving all persistence to the service layer. Money is
//! integer minor units end to end; the only rounding happens once per line,
//! after the multiplier is applied.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{complexity_level, service_addon, service_type};
use crate::errors::ServiceError;

/// Estimate for a single order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LineEstimate {
    pub service_id: Uuid,
    pub complexity_id: Uuid,
    /// Multiplier actually applied: the service override when configured,
    /// otherwise the tier default.
    pub effective_multiplier: Decimal,
    pub subtotal_cents: i64,
    pub addon_total_cents: i64,
    pub total_cents: i64,
    pub duration_days: i32,
    /// Materialized add-on selection, required add-ons included.
    pub addon_ids: Vec<Uuid>,
}

/// Aggregate estimate across all lines of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderEstimate {
    pub total_cents: i64,
    pub total_days: i32,
    pub lines: Vec<LineEstimate>,
}

/// The multiplier in force for a (service, complexity) pair.
pub fn effective_multiplier(
    override_multiplier: Option<Decimal>,
    default_multiplier: Decimal,
) -> Decimal {
    override_multiplier.unwrap_or(default_multiplier)
}

fn round_scaled(value: Decimal) -> Result<i64, ServiceError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| ServiceError::InternalError("estimate exceeds representable range".into()))
}

/// Computes the estimate for one line.
///
/// `catalog_addons` must be the add-on catalog of the selected service; the
/// selection is validated against it so stale cross-service add-on ids (e.g.
/// kept in a form after the service changed) are rejected rather than priced.
pub fn estimate_line(
    service: &service_type::Model,
    complexity: &complexity_level::Model,
    override_multiplier: Option<Decimal>,
    catalog_addons: &[service_addon::Model],
    selected_addon_ids: &[Uuid],
) -> Result<LineEstimate, ServiceError> {
    let multiplier = effective_multiplier(override_multiplier, complexity.multiplier);
    if multiplier <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "Multiplier for complexity '{}' must be positive, got {}",
            complexity.name, multiplier
        )));
    }

    let by_id: HashMap<Uuid, &service_addon::Model> = catalog_addons
        .iter()
        .filter(|addon| addon.service_id == service.id)
        .map(|addon| (addon.id, addon))
        .collect();

    let mut materialized: BTreeSet<Uuid> = BTreeSet::new();
    for addon_id in selected_addon_ids {
        let addon = by_id.get(addon_id).ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Add-on {} does not belong to service '{}'",
                addon_id, service.name
            ))
        })?;
        if !addon.active {
            return Err(ServiceError::ValidationError(format!(
                "Add-on '{}' is no longer available",
                addon.name
            )));
        }
        materialized.insert(addon.id);
    }

    // Required add-ons are billed whether or not the caller picked them.
    for addon in by_id.values() {
        if addon.required && addon.active {
            materialized.insert(addon.id);
        }
    }

    let addon_total_cents: i64 = materialized
        .iter()
        .map(|id| by_id[id].price_cents)
        .sum();

    let subtotal_cents = round_scaled(Decimal::from(service.base_price_cents) * multiplier)?;
    let duration_days = round_scaled(Decimal::from(service.base_days) * multiplier)?
        .to_i32()
        .ok_or_else(|| {
            ServiceError::InternalError("estimated duration exceeds representable range".into())
        })?;

    Ok(LineEstimate {
        service_id: service.id,
        complexity_id: complexity.id,
        effective_multiplier: multiplier,
        subtotal_cents,
        addon_total_cents,
        total_cents: subtotal_cents + addon_total_cents,
        duration_days,
        addon_ids: materialized.into_iter().collect(),
    })
}

/// Sums per-line totals into the order-level estimate.
pub fn estimate_order(lines: Vec<LineEstimate>) -> OrderEstimate {
    let total_cents = lines.iter().map(|line| line.total_cents).sum();
    let total_days = lines.iter().map(|line| line.duration_days).sum();
    OrderEstimate {
        total_cents,
        total_days,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn service(base_price_cents: i64, base_days: i32) -> service_type::Model {
        service_type::Model {
            id: Uuid::new_v4(),
            name: "Full Custom Build".into(),
            description: None,
            base_price_cents,
            base_days,
            icon: None,
            sort_order: 0,
            active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn complexity(multiplier: Decimal) -> complexity_level::Model {
        complexity_level::Model {
            id: Uuid::new_v4(),
            name: "High".into(),
            slug: "high".into(),
            multiplier,
            sort_order: 2,
            active: true,
            created_at: Utc::now(),
        }
    }

    fn addon(
        service_id: Uuid,
        price_cents: i64,
        required: bool,
        active: bool,
    ) -> service_addon::Model {
        service_addon::Model {
            id: Uuid::new_v4(),
            service_id,
            name: "LED unit".into(),
            price_cents,
            required,
            sort_order: 0,
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn default_multiplier_applies_without_override() {
        assert_eq!(effective_multiplier(None, dec!(1.5)), dec!(1.5));
    }

    #[test]
    fn override_multiplier_wins_when_configured() {
        assert_eq!(effective_multiplier(Some(dec!(1.75)), dec!(1.5)), dec!(1.75));
    }

    #[test]
    fn base_price_is_scaled_then_rounded() {
        let svc = service(500_000, 30);
        let cx = complexity(dec!(1.5));
        let line = estimate_line(&svc, &cx, None, &[], &[]).unwrap();
        assert_eq!(line.subtotal_cents, 750_000);
        assert_eq!(line.total_cents, 750_000);
    }

    #[test]
    fn selected_optional_addon_is_added_to_total() {
        let svc = service(500_000, 30);
        let cx = complexity(dec!(1.5));
        let optional = addon(svc.id, 50_000, false, true);
        let addons = vec![optional.clone()];
        let line = estimate_line(&svc, &cx, None, &addons, &[optional.id]).unwrap();
        assert_eq!(line.total_cents, 800_000);
        assert_eq!(line.addon_ids, vec![optional.id]);
    }

    #[test]
    fn duration_scales_with_the_multiplier() {
        let svc = service(500_000, 30);
        let cx = complexity(dec!(2.0));
        let line = estimate_line(&svc, &cx, None, &[], &[]).unwrap();
        assert_eq!(line.duration_days, 60);
    }

    #[test]
    fn required_addons_are_billed_even_when_not_selected() {
        let svc = service(100_000, 10);
        let cx = complexity(dec!(1.0));
        let required = addon(svc.id, 25_000, true, true);
        let addons = vec![required.clone()];
        let line = estimate_line(&svc, &cx, None, &addons, &[]).unwrap();
        assert_eq!(line.addon_total_cents, 25_000);
        assert_eq!(line.addon_ids, vec![required.id]);
    }

    #[test]
    fn selecting_a_required_addon_does_not_double_bill() {
        let svc = service(100_000, 10);
        let cx = complexity(dec!(1.0));
        let required = addon(svc.id, 25_000, true, true);
        let addons = vec![required.clone()];
        let line = estimate_line(&svc, &cx, None, &addons, &[required.id]).unwrap();
        assert_eq!(line.addon_total_cents, 25_000);
        assert_eq!(line.addon_ids.len(), 1);
    }

    #[test]
    fn cross_service_addon_is_rejected() {
        let svc = service(100_000, 10);
        let cx = complexity(dec!(1.0));
        let foreign = addon(Uuid::new_v4(), 10_000, false, true);
        let addons = vec![foreign.clone()];
        let err = estimate_line(&svc, &cx, None, &addons, &[foreign.id]).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn inactive_addon_is_rejected_when_selected() {
        let svc = service(100_000, 10);
        let cx = complexity(dec!(1.0));
        let retired = addon(svc.id, 10_000, false, false);
        let addons = vec![retired.clone()];
        let err = estimate_line(&svc, &cx, None, &addons, &[retired.id]).unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[test]
    fn inactive_required_addon_is_not_billed() {
        let svc = service(100_000, 10);
        let cx = complexity(dec!(1.0));
        let retired = addon(svc.id, 10_000, true, false);
        let addons = vec![retired];
        let line = estimate_line(&svc, &cx, None, &addons, &[]).unwrap();
        assert_eq!(line.addon_total_cents, 0);
    }

    #[test]
    fn rounding_happens_once_at_the_end_of_the_line() {
        // 333 * 1.115 = 371.295 -> 371; rounding the multiplier first
        // (1.115 -> 1.12) would give 373.
        let svc = service(333, 3);
        let cx = complexity(dec!(1.115));
        let line = estimate_line(&svc, &cx, None, &[], &[]).unwrap();
        assert_eq!(line.subtotal_cents, 371);
        // 3 * 1.115 = 3.345 -> 3
        assert_eq!(line.duration_days, 3);
    }

    #[test]
    fn midpoints_round_away_from_zero() {
        // 5 * 1.5 = 7.5 -> 8, not banker's 7.
        let svc = service(5, 1);
        let cx = complexity(dec!(1.5));
        let line = estimate_line(&svc, &cx, None, &[], &[]).unwrap();
        assert_eq!(line.subtotal_cents, 8);
    }

    #[test]
    fn zero_or_negative_multiplier_is_rejected() {
        let svc = service(100, 1);
        let cx = complexity(dec!(0));
        assert!(estimate_line(&svc, &cx, None, &[], &[]).is_err());
        let cx = complexity(dec!(1.0));
        assert!(estimate_line(&svc, &cx, Some(dec!(-1)), &[], &[]).is_err());
    }

    #[test]
    fn order_estimate_sums_lines() {
        let svc = service(500_000, 30);
        let cx = complexity(dec!(1.5));
        let line_a = estimate_line(&svc, &cx, None, &[], &[]).unwrap();
        let line_b = estimate_line(&svc, &cx, Some(dec!(2.0)), &[], &[]).unwrap();
        let order = estimate_order(vec![line_a.clone(), line_b.clone()]);
        assert_eq!(order.total_cents, line_a.total_cents + line_b.total_cents);
        assert_eq!(order.total_days, line_a.duration_days + line_b.duration_days);
        assert_eq!(order.lines.len(), 2);
    }

    #[test]
    fn empty_order_estimate_is_zero() {
        let order = estimate_order(Vec::new());
        assert_eq!(order.total_cents, 0);
        assert_eq!(order.total_days, 0);
    }
}
