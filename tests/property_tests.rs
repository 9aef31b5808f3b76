//! Property-based tests for the estimation engine.
//!
//! These verify the pricing invariants across a wide range of catalog
//! configurations rather than hand-picked examples.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use kitstudio_api::entities::{complexity_level, service_addon, service_type};
use kitstudio_api::estimation::{effective_multiplier, estimate_line};

fn service(base_price_cents: i64, base_days: i32) -> service_type::Model {
    service_type::Model {
        id: Uuid::new_v4(),
        name: "Service".into(),
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
        name: "Tier".into(),
        slug: "tier".into(),
        multiplier,
        sort_order: 0,
        active: true,
        created_at: Utc::now(),
    }
}

fn addon(service_id: Uuid, price_cents: i64, required: bool) -> service_addon::Model {
    service_addon::Model {
        id: Uuid::new_v4(),
        service_id,
        name: "Add-on".into(),
        price_cents,
        required,
        sort_order: 0,
        active: true,
        created_at: Utc::now(),
    }
}

/// Multipliers between 0.01 and 4.00 in cent steps.
fn multiplier_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=400).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn price_strategy() -> impl Strategy<Value = i64> {
    0i64..2_000_000_000
}

proptest! {
    #[test]
    fn effective_multiplier_prefers_the_override(
        default in multiplier_strategy(),
        override_value in multiplier_strategy(),
    ) {
        prop_assert_eq!(effective_multiplier(None, default), default);
        prop_assert_eq!(effective_multiplier(Some(override_value), default), override_value);
    }

    #[test]
    fn line_total_is_subtotal_plus_addons(
        base_price in price_strategy(),
        base_days in 0i32..3650,
        multiplier in multiplier_strategy(),
        addon_prices in prop::collection::vec(0i64..10_000_000, 0..6),
    ) {
        let svc = service(base_price, base_days);
        let cx = complexity(multiplier);
        let addons: Vec<_> = addon_prices
            .iter()
            .map(|price| addon(svc.id, *price, false))
            .collect();
        let selected: Vec<Uuid> = addons.iter().map(|a| a.id).collect();

        let line = estimate_line(&svc, &cx, None, &addons, &selected).unwrap();
        prop_assert_eq!(line.total_cents, line.subtotal_cents + line.addon_total_cents);
        prop_assert_eq!(line.addon_total_cents, addon_prices.iter().sum::<i64>());
        prop_assert!(line.subtotal_cents >= 0);
        prop_assert!(line.duration_days >= 0);
    }

    #[test]
    fn adding_an_optional_addon_never_decreases_the_total(
        base_price in price_strategy(),
        multiplier in multiplier_strategy(),
        addon_prices in prop::collection::vec(0i64..10_000_000, 1..6),
        keep in 0usize..6,
    ) {
        let svc = service(base_price, 10);
        let cx = complexity(multiplier);
        let addons: Vec<_> = addon_prices
            .iter()
            .map(|price| addon(svc.id, *price, false))
            .collect();

        let keep = keep.min(addons.len() - 1);
        let subset: Vec<Uuid> = addons.iter().take(keep).map(|a| a.id).collect();
        let superset: Vec<Uuid> = addons.iter().take(keep + 1).map(|a| a.id).collect();

        let smaller = estimate_line(&svc, &cx, None, &addons, &subset).unwrap();
        let larger = estimate_line(&svc, &cx, None, &addons, &superset).unwrap();
        prop_assert!(larger.total_cents >= smaller.total_cents);
    }

    #[test]
    fn required_addons_are_always_billed(
        base_price in price_strategy(),
        multiplier in multiplier_strategy(),
        required_price in 0i64..10_000_000,
        optional_price in 0i64..10_000_000,
        select_required in any::<bool>(),
    ) {
        let svc = service(base_price, 10);
        let cx = complexity(multiplier);
        let required = addon(svc.id, required_price, true);
        let optional = addon(svc.id, optional_price, false);
        let addons = vec![required.clone(), optional];

        let selected: Vec<Uuid> = if select_required {
            vec![required.id]
        } else {
            Vec::new()
        };

        let line = estimate_line(&svc, &cx, None, &addons, &selected).unwrap();
        prop_assert!(line.addon_ids.contains(&required.id));
        prop_assert_eq!(line.addon_total_cents, required_price);
    }

    #[test]
    fn subtotal_rounds_the_scaled_base_price_once(
        base_price in 0i64..1_000_000_000,
        multiplier in multiplier_strategy(),
    ) {
        let svc = service(base_price, 10);
        let cx = complexity(multiplier);
        let line = estimate_line(&svc, &cx, None, &[], &[]).unwrap();

        let exact = Decimal::from(base_price) * multiplier;
        let diff = (exact - Decimal::from(line.subtotal_cents)).abs();
        // Rounded once to the nearest cent: never off by half a cent or more.
        prop_assert!(diff <= Decimal::new(5, 1));
    }

    #[test]
    fn cross_service_addons_always_fail(
        base_price in price_strategy(),
        multiplier in multiplier_strategy(),
        foreign_price in 0i64..10_000_000,
    ) {
        let svc = service(base_price, 10);
        let cx = complexity(multiplier);
        let foreign = addon(Uuid::new_v4(), foreign_price, false);
        let addons = vec![foreign.clone()];

        prop_assert!(estimate_line(&svc, &cx, None, &addons, &[foreign.id]).is_err());
    }
}
