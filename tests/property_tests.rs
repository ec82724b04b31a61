//! Property-based tests for totals, numbering and the status machines.
//!
//! These tests use proptest to check invariants that must hold for every
//! input, not just the handful of fixtures the integration suites use.

use fieldservice_api::{
    entities::{
        invoice::InvoiceStatus, purchase_order::PurchaseOrderStatus,
        service_request::RequestStatus,
    },
    lifecycle::{guard_transition, Lifecycle},
    money::{line_total, recompute, round_money, validate_quantity},
    sequence::{format_number, parse_number, DocumentKind},
};
use proptest::prelude::*;
use rust_decimal::Decimal;
use sea_orm::Iterable;

// Strategies for generating test data
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|thousandths| Decimal::new(thousandths, 3))
}

fn vat_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn kind_strategy() -> impl Strategy<Value = DocumentKind> {
    prop_oneof![
        Just(DocumentKind::ServiceRequest),
        Just(DocumentKind::Invoice),
        Just(DocumentKind::PurchaseOrder),
    ]
}

fn request_status() -> impl Strategy<Value = RequestStatus> {
    proptest::sample::select(RequestStatus::iter().collect::<Vec<_>>())
}

// Property: totals are always consistent with their parts
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn total_is_subtotal_plus_vat(
        lines in prop::collection::vec((quantity_strategy(), price_strategy()), 0..20),
        vat in vat_strategy(),
    ) {
        let totals = recompute(lines.iter().map(|(q, p)| line_total(*q, *p)), vat);
        prop_assert_eq!(totals.total, totals.subtotal + totals.vat_amount);
        prop_assert!(totals.subtotal >= Decimal::ZERO);
        prop_assert!(totals.vat_amount <= totals.subtotal);
        prop_assert!(totals.subtotal.scale() <= 2);
        prop_assert!(totals.vat_amount.scale() <= 2);
    }

    #[test]
    fn totals_do_not_depend_on_item_order(
        mut lines in prop::collection::vec((quantity_strategy(), price_strategy()), 1..10),
        vat in vat_strategy(),
    ) {
        let forward = recompute(lines.iter().map(|(q, p)| line_total(*q, *p)), vat);
        lines.reverse();
        let backward = recompute(lines.iter().map(|(q, p)| line_total(*q, *p)), vat);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn line_total_stays_within_half_a_cent(q in quantity_strategy(), p in price_strategy()) {
        let exact = q * p;
        let rounded = line_total(q, p);
        prop_assert!((rounded - exact).abs() <= Decimal::new(5, 3));
        prop_assert_eq!(round_money(rounded), rounded);
    }

    #[test]
    fn generated_quantities_are_accepted(q in quantity_strategy()) {
        prop_assert!(validate_quantity(q).is_ok());
    }
}

// Property: document numbers round-trip and sort like their sequence
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn numbers_parse_back(kind in kind_strategy(), year in 2000i32..2100, seq in 1i64..99_999) {
        let number = format_number(kind, year, seq);
        prop_assert_eq!(parse_number(kind, &number), Some((year, seq)));
    }

    #[test]
    fn five_digit_numbers_sort_by_sequence(
        kind in kind_strategy(),
        year in 2000i32..2100,
        a in 1i64..99_999,
        b in 1i64..99_999,
    ) {
        let (na, nb) = (format_number(kind, year, a), format_number(kind, year, b));
        prop_assert_eq!(na.cmp(&nb), a.cmp(&b));
    }
}

// Property: the status machines only move forward and never leave a terminal state
proptest! {
    #[test]
    fn random_walks_respect_the_request_table(steps in prop::collection::vec(request_status(), 0..30)) {
        let mut current = RequestStatus::New;
        for next in steps {
            let allowed = current.can_transition_to(next);
            prop_assert_eq!(guard_transition(current, next).is_ok(), allowed);
            if allowed {
                prop_assert!(!current.is_terminal());
                current = next;
            }
        }
    }
}

#[test]
fn every_non_terminal_state_can_be_cancelled() {
    for status in RequestStatus::iter().filter(|s| !s.is_terminal()) {
        if status != RequestStatus::Done {
            assert!(status.can_transition_to(RequestStatus::Cancelled), "{status}");
        }
    }
    for status in InvoiceStatus::iter().filter(|s| !s.is_terminal()) {
        assert!(status.can_transition_to(InvoiceStatus::Cancelled), "{status}");
    }
    for status in PurchaseOrderStatus::iter().filter(|s| !s.is_terminal()) {
        assert!(status.can_transition_to(PurchaseOrderStatus::Cancelled), "{status}");
    }
}
