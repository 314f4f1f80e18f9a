use crate::customer::FarePolicy;
use crate::customer::FrequentFlyerStatus::{EliteLight, EliteRegular, NoStatus, Prestige, SuperElite};
use crate::customer::FrequentFlyerStatus;
use crate::error::LedgerError;
use crate::flight::CabinClass::{Business, Economy};
use crate::flight::FlightSegment;
use crate::ledger::tests::utils::{RATE, add_customer, assert_close, booked_network, date, id, leg, network, registry, seg};
use std::sync::Arc;
use crate::time::Minutes;

#[test]
fn test_status_thresholds() {
    assert_eq!(NoStatus, FrequentFlyerStatus::for_miles(0));
    assert_eq!(NoStatus, FrequentFlyerStatus::for_miles(14_999));
    assert_eq!(Prestige, FrequentFlyerStatus::for_miles(15_000));
    assert_eq!(EliteLight, FrequentFlyerStatus::for_miles(30_000));
    assert_eq!(EliteLight, FrequentFlyerStatus::for_miles(49_999));
    assert_eq!(EliteRegular, FrequentFlyerStatus::for_miles(50_000));
    assert_eq!(SuperElite, FrequentFlyerStatus::for_miles(250_000));

    assert_eq!(0, NoStatus.discount_pct());
    assert_eq!(10, Prestige.discount_pct());
    assert_eq!(15, EliteLight.discount_pct());
    assert_eq!(20, EliteRegular.discount_pct());
    assert_eq!(25, SuperElite.discount_pct());
    assert_eq!("Elite-Light", EliteLight.to_string());
}

#[test]
fn test_business_leg_reaches_prestige() {
    let mut ledger = network();
    let legs = vec![(seg(&ledger, "AC500"), Business)];
    ledger.book(1, id("T1"), &legs, date("2020-03-01")).unwrap();

    let customer = ledger.customer(1).unwrap();
    assert_eq!(20_000, customer.qualifying_miles());
    assert_eq!(Prestige, customer.status());
    assert_close(1000.0, customer.lifetime_cost());
    assert_close(1000.0, customer.cost_of_trip("T1").unwrap());
    assert!(seg(&ledger, "AC500").check_manifest(1));
}

#[test]
fn test_miles_saturate_on_huge_lengths() {
    let registry = registry();
    let far = FlightSegment::new(leg("ZZ900", "YYZ", "LHR", "2020-01-05 08:00", "2020-01-05 15:00", 1e300), RATE, &registry).unwrap();
    let near = FlightSegment::new(leg("ZZ901", "LHR", "YUL", "2020-01-06 08:00", "2020-01-06 15:00", 10.0), RATE, &registry).unwrap();
    let mut customers = Vec::new();
    add_customer(&mut customers, 7, "Grace Hopper");
    let customer = &mut customers[0];

    customer.book_trip(id("T1"), &[(Arc::new(far), Business)], date("2020-01-05"));
    customer.book_trip(id("T2"), &[(Arc::new(near), Economy)], date("2020-01-06"));

    assert_eq!(u64::MAX, customer.qualifying_miles());
    assert_eq!(SuperElite, customer.status());
    assert_eq!(2, customer.booked_trips().len());
}

#[test]
fn test_discount_uses_status_held_before_trip() {
    let mut ledger = network();
    let first = vec![(seg(&ledger, "AC300"), Business)];
    ledger.book(1, id("T1"), &first, date("2020-01-31")).unwrap();
    let second = vec![(seg(&ledger, "AC400"), Economy)];
    ledger.book(1, id("T2"), &second, date("2020-02-10")).unwrap();

    let customer = ledger.customer(1).unwrap();
    assert_close(836.25, customer.cost_of_trip("T1").unwrap());
    assert_close(301.05, customer.cost_of_trip("T2").unwrap());
    assert_close(1137.3, customer.lifetime_cost());
    assert_eq!(20_070, customer.qualifying_miles());
    assert_eq!(Prestige, customer.status());
}

#[test]
fn test_status_earned_mid_trip_applies_to_next_trip() {
    let mut ledger = network();
    let legs = vec![(seg(&ledger, "AC200"), Business), (seg(&ledger, "AC500"), Business)];
    ledger.book(1, id("T1"), &legs, date("2020-01-05")).unwrap();
    {
        let customer = ledger.customer(1).unwrap();
        assert_eq!(46_105, customer.qualifying_miles());
        assert_eq!(EliteLight, customer.status());
        assert_close(2305.25, customer.cost_of_trip("T1").unwrap());
    }

    let next = vec![(seg(&ledger, "AC100"), Economy)];
    ledger.book(1, id("T2"), &next, date("2020-01-05")).unwrap();
    assert_close(42.84, ledger.customer(1).unwrap().cost_of_trip("T2").unwrap());
}

#[test]
fn test_rejected_seat_accrues_nothing() {
    let mut ledger = network();
    seg(&ledger, "AC500").book_seat(1, Economy).unwrap();
    let legs = vec![(seg(&ledger, "AC500"), Business)];
    let trip = ledger.book(1, id("T1"), &legs, date("2020-03-01")).unwrap();

    let customer = ledger.customer(1).unwrap();
    assert_eq!(0, customer.qualifying_miles());
    assert_close(0.0, customer.lifetime_cost());
    assert_eq!(1, trip.segments().len());
    assert_eq!(Some(Economy), seg(&ledger, "AC500").check_seat_class(1));
}

#[test]
fn test_cancel_reverses_cost_but_keeps_miles() {
    let mut ledger = booked_network();
    assert_eq!(2, seg(&ledger, "AC100").seat_availability(Economy));

    let reversed = ledger.cancel("R1").unwrap();
    assert_close(1355.65, reversed);

    let customer = ledger.customer(1).unwrap();
    assert_close(0.0, customer.lifetime_cost());
    assert_close(0.0, customer.cost_of_trip("R1").unwrap());
    assert_eq!(26_609, customer.qualifying_miles());
    assert_eq!(Prestige, customer.status());
    assert!(customer.find_trip("R1").is_some());

    assert_eq!(1, seg(&ledger, "AC100").seat_availability(Economy));
    assert!(!seg(&ledger, "AC100").check_manifest(1));
    assert!(seg(&ledger, "AC100").check_manifest(3));
    assert_eq!(0, seg(&ledger, "AC200").seat_availability(Business));
}

#[test]
fn test_cancel_twice_is_noop() {
    let mut ledger = booked_network();
    ledger.cancel("R2").unwrap();
    let lifetime = ledger.customer(2).unwrap().lifetime_cost();

    assert_close(0.0, ledger.cancel("R2").unwrap());
    assert_close(lifetime, ledger.customer(2).unwrap().lifetime_cost());
}

#[test]
fn test_partial_cancel_with_fee() {
    let mut ledger = booked_network();
    let trip = ledger.customer(2).unwrap().find_trip("R2").unwrap().clone();
    let legs = vec![(seg(&ledger, "AC400"), Economy), (seg(&ledger, "AC500"), Economy)];
    let policy = FarePolicy { cancellation_fee: 25.0 };

    let reversed = ledger.customers[1].cancel_trip(&trip, &legs, &policy).unwrap();
    assert_close(334.5, reversed);

    let customer = ledger.customer(2).unwrap();
    assert_close(811.25, customer.lifetime_cost());
    assert_close(836.25, customer.cost_of_trip("R2").unwrap());
    assert!(seg(&ledger, "AC300").check_manifest(2));
    assert!(!seg(&ledger, "AC400").check_manifest(2));
    assert_eq!(0, seg(&ledger, "AC500").seat_availability(Economy));
}

#[test]
fn test_cancel_refunds_cabin_actually_held() {
    let mut ledger = booked_network();
    let legs = vec![(seg(&ledger, "AC300"), Economy)];
    let reversed = ledger.cancel_legs("R2", &legs).unwrap();
    assert_close(836.25, reversed);
    assert_eq!(0, seg(&ledger, "AC300").seat_availability(Business));
}

#[test]
fn test_booking_errors() {
    let mut ledger = booked_network();
    let legs = vec![(seg(&ledger, "AC500"), Economy)];

    assert!(matches!(
        ledger.book(2, id("R1"), &legs, date("2020-03-01")),
        Err(LedgerError::DuplicateReservation(_))
    ));
    assert!(matches!(
        ledger.book(99, id("R9"), &legs, date("2020-03-01")),
        Err(LedgerError::UnknownCustomer(99))
    ));
    assert!(matches!(ledger.cancel("NOPE"), Err(LedgerError::UnknownTrip(_))));
    assert_eq!(0, seg(&ledger, "AC500").seat_availability(Economy));
}

#[test]
fn test_trip_times_and_summary() {
    let ledger = booked_network();
    let (_, trip) = ledger.find_trip("R1").unwrap();
    assert_eq!(Minutes(775), trip.in_flight_time());
    assert_eq!(Minutes(1330), trip.total_trip_time());
    assert_eq!("[AC100]:YYZ->YUL, [AC200]:YUL->LHR", trip.itinerary());

    let summary = ledger.trip_summary("R1").unwrap();
    assert_eq!(1, summary.customer_id);
    assert_close(1355.65, summary.cost);
    assert_eq!(Minutes(1330), summary.total_time);
    assert_eq!(Minutes(775), summary.in_flight_time);
    assert!(summary.to_string().contains("$1355.65"));

    assert!(ledger.trip_summary("NOPE").is_none());
}
