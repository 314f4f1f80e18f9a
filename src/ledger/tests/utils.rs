use crate::airport::{Airport, AirportId, AirportRegistry};
use crate::customer::{Customer, CustomerId, CustomerRecord, FarePolicy};
use crate::flight::{CabinClass, FlightSegment, ScheduledLeg, SegmentRef};
use crate::ledger::ledger::Ledger;
use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::Strategy;
use proptest::prop_oneof;
use proptest::strategy::Just;
use std::collections::HashMap;
use std::sync::Arc;

pub const RATE: f64 = 0.1;

pub fn id(s: &str) -> Arc<str> {
    Arc::from(s)
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn assert_close(expected: f64, actual: f64) {
    assert!(
        (expected - actual).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub fn add_airport(airports: &mut HashMap<AirportId, Airport>, airport_id: &str, longitude: f64, latitude: f64) {
    airports.insert(
        id(airport_id),
        Airport {
            id: id(airport_id),
            name: format!("{} International", airport_id),
            location: (longitude, latitude),
        },
    );
}

pub fn leg(
    flight_id: &str,
    origin_id: &str,
    destination_id: &str,
    departure: &str,
    arrival: &str,
    length_km: f64,
) -> ScheduledLeg {
    ScheduledLeg {
        id: id(flight_id),
        origin_id: id(origin_id),
        destination_id: id(destination_id),
        departure_time: at(departure),
        arrival_time: at(arrival),
        length_km,
        base_rate: Some(RATE),
        capacity: None,
    }
}

pub fn add_segment(segments: &mut Vec<FlightSegment>, registry: &AirportRegistry, scheduled: ScheduledLeg) {
    segments.push(FlightSegment::new(scheduled, RATE, registry).unwrap());
}

pub fn add_customer(customers: &mut Vec<Customer>, customer_id: CustomerId, name: &str) {
    customers.push(Customer::new(CustomerRecord {
        id: customer_id,
        name: name.to_string(),
        age: 40,
        nationality: "Canadian".to_string(),
    }));
}

pub fn registry() -> AirportRegistry {
    let mut airports = HashMap::new();
    add_airport(&mut airports, "YYZ", -79.6306, 43.6772);
    add_airport(&mut airports, "YUL", -73.7408, 45.4706);
    add_airport(&mut airports, "YVR", -123.1840, 49.1939);
    add_airport(&mut airports, "LHR", -0.4619, 51.4706);
    AirportRegistry::new(airports)
}

/// Five legs, three customers, nothing booked.
///
/// | flight | route   | departure        | arrival          | minutes | km   |
/// |--------|---------|------------------|------------------|---------|------|
/// | AC100  | YYZ-YUL | 2020-01-05 08:00 | 2020-01-05 09:15 | 75      | 504  |
/// | AC200  | YUL-LHR | 2020-01-05 18:30 | 2020-01-06 06:10 | 700     | 5221 |
/// | AC300  | YYZ-YVR | 2020-01-31 21:00 | 2020-02-01 01:50 | 290     | 3345 |
/// | AC400  | YVR-YYZ | 2020-02-10 10:00 | 2020-02-10 14:30 | 270     | 3345 |
/// | AC500  | YUL-YVR | 2020-03-01 07:00 | 2020-03-01 12:00 | 300     | 4000 |
pub fn network() -> Ledger {
    let registry = registry();
    let mut segments = Vec::new();
    add_segment(&mut segments, &registry, leg("AC100", "YYZ", "YUL", "2020-01-05 08:00", "2020-01-05 09:15", 504.0));
    add_segment(&mut segments, &registry, leg("AC200", "YUL", "LHR", "2020-01-05 18:30", "2020-01-06 06:10", 5221.0));
    add_segment(&mut segments, &registry, leg("AC300", "YYZ", "YVR", "2020-01-31 21:00", "2020-02-01 01:50", 3345.0));
    add_segment(&mut segments, &registry, leg("AC400", "YVR", "YYZ", "2020-02-10 10:00", "2020-02-10 14:30", 3345.0));
    add_segment(&mut segments, &registry, leg("AC500", "YUL", "YVR", "2020-03-01 07:00", "2020-03-01 12:00", 4000.0));

    let mut customers = Vec::new();
    add_customer(&mut customers, 1, "Ada Lovelace");
    add_customer(&mut customers, 2, "Kenji Watanabe");
    add_customer(&mut customers, 3, "Marie Tremblay");

    Ledger::new(registry, segments, customers, FarePolicy::default())
}

/// `network()` with three trips booked:
/// R1 (customer 1): AC100 Economy, AC200 Business
/// R2 (customer 2): AC300 Business, AC400 Economy
/// R3 (customer 3): AC100 Economy
pub fn booked_network() -> Ledger {
    let mut ledger = network();
    let r1 = vec![
        (seg(&ledger, "AC100"), CabinClass::Economy),
        (seg(&ledger, "AC200"), CabinClass::Business),
    ];
    let r2 = vec![
        (seg(&ledger, "AC300"), CabinClass::Business),
        (seg(&ledger, "AC400"), CabinClass::Economy),
    ];
    let r3 = vec![(seg(&ledger, "AC100"), CabinClass::Economy)];
    ledger.book(1, id("R1"), &r1, date("2020-01-05")).unwrap();
    ledger.book(2, id("R2"), &r2, date("2020-01-31")).unwrap();
    ledger.book(3, id("R3"), &r3, date("2020-01-05")).unwrap();
    ledger
}

pub fn seg(ledger: &Ledger, flight_id: &str) -> SegmentRef {
    ledger
        .segments()
        .iter()
        .find(|s| &*s.id == flight_id)
        .cloned()
        .unwrap()
}

pub fn ids(segments: &[SegmentRef]) -> Vec<String> {
    segments.iter().map(|s| s.id.to_string()).collect()
}

pub fn arb_class() -> impl Strategy<Value = CabinClass> {
    prop_oneof![Just(CabinClass::Economy), Just(CabinClass::Business)]
}

pub fn arb_flight() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("AC100"),
        Just("AC200"),
        Just("AC300"),
        Just("AC400"),
        Just("AC500"),
    ]
}
