use crate::airport::AirportRegistry;
use crate::customer::{Customer, CustomerId, FarePolicy};
use crate::error::LedgerError;
use crate::filter::all_trip_segments;
use crate::flight::{CabinClass, FlightSegment, SegmentRef};
use crate::time::Minutes;
use crate::trip::{ReservationId, Trip};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tabled::Tabled;
use tracing::info;

pub struct Ledger {
    pub(crate) airports: AirportRegistry,
    pub(crate) segments: Vec<SegmentRef>,
    segments_by_date: BTreeMap<NaiveDate, Vec<usize>>,
    pub(crate) customers: Vec<Customer>,
    customers_index: HashMap<CustomerId, usize>,
    policy: FarePolicy,
}

pub struct TripSummary {
    pub reservation_id: ReservationId,
    pub customer_id: CustomerId,
    pub departure_date: NaiveDate,
    pub itinerary: String,
    pub cost: f64,
    pub total_time: Minutes,
    pub in_flight_time: Minutes,
}

impl fmt::Display for TripSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary of Trip (ID: {}):", self.reservation_id)?;
        writeln!(f, "  Customer:       {}", self.customer_id)?;
        writeln!(f, "  Departure date: {}", self.departure_date)?;
        writeln!(f, "  Itinerary:      {}", self.itinerary)?;
        writeln!(f, "  Cost:           ${:.2}", self.cost)?;
        writeln!(f, "  Total time:     {} ({} minutes)", self.total_time, self.total_time.0)?;
        write!(f, "  In-flight time: {} ({} minutes)", self.in_flight_time, self.in_flight_time.0)
    }
}

#[derive(Tabled)]
pub struct LedgerStats {
    #[tabled(rename = "Airports")]
    pub airports: usize,
    #[tabled(rename = "Segments")]
    pub segments: usize,
    #[tabled(rename = "Customers")]
    pub customers: usize,
    #[tabled(rename = "Trips")]
    pub trips: usize,
    #[tabled(rename = "Seats booked")]
    pub seats_booked: u32,
}

impl Ledger {
    pub fn new(
        airports: AirportRegistry,
        mut segments: Vec<FlightSegment>,
        mut customers: Vec<Customer>,
        policy: FarePolicy,
    ) -> Ledger {
        segments.sort_by_key(|s| s.departure_time);
        let segments = segments.into_iter().map(Arc::new).collect::<Vec<_>>();
        let mut segments_by_date = BTreeMap::<NaiveDate, Vec<usize>>::new();
        segments.iter().enumerate().for_each(|(i, s)| {
            segments_by_date
                .entry(s.departure_time.date())
                .or_default()
                .push(i)
        });

        customers.sort_by_key(|c| c.id);
        let customers_index = customers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect::<HashMap<CustomerId, usize>>();

        Ledger {
            airports,
            segments,
            segments_by_date,
            customers,
            customers_index,
            policy,
        }
    }

    pub fn airports(&self) -> &AirportRegistry {
        &self.airports
    }

    pub fn segments(&self) -> &[SegmentRef] {
        &self.segments
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        self.customers_index.get(&id).map(|i| &self.customers[*i])
    }

    pub fn segments_on(&self, date: NaiveDate) -> impl Iterator<Item = &SegmentRef> {
        self.segments_by_date
            .get(&date)
            .into_iter()
            .flatten()
            .map(|i| &self.segments[*i])
    }

    /// Earliest segment flying `origin` to `destination` that departs at or
    /// after `after`.
    pub fn find_segment(&self, origin: &str, destination: &str, after: NaiveDateTime) -> Option<SegmentRef> {
        self.segments_by_date
            .range(after.date()..)
            .flat_map(|(_, idxs)| idxs.iter())
            .map(|i| &self.segments[*i])
            .find(|s| {
                &*s.origin_id == origin && &*s.destination_id == destination && s.departure_time >= after
            })
            .cloned()
    }

    pub fn find_trip(&self, reservation_id: &str) -> Option<(&Customer, &Arc<Trip>)> {
        self.customers
            .iter()
            .find_map(|c| c.find_trip(reservation_id).map(|t| (c, t)))
    }

    pub fn book(
        &mut self,
        customer_id: CustomerId,
        reservation_id: ReservationId,
        legs: &[(SegmentRef, CabinClass)],
        trip_date: NaiveDate,
    ) -> Result<Arc<Trip>, LedgerError> {
        if self.find_trip(&reservation_id).is_some() {
            return Err(LedgerError::DuplicateReservation(reservation_id));
        }
        let idx = *self
            .customers_index
            .get(&customer_id)
            .ok_or(LedgerError::UnknownCustomer(customer_id))?;

        let trip = self.customers[idx].book_trip(reservation_id, legs, trip_date);

        self.assert_invariants();
        Ok(trip)
    }

    /// Cancels the given legs of a trip on behalf of its owner.
    pub fn cancel_legs(
        &mut self,
        reservation_id: &str,
        legs: &[(SegmentRef, CabinClass)],
    ) -> Result<f64, LedgerError> {
        let (owner, trip) = self
            .find_trip(reservation_id)
            .map(|(c, t)| (c.id, t.clone()))
            .ok_or_else(|| LedgerError::UnknownTrip(Arc::from(reservation_id)))?;
        let idx = *self
            .customers_index
            .get(&owner)
            .ok_or(LedgerError::UnknownCustomer(owner))?;
        let policy = self.policy;

        let reversed = self.customers[idx].cancel_trip(&trip, legs, &policy)?;

        self.assert_invariants();
        Ok(reversed)
    }

    /// Cancels every leg of a trip that its owner still holds a seat on.
    pub fn cancel(&mut self, reservation_id: &str) -> Result<f64, LedgerError> {
        let legs = self
            .find_trip(reservation_id)
            .map(|(c, t)| {
                t.segments()
                    .iter()
                    .filter_map(|s| s.check_seat_class(c.id).map(|class| (s.clone(), class)))
                    .collect::<Vec<_>>()
            })
            .ok_or_else(|| LedgerError::UnknownTrip(Arc::from(reservation_id)))?;
        self.cancel_legs(reservation_id, &legs)
    }

    /// The full view: every segment reachable from a booked trip.
    pub fn working_set(&self) -> Vec<SegmentRef> {
        all_trip_segments(&self.customers)
    }

    pub fn trip_summary(&self, reservation_id: &str) -> Option<TripSummary> {
        let (customer, trip) = self.find_trip(reservation_id)?;
        Some(TripSummary {
            reservation_id: trip.reservation_id.clone(),
            customer_id: trip.customer_id,
            departure_date: trip.departure_date,
            itinerary: trip.itinerary(),
            cost: customer.cost_of_trip(reservation_id).unwrap_or(0.0),
            total_time: trip.total_trip_time(),
            in_flight_time: trip.in_flight_time(),
        })
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            airports: self.airports.len(),
            segments: self.segments.len(),
            customers: self.customers.len(),
            trips: self.customers.iter().map(|c| c.booked_trips().len()).sum(),
            seats_booked: self
                .segments
                .iter()
                .flat_map(|s| CabinClass::ALL.map(|class| s.seat_availability(class)))
                .sum(),
        }
    }

    pub(crate) fn log_loaded(&self) {
        let stats = self.stats();
        info!(
            airports = stats.airports,
            segments = stats.segments,
            customers = stats.customers,
            trips = stats.trips,
            "ledger loaded"
        );
    }

    #[cfg(debug_assertions)]
    fn assert_invariants(&self) {
        debug_assert!(
            self.segments.iter().all(|s| {
                CabinClass::ALL
                    .iter()
                    .all(|c| s.seat_availability(*c) <= s.seat_capacity(*c))
            }),
            "Seat availability <= capacity invariant violated"
        );

        debug_assert!(
            self.segments.iter().all(|s| {
                let manifest = s.manifest();
                CabinClass::ALL.iter().all(|c| {
                    manifest.iter().filter(|(_, class)| class == c).count() as u32
                        == s.seat_availability(*c)
                })
            }),
            "Manifest <-> booked counter invariant violated"
        );

        let mut reservations = self
            .customers
            .iter()
            .flat_map(|c| c.trips().map(|t| t.reservation_id.clone()))
            .collect::<Vec<_>>();
        let total = reservations.len();
        reservations.sort();
        reservations.dedup();
        debug_assert_eq!(total, reservations.len(), "Reservation id uniqueness violated");
    }

    #[cfg(not(debug_assertions))]
    fn assert_invariants(&self) {}
}
