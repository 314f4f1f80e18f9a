use crate::error::LedgerError;
use crate::flight::{CabinClass, FlightSegment, SegmentRef};
use crate::trip::{ReservationId, Trip};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type CustomerId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum FrequentFlyerStatus {
    #[default]
    NoStatus,
    Prestige,
    EliteLight,
    EliteRegular,
    SuperElite,
}

impl FrequentFlyerStatus {
    /// (qualifying miles, tier, fare discount %), ascending.
    const TIERS: [(u64, FrequentFlyerStatus, u32); 4] = [
        (15_000, FrequentFlyerStatus::Prestige, 10),
        (30_000, FrequentFlyerStatus::EliteLight, 15),
        (50_000, FrequentFlyerStatus::EliteRegular, 20),
        (100_000, FrequentFlyerStatus::SuperElite, 25),
    ];

    pub fn for_miles(miles: u64) -> FrequentFlyerStatus {
        Self::TIERS
            .iter()
            .rev()
            .find(|(threshold, _, _)| miles >= *threshold)
            .map(|(_, status, _)| *status)
            .unwrap_or(FrequentFlyerStatus::NoStatus)
    }

    pub fn discount_pct(self) -> u32 {
        Self::TIERS
            .iter()
            .find(|(_, status, _)| *status == self)
            .map(|(_, _, discount)| *discount)
            .unwrap_or(0)
    }
}

impl fmt::Display for FrequentFlyerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrequentFlyerStatus::NoStatus => "None",
            FrequentFlyerStatus::Prestige => "Prestige",
            FrequentFlyerStatus::EliteLight => "Elite-Light",
            FrequentFlyerStatus::EliteRegular => "Elite-Regular",
            FrequentFlyerStatus::SuperElite => "Super-Elite",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FarePolicy {
    /// Charged per cancelled segment, on top of reversing its fare.
    pub cancellation_fee: f64,
}

impl Default for FarePolicy {
    fn default() -> Self {
        FarePolicy {
            cancellation_fee: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub age: u32,
    pub nationality: String,
}

#[derive(Debug, Clone)]
pub struct BookedTrip {
    pub trip: Arc<Trip>,
    pub cost: f64,
    pub discount_pct: u32,
}

#[derive(Debug)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub age: u32,
    pub nationality: String,
    lifetime_cost: f64,
    status: FrequentFlyerStatus,
    qualifying_miles: u64,
    trips: Vec<BookedTrip>,
}

impl Customer {
    pub fn new(record: CustomerRecord) -> Customer {
        Customer {
            id: record.id,
            name: record.name,
            age: record.age,
            nationality: record.nationality,
            lifetime_cost: 0.0,
            status: FrequentFlyerStatus::NoStatus,
            qualifying_miles: 0,
            trips: vec![],
        }
    }

    pub fn lifetime_cost(&self) -> f64 {
        self.lifetime_cost
    }

    pub fn status(&self) -> FrequentFlyerStatus {
        self.status
    }

    pub fn qualifying_miles(&self) -> u64 {
        self.qualifying_miles
    }

    pub fn booked_trips(&self) -> &[BookedTrip] {
        &self.trips
    }

    pub fn trips(&self) -> impl Iterator<Item = &Arc<Trip>> {
        self.trips.iter().map(|b| &b.trip)
    }

    pub fn find_trip(&self, reservation_id: &str) -> Option<&Arc<Trip>> {
        self.trips().find(|t| &*t.reservation_id == reservation_id)
    }

    pub fn cost_of_trip(&self, reservation_id: &str) -> Option<f64> {
        self.trips
            .iter()
            .find(|b| &*b.trip.reservation_id == reservation_id)
            .map(|b| b.cost)
    }

    fn realized_cost(segment: &FlightSegment, class: CabinClass, discount_pct: u32) -> f64 {
        let cost = segment.base_fare() * class.fare_multiplier();
        cost * (1.0 - f64::from(discount_pct) / 100.0)
    }

    /// Books every leg for this customer and registers the resulting trip.
    ///
    /// Fares are discounted by the status held before this trip; the status
    /// the trip itself earns only applies from the next booking on. A leg
    /// whose seat cannot be booked is skipped without accruing miles or cost,
    /// but it stays on the itinerary.
    pub fn book_trip(
        &mut self,
        reservation_id: ReservationId,
        legs: &[(SegmentRef, CabinClass)],
        trip_date: NaiveDate,
    ) -> Arc<Trip> {
        let discount_pct = self.status.discount_pct();
        let mut trip_cost = 0.0;

        for (segment, class) in legs {
            if let Err(e) = segment.book_seat(self.id, *class) {
                warn!(reservation = %reservation_id, error = %e, "seat not booked");
                continue;
            }
            let earned = (segment.length_km * class.mileage_multiplier()).round() as u64;
            self.qualifying_miles = self.qualifying_miles.saturating_add(earned);
            let realized = Self::realized_cost(segment, *class, discount_pct);
            self.lifetime_cost += realized;
            trip_cost += realized;
        }

        let earned = FrequentFlyerStatus::for_miles(self.qualifying_miles);
        if earned > self.status {
            info!(customer = self.id, from = %self.status, to = %earned, "status upgraded");
            self.status = earned;
        }

        let trip = Arc::new(Trip::new(
            reservation_id,
            self.id,
            trip_date,
            legs.iter().map(|(s, _)| s.clone()).collect(),
        ));
        debug!(customer = self.id, reservation = %trip.reservation_id, cost = trip_cost, "trip booked");
        self.trips.push(BookedTrip {
            trip: trip.clone(),
            cost: trip_cost,
            discount_pct,
        });
        trip
    }

    /// Releases the seats this customer still holds on the given legs of
    /// `trip` and reverses their fares. Qualifying miles and status are kept.
    /// Returns the fare amount reversed.
    pub fn cancel_trip(
        &mut self,
        trip: &Trip,
        legs: &[(SegmentRef, CabinClass)],
        policy: &FarePolicy,
    ) -> Result<f64, LedgerError> {
        let idx = self
            .trips
            .iter()
            .position(|b| b.trip.reservation_id == trip.reservation_id)
            .ok_or_else(|| LedgerError::UnknownTrip(trip.reservation_id.clone()))?;
        let booked = self.trips[idx].trip.clone();
        let discount_pct = self.trips[idx].discount_pct;

        let mut reversed = 0.0;
        for (segment, requested) in legs {
            if !booked.contains(segment) {
                continue;
            }
            let held = match segment.cancel_seat(self.id) {
                Ok(class) => class,
                Err(e) => {
                    debug!(reservation = %trip.reservation_id, error = %e, "nothing to cancel");
                    continue;
                }
            };
            if held != *requested {
                debug!(flight = %segment.id, %held, %requested, "refunding the cabin actually held");
            }
            let realized = Self::realized_cost(segment, held, discount_pct);
            self.lifetime_cost = (self.lifetime_cost - realized - policy.cancellation_fee).max(0.0);
            self.trips[idx].cost = (self.trips[idx].cost - realized).max(0.0);
            reversed += realized;
        }

        info!(customer = self.id, reservation = %trip.reservation_id, reversed, "trip cancelled");
        Ok(reversed)
    }
}
