use crate::airport::{AirportId, AirportRegistry, Location};
use crate::customer::CustomerId;
use crate::error::{BookingError, LedgerError};
use crate::time::Minutes;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tabled::Tabled;

pub type FlightId = Arc<str>;
pub type SegmentRef = Arc<FlightSegment>;

/// A flight number alone repeats from day to day; paired with the departure
/// time it names exactly one scheduled leg.
pub type SegmentKey = (FlightId, NaiveDateTime);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
pub enum CabinClass {
    Economy,
    Business,
}

impl CabinClass {
    pub const ALL: [CabinClass; 2] = [CabinClass::Economy, CabinClass::Business];

    pub fn fare_multiplier(self) -> f64 {
        match self {
            CabinClass::Economy => 1.0,
            CabinClass::Business => 2.5,
        }
    }

    pub fn mileage_multiplier(self) -> f64 {
        match self {
            CabinClass::Economy => 1.0,
            CabinClass::Business => 5.0,
        }
    }

    pub fn default_capacity(self) -> u32 {
        match self {
            CabinClass::Economy => 150,
            CabinClass::Business => 22,
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CabinClass::Economy => write!(f, "Economy"),
            CabinClass::Business => write!(f, "Business"),
        }
    }
}

impl FromStr for CabinClass {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economy" | "e" => Ok(CabinClass::Economy),
            "business" | "b" => Ok(CabinClass::Business),
            _ => Err(LedgerError::UnknownCabinClass(s.to_string())),
        }
    }
}

/// One scheduled leg as handed over by ingestion.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledLeg {
    pub id: FlightId,
    pub origin_id: AirportId,
    pub destination_id: AirportId,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub length_km: f64,
    #[serde(default)]
    pub base_rate: Option<f64>,
    #[serde(default)]
    pub capacity: Option<HashMap<CabinClass, u32>>,
}

#[derive(Debug, Clone, Default)]
struct SeatInventory {
    capacity: HashMap<CabinClass, u32>,
    booked: HashMap<CabinClass, u32>,
    manifest: Vec<(CustomerId, CabinClass)>,
}

impl SeatInventory {
    fn capacity(&self, class: CabinClass) -> u32 {
        self.capacity.get(&class).copied().unwrap_or(0)
    }

    fn booked(&self, class: CabinClass) -> u32 {
        self.booked.get(&class).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct FlightSegment {
    pub id: FlightId,
    pub origin_id: AirportId,
    pub destination_id: AirportId,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    /// currency per km
    pub base_rate: f64,
    pub length_km: f64,
    pub coordinates: (Location, Location),
    pub duration: Minutes,
    inventory: Mutex<SeatInventory>,
}

impl FlightSegment {
    pub const DEFAULT_BASE_RATE: f64 = 0.1225;

    pub fn new(
        leg: ScheduledLeg,
        default_base_rate: f64,
        airports: &AirportRegistry,
    ) -> Result<FlightSegment, LedgerError> {
        let locate = |airport: &AirportId| {
            airports
                .location(airport)
                .ok_or_else(|| LedgerError::UnknownAirport {
                    segment: leg.id.clone(),
                    airport: airport.clone(),
                })
        };
        let coordinates = (locate(&leg.origin_id)?, locate(&leg.destination_id)?);

        let capacity = leg.capacity.unwrap_or_else(|| {
            CabinClass::ALL
                .iter()
                .map(|c| (*c, c.default_capacity()))
                .collect()
        });

        Ok(FlightSegment {
            duration: Minutes::between(leg.departure_time, leg.arrival_time),
            id: leg.id,
            origin_id: leg.origin_id,
            destination_id: leg.destination_id,
            departure_time: leg.departure_time,
            arrival_time: leg.arrival_time,
            base_rate: leg.base_rate.unwrap_or(default_base_rate),
            length_km: leg.length_km.max(0.0),
            coordinates,
            inventory: Mutex::new(SeatInventory {
                capacity,
                ..SeatInventory::default()
            }),
        })
    }

    pub fn key(&self) -> SegmentKey {
        (self.id.clone(), self.departure_time)
    }

    pub fn base_fare(&self) -> f64 {
        self.base_rate * self.length_km
    }

    pub fn touches(&self, airport: &str) -> bool {
        &*self.origin_id == airport || &*self.destination_id == airport
    }

    fn seats(&self) -> MutexGuard<'_, SeatInventory> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seat_capacity(&self, class: CabinClass) -> u32 {
        self.seats().capacity(class)
    }

    /// Seats booked so far in `class`; counts up from zero.
    pub fn seat_availability(&self, class: CabinClass) -> u32 {
        self.seats().booked(class)
    }

    pub fn seats_remaining(&self, class: CabinClass) -> u32 {
        let seats = self.seats();
        seats.capacity(class).saturating_sub(seats.booked(class))
    }

    pub fn check_manifest(&self, customer: CustomerId) -> bool {
        self.seats().manifest.iter().any(|(c, _)| *c == customer)
    }

    pub fn check_seat_class(&self, customer: CustomerId) -> Option<CabinClass> {
        self.seats()
            .manifest
            .iter()
            .find(|(c, _)| *c == customer)
            .map(|(_, class)| *class)
    }

    pub fn manifest(&self) -> Vec<(CustomerId, CabinClass)> {
        self.seats().manifest.clone()
    }

    /// One seat per customer per segment; a second request is rejected even
    /// for a different cabin.
    pub fn book_seat(&self, customer: CustomerId, class: CabinClass) -> Result<(), BookingError> {
        let mut seats = self.seats();
        if seats.manifest.iter().any(|(c, _)| *c == customer) {
            return Err(BookingError::AlreadyBooked {
                flight: self.id.clone(),
                customer,
            });
        }
        if seats.booked(class) >= seats.capacity(class) {
            return Err(BookingError::ClassFull {
                flight: self.id.clone(),
                class,
            });
        }
        seats.manifest.push((customer, class));
        *seats.booked.entry(class).or_insert(0) += 1;
        Ok(())
    }

    pub fn cancel_seat(&self, customer: CustomerId) -> Result<CabinClass, BookingError> {
        let mut seats = self.seats();
        let position = seats
            .manifest
            .iter()
            .position(|(c, _)| *c == customer)
            .ok_or_else(|| BookingError::NotOnManifest {
                flight: self.id.clone(),
                customer,
            })?;
        let (_, class) = seats.manifest.remove(position);
        if let Some(booked) = seats.booked.get_mut(&class) {
            *booked = booked.saturating_sub(1);
        }
        Ok(class)
    }

    pub fn row(&self) -> SegmentRow {
        let occupancy = |class| {
            format!(
                "{}/{} ({} left)",
                self.seat_availability(class),
                self.seat_capacity(class),
                self.seats_remaining(class)
            )
        };
        let ((from_lon, from_lat), (to_lon, to_lat)) = self.coordinates;
        SegmentRow {
            flight: self.id.clone(),
            origin: self.origin_id.clone(),
            destination: self.destination_id.clone(),
            departure: self.departure_time.format("%Y-%m-%d %H:%M").to_string(),
            arrival: self.arrival_time.format("%Y-%m-%d %H:%M").to_string(),
            duration: self.duration,
            length: format!("{:.0} km", self.length_km),
            route: format!("({from_lon:.2}, {from_lat:.2}) -> ({to_lon:.2}, {to_lat:.2})"),
            economy: occupancy(CabinClass::Economy),
            business: occupancy(CabinClass::Business),
        }
    }
}

impl PartialEq for FlightSegment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.departure_time == other.departure_time
    }
}

impl Eq for FlightSegment {}

impl fmt::Display for FlightSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]:{}->{}", self.id, self.origin_id, self.destination_id)
    }
}

#[derive(Tabled)]
pub struct SegmentRow {
    #[tabled(rename = "Flight")]
    flight: FlightId,
    #[tabled(rename = "From")]
    origin: AirportId,
    #[tabled(rename = "To")]
    destination: AirportId,
    #[tabled(rename = "Departure")]
    departure: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "Duration")]
    duration: Minutes,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "Route (lon, lat)")]
    route: String,
    #[tabled(rename = "Economy")]
    economy: String,
    #[tabled(rename = "Business")]
    business: String,
}
