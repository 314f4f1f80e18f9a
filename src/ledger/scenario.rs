use crate::airport::{Airport, AirportId, AirportRegistry};
use crate::config::Config;
use crate::customer::{Customer, CustomerId, CustomerRecord};
use crate::error::LedgerError;
use crate::flight::{CabinClass, FlightSegment, ScheduledLeg};
use crate::ledger::ledger::Ledger;
use crate::trip::ReservationId;
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct AirportRecord {
    pub id: AirportId,
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct LegRecord {
    pub origin_id: AirportId,
    pub destination_id: AirportId,
    pub cabin_class: String,
}

#[derive(Debug, Deserialize)]
pub struct TripRecord {
    pub reservation_id: ReservationId,
    pub customer_id: CustomerId,
    pub departure_date: NaiveDate,
    pub legs: Vec<LegRecord>,
}

/// Everything ingestion hands over before the ledger is used.
#[derive(Debug, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub airports: Vec<AirportRecord>,
    #[serde(default)]
    pub segments: Vec<ScheduledLeg>,
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
    #[serde(default)]
    pub trips: Vec<TripRecord>,
}

impl Ledger {
    pub fn load_from_file(path: &Path, config: &Config) -> Result<Self, LedgerError> {
        let data = std::fs::read_to_string(path)?;
        let scenario: Scenario = serde_json::from_str(&data)?;
        info!(path = %path.display(), "scenario read");
        Ledger::from_scenario(scenario, config)
    }

    /// Builds the ledger and replays every trip record through the booking
    /// engine. Referential problems are rejected here so the ledger itself
    /// can assume a consistent dataset.
    pub fn from_scenario(scenario: Scenario, config: &Config) -> Result<Self, LedgerError> {
        let mut airports = HashMap::new();
        for record in scenario.airports {
            match airports.entry(record.id.clone()) {
                Entry::Occupied(_) => return Err(LedgerError::DuplicateAirport(record.id)),
                Entry::Vacant(slot) => {
                    slot.insert(Airport {
                        id: record.id,
                        name: record.name,
                        location: (record.longitude, record.latitude),
                    });
                }
            }
        }
        let registry = AirportRegistry::new(airports);

        let segments = scenario
            .segments
            .into_iter()
            .map(|leg| FlightSegment::new(leg, config.base_rate, &registry))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        let mut customers = Vec::with_capacity(scenario.customers.len());
        for record in scenario.customers {
            if !seen.insert(record.id) {
                return Err(LedgerError::DuplicateCustomer(record.id));
            }
            customers.push(Customer::new(record));
        }

        let mut ledger = Ledger::new(registry, segments, customers, config.fare_policy);

        for record in scenario.trips {
            if ledger.customer(record.customer_id).is_none() {
                return Err(LedgerError::UnknownCustomer(record.customer_id));
            }
            let mut after = record.departure_date.and_time(NaiveTime::MIN);
            let mut legs = Vec::with_capacity(record.legs.len());
            for leg in &record.legs {
                let class = leg.cabin_class.parse::<CabinClass>()?;
                let segment = ledger
                    .find_segment(&leg.origin_id, &leg.destination_id, after)
                    .ok_or_else(|| LedgerError::UnmatchedLeg {
                        reservation: record.reservation_id.clone(),
                        origin: leg.origin_id.clone(),
                        destination: leg.destination_id.clone(),
                        after,
                    })?;
                after = segment.arrival_time;
                legs.push((segment, class));
            }
            debug!(reservation = %record.reservation_id, legs = legs.len(), "replaying trip");
            ledger.book(
                record.customer_id,
                record.reservation_id,
                &legs,
                record.departure_date,
            )?;
        }

        ledger.log_loaded();
        Ok(ledger)
    }
}
