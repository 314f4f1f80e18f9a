use crate::airport::AirportId;
use crate::customer::CustomerId;
use crate::flight::{CabinClass, FlightId};
use crate::trip::ReservationId;
use thiserror::Error;

/// Seat-level rejections. The seat inventory is left untouched whenever one
/// of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("customer {customer} already holds a seat on {flight}")]
    AlreadyBooked { flight: FlightId, customer: CustomerId },

    #[error("{class} cabin on {flight} is full")]
    ClassFull { flight: FlightId, class: CabinClass },

    #[error("customer {customer} holds no seat on {flight}")]
    NotOnManifest { flight: FlightId, customer: CustomerId },
}

/// Why a filter request was rejected. Spec errors never leave
/// `FilterKind::apply`; a rejected spec leaves the working set as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("unknown filter '{0}'")]
    UnknownKind(String),

    #[error("malformed {kind} filter spec '{spec}'")]
    Malformed { kind: &'static str, spec: String },

    #[error("no customer with id {0}")]
    UnknownCustomer(CustomerId),

    #[error("no segment touches airport {0}")]
    UnknownLocation(String),

    #[error("no trip with reservation id {0}")]
    UnknownTrip(String),
}

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scenario parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate airport {0}")]
    DuplicateAirport(AirportId),

    #[error("duplicate customer {0}")]
    DuplicateCustomer(CustomerId),

    #[error("duplicate reservation {0}")]
    DuplicateReservation(ReservationId),

    #[error("segment {segment} references unknown airport {airport}")]
    UnknownAirport { segment: FlightId, airport: AirportId },

    #[error("unknown customer {0}")]
    UnknownCustomer(CustomerId),

    #[error("trip not found: {0}")]
    UnknownTrip(ReservationId),

    #[error("unknown cabin class '{0}'")]
    UnknownCabinClass(String),

    #[error("reservation {reservation}: no segment {origin}->{destination} after {after}")]
    UnmatchedLeg {
        reservation: ReservationId,
        origin: AirportId,
        destination: AirportId,
        after: chrono::NaiveDateTime,
    },
}
