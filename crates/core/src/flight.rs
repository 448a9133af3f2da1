//! Flight identity types and the resolved flight record

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// How a requested code matched in the graph
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CodeType {
    /// The code is the operating carrier's own flight number
    #[serde(rename = "Operating Flight")]
    OperatingFlight,
    /// The code is a marketing/codeshare alias for another carrier's flight
    #[serde(rename = "Marketing Code")]
    MarketingCode,
}

impl std::fmt::Display for CodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeType::OperatingFlight => write!(f, "Operating Flight"),
            CodeType::MarketingCode => write!(f, "Marketing Code"),
        }
    }
}

/// An operating flight - the canonical unit a lookup resolves to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Unique identifier (maps to SurrealDB record ID)
    pub id: Option<RecordId>,

    /// Operating flight number, e.g. "LX15"
    pub flight_number: String,
}

impl Flight {
    /// Create a new flight with the given operating number
    pub fn new(flight_number: impl Into<String>) -> Self {
        Self {
            id: None,
            flight_number: flight_number.into(),
        }
    }
}

/// A marketing/codeshare alias pointing at an operating flight.
///
/// A designator has its own identity even when its code coincides with an
/// operating flight number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightDesignator {
    /// Unique identifier (maps to SurrealDB record ID)
    pub id: Option<RecordId>,

    /// The alias code, e.g. "UA9715"
    pub code: String,
}

impl FlightDesignator {
    /// Create a new designator with the given alias code
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: None,
            code: code.into(),
        }
    }
}

/// The single flat record a flight-code resolution produces.
///
/// Optional fields are dropped from the serialized mapping entirely when
/// the graph holds no value for them (sparse record, not null-valued keys).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightRecord {
    /// The normalized code the caller asked about
    pub requested_code: String,

    /// Whether the code matched an operating flight or a marketing alias
    pub code_type: CodeType,

    /// True iff resolution went through the alias path
    pub is_codeshare: bool,

    /// Operating number of the resolved flight
    pub operating_flight_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_airline: Option<String>,

    /// Only present for codeshare lookups where the graph names the
    /// marketing carrier of the input designator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing_airline: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_airport: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_airport: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft_config_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
}

impl FlightRecord {
    /// Create a record with only the mandatory resolution fields set
    pub fn new(
        requested_code: impl Into<String>,
        operating_flight_number: impl Into<String>,
        is_codeshare: bool,
    ) -> Self {
        Self {
            requested_code: requested_code.into(),
            code_type: if is_codeshare {
                CodeType::MarketingCode
            } else {
                CodeType::OperatingFlight
            },
            is_codeshare,
            operating_flight_number: operating_flight_number.into(),
            operating_airline: None,
            marketing_airline: None,
            route_code: None,
            origin_airport: None,
            origin_country: None,
            destination_airport: None,
            destination_country: None,
            aircraft_type: None,
            aircraft_config_code: None,
            terminal: None,
            season: None,
        }
    }
}
