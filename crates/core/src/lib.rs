//! Core domain types for GroundTruth
//!
//! This crate defines the fundamental data structures used throughout
//! the application: flights and their designators, the resolved flight
//! record, the session transcript, and flight-code normalization.

pub mod airline;
pub mod flight;
pub mod import;
pub mod normalize;
pub mod transcript;

pub use airline::Airline;
pub use flight::{CodeType, Flight, FlightDesignator, FlightRecord};
pub use import::{DesignatorImport, EndpointImport, FlightImport, FlightImportFile, RouteImport};
pub use normalize::normalize_flight_code;
pub use transcript::{ChatRole, ChatTurn, Transcript};
