//! Airline type - operates flights, markets designators

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// An airline.
///
/// The same airline may operate a flight and market a designator; the two
/// roles are held by different graph edges and are never assumed equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    /// Unique identifier (maps to SurrealDB record ID)
    pub id: Option<RecordId>,

    /// Carrier name, e.g. "Swiss"
    pub name: String,
}

impl Airline {
    /// Create a new airline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }
}
