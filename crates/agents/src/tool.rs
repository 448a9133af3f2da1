//! Tool surface exposed to the reasoning loop

use async_trait::async_trait;
use groundtruth_core::normalize_flight_code;
use groundtruth_db::{FlightRepository, Resolution, Result as DbResult};
use serde_json::{json, Map, Value};
use tracing::instrument;

/// Name the loop dispatches on
pub const FLIGHT_LOOKUP_TOOL: &str = "get_flight_details";

/// A capability the reasoning loop may invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Run the tool. Every outcome is a JSON mapping; failures are folded
    /// into the mapping rather than raised.
    async fn invoke(&self, input: &str) -> Map<String, Value>;
}

/// Looks up all stored details for a flight code
pub struct FlightLookupTool {
    repo: FlightRepository,
}

impl FlightLookupTool {
    pub fn new(repo: FlightRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Tool for FlightLookupTool {
    fn name(&self) -> &str {
        FLIGHT_LOOKUP_TOOL
    }

    fn description(&self) -> &str {
        "Retrieves ALL available data for a flight code (e.g. 'LX 15', 'UA 9715'). \
         The input must be the bare code string, not JSON."
    }

    #[instrument(skip(self))]
    async fn invoke(&self, input: &str) -> Map<String, Value> {
        let code = normalize_flight_code(input);
        let outcome = self.repo.resolve_flight(&code).await;
        outcome_to_map(&code, outcome)
    }
}

/// Map a resolution outcome to the observation the loop will see
fn outcome_to_map(code: &str, outcome: DbResult<Resolution>) -> Map<String, Value> {
    match outcome {
        Ok(Resolution::Found(record)) => match serde_json::to_value(&record) {
            Ok(Value::Object(map)) => map,
            // FlightRecord always serializes to an object; this arm only
            // keeps the mapping total
            _ => error_map("flight record could not be serialized"),
        },
        Ok(Resolution::NotFound) => {
            let mut map = Map::new();
            map.insert(
                "message".to_string(),
                json!(format!("Flight {} not found in graph.", code)),
            );
            map
        }
        Err(e) => error_map(&e.to_string()),
    }
}

fn error_map(message: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("error".to_string(), json!(message));
    map
}
