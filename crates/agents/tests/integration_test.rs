//! Integration tests for the reasoning loop over an in-memory flight graph.
//!
//! The completion provider is scripted, so every test is deterministic and
//! runs without network access.

use async_trait::async_trait;
use groundtruth_agents::executor::DEGRADED_ANSWER;
use groundtruth_agents::{
    AgentError, AgentExecutor, ChatSession, CompletionProvider, FlightLookupTool, Result, Tool,
};
use groundtruth_core::{DesignatorImport, EndpointImport, FlightImport, RouteImport, Transcript};
use groundtruth_db::{init_memory, FlightRepository};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Plays back a fixed sequence of model steps and records every prompt
#[derive(Clone, Default)]
struct ScriptedModel {
    inner: Arc<ScriptedInner>,
}

#[derive(Default)]
struct ScriptedInner {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                responses: Mutex::new(responses.iter().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.inner.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedModel {
    async fn complete(&self, prompt: &str, _stop: &[String]) -> Result<String> {
        self.inner.prompts.lock().unwrap().push(prompt.to_string());
        self.inner
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::Completion("scripted responses exhausted".into()))
    }
}

async fn seeded_repo() -> FlightRepository {
    let db = init_memory().await.expect("Failed to init db");
    let repo = FlightRepository::new(db);
    repo.import_flight(&FlightImport {
        flight_number: "LX15".into(),
        operating_airline: "Swiss".into(),
        designators: vec![DesignatorImport {
            code: "UA9715".into(),
            marketing_airline: Some("United Airlines".into()),
        }],
        route: Some(RouteImport {
            name: "ZRH-JFK".into(),
            origin: EndpointImport {
                airport: "Zurich".into(),
                country: "Switzerland".into(),
            },
            destination: EndpointImport {
                airport: "JFK".into(),
                country: "USA".into(),
            },
        }),
        aircraft_type: None,
        aircraft_config: None,
        terminal: None,
        season: None,
    })
    .await
    .expect("Failed to seed flight");
    repo
}

async fn executor_over(model: ScriptedModel) -> AgentExecutor<ScriptedModel> {
    let repo = seeded_repo().await;
    let tool = Arc::new(FlightLookupTool::new(repo)) as Arc<dyn Tool>;
    AgentExecutor::new(model, vec![tool])
}

/// End-to-end: one Thought/Action/Observation cycle, then the answer
#[tokio::test]
async fn test_operating_airline_question() {
    let model = ScriptedModel::new(&[
        " I need the stored flight details.\nAction: get_flight_details\nAction Input: LX 15",
        " The observation names the operating airline.\nFinal Answer: Flight LX15 is operated by Swiss.",
    ]);
    let executor = executor_over(model.clone()).await;

    let outcome = executor
        .run(&Transcript::new(), "What airline operates LX 15?")
        .await
        .unwrap();

    assert_eq!(outcome.answer, "Flight LX15 is operated by Swiss.");
    assert_eq!(outcome.steps.len(), 1);

    let step = &outcome.steps[0];
    assert_eq!(step.action, "get_flight_details");
    assert_eq!(step.action_input, "LX 15");
    assert!(step.observation.contains("\"operating_airline\":\"Swiss\""));
    assert!(step.observation.contains("\"is_codeshare\":false"));

    // the second model call saw the tool result verbatim
    let prompts = model.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Observation: {"));
    assert!(prompts[1].contains("Swiss"));
}

/// A codeshare lookup reports both carriers in the observation
#[tokio::test]
async fn test_codeshare_question() {
    let model = ScriptedModel::new(&[
        "Action: get_flight_details\nAction Input: UA 9715",
        "Final Answer: UA9715 is a codeshare marketed by United Airlines and operated by Swiss as LX15.",
    ]);
    let executor = executor_over(model.clone()).await;

    let outcome = executor
        .run(&Transcript::new(), "Who operates UA 9715?")
        .await
        .unwrap();

    let step = &outcome.steps[0];
    assert!(step.observation.contains("\"is_codeshare\":true"));
    assert!(step.observation.contains("\"operating_airline\":\"Swiss\""));
    assert!(step
        .observation
        .contains("\"marketing_airline\":\"United Airlines\""));
}

/// A malformed first step must not end the session; the corrective
/// observation steers the next turn back onto the grammar
#[tokio::test]
async fn test_retry_recovers_from_malformed_step() {
    let model = ScriptedModel::new(&[
        "LX15 is the Swiss flagship flight to New York.",
        " Let me use the tool properly.\nAction: get_flight_details\nAction Input: LX15",
        "Final Answer: Swiss operates LX15.",
    ]);
    let executor = executor_over(model.clone()).await;

    let outcome = executor
        .run(&Transcript::new(), "What airline operates LX 15?")
        .await
        .unwrap();

    assert_eq!(outcome.answer, "Swiss operates LX15.");
    assert_eq!(outcome.steps.len(), 1);

    let prompts = model.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[1].contains("Invalid format"));
}

/// Exhausting the parse-retry budget yields the degraded answer
#[tokio::test]
async fn test_parse_retry_budget_exhaustion() {
    let model = ScriptedModel::new(&[
        "free text, attempt one",
        "free text, attempt two",
        "free text, attempt three",
    ]);
    let executor = executor_over(model).await;

    let outcome = executor
        .run(&Transcript::new(), "What airline operates LX 15?")
        .await
        .unwrap();

    assert_eq!(outcome.answer, DEGRADED_ANSWER);
    assert!(outcome.steps.is_empty());
}

/// Exhausting the turn budget yields the degraded answer
#[tokio::test]
async fn test_turn_budget_exhaustion() {
    let model = ScriptedModel::new(&[
        "Action: get_flight_details\nAction Input: LX15",
        "Action: get_flight_details\nAction Input: UA9715",
    ]);
    let executor = executor_over(model).await.with_max_turns(2);

    let outcome = executor
        .run(&Transcript::new(), "Tell me everything about LX15 and UA9715")
        .await
        .unwrap();

    assert_eq!(outcome.answer, DEGRADED_ANSWER);
    assert_eq!(outcome.steps.len(), 2);
}

/// An unknown code produces the not-found observation, and the final
/// answer communicates absence instead of invented data
#[tokio::test]
async fn test_not_found_flows_to_answer() {
    let model = ScriptedModel::new(&[
        "Action: get_flight_details\nAction Input: XX000",
        "Final Answer: I have no information on that flight.",
    ]);
    let executor = executor_over(model).await;

    let outcome = executor
        .run(&Transcript::new(), "Where does XX000 fly?")
        .await
        .unwrap();

    assert_eq!(
        outcome.steps[0].observation,
        r#"{"message":"Flight XX000 not found in graph."}"#
    );
    assert_eq!(outcome.answer, "I have no information on that flight.");
}

/// Stands in for a lookup whose graph store is down
struct BrokenStoreTool;

#[async_trait]
impl Tool for BrokenStoreTool {
    fn name(&self) -> &str {
        "get_flight_details"
    }

    fn description(&self) -> &str {
        "Retrieves ALL available data for a flight code."
    }

    async fn invoke(&self, _input: &str) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(
            "error".to_string(),
            serde_json::Value::String("Query failed: connection reset by peer".to_string()),
        );
        map
    }
}

/// A store failure arrives as data; the loop keeps going and the answer
/// reports absence instead of crashing
#[tokio::test]
async fn test_store_failure_is_an_observation() {
    let model = ScriptedModel::new(&[
        "Action: get_flight_details\nAction Input: LX15",
        "Final Answer: I have no information on that flight.",
    ]);
    let executor = AgentExecutor::new(model.clone(), vec![Arc::new(BrokenStoreTool) as Arc<dyn Tool>]);

    let outcome = executor
        .run(&Transcript::new(), "What airline operates LX 15?")
        .await
        .unwrap();

    assert_eq!(
        outcome.steps[0].observation,
        r#"{"error":"Query failed: connection reset by peer"}"#
    );
    assert_eq!(outcome.answer, "I have no information on that flight.");

    // the failure reached the model verbatim, as an observation
    let prompts = model.prompts();
    assert!(prompts[1].contains("connection reset by peer"));
}

/// Naming a tool outside the capability table is observed, not fatal
#[tokio::test]
async fn test_unknown_tool_name() {
    let model = ScriptedModel::new(&[
        "Action: search_web\nAction Input: LX15",
        "Final Answer: I have no information on that flight.",
    ]);
    let executor = executor_over(model).await;

    let outcome = executor
        .run(&Transcript::new(), "What airline operates LX 15?")
        .await
        .unwrap();

    assert!(outcome.steps[0]
        .observation
        .contains("search_web is not a valid tool"));
    assert!(outcome.steps[0].observation.contains("get_flight_details"));
}

/// The session appends both turns per question and renders prior turns
/// into the next prompt
#[tokio::test]
async fn test_session_transcript_flow() {
    let model = ScriptedModel::new(&[
        "Action: get_flight_details\nAction Input: LX15",
        "Final Answer: Swiss operates LX15.",
        "Action: get_flight_details\nAction Input: UA9715",
        "Final Answer: UA9715 is marketed by United Airlines.",
    ]);
    let repo = seeded_repo().await;
    let tool = Arc::new(FlightLookupTool::new(repo)) as Arc<dyn Tool>;
    let executor = AgentExecutor::new(model.clone(), vec![tool]);
    let mut session = ChatSession::new(executor);

    let first = session.ask("What airline operates LX 15?").await;
    assert_eq!(first, "Swiss operates LX15.");
    assert_eq!(session.transcript().len(), 2);

    let second = session.ask("And who markets UA 9715?").await;
    assert_eq!(second, "UA9715 is marketed by United Airlines.");
    assert_eq!(session.transcript().len(), 4);

    // the second question's first prompt carries the prior exchange
    let prompts = model.prompts();
    assert!(prompts[2].contains("Previous conversation:"));
    assert!(prompts[2].contains("User: What airline operates LX 15?"));
    assert!(prompts[2].contains("Assistant: Swiss operates LX15."));

    session.reset();
    assert!(session.transcript().is_empty());
}

/// A completion-transport failure degrades to an explanatory answer
#[tokio::test]
async fn test_session_degrades_on_model_failure() {
    let model = ScriptedModel::new(&[]);
    let repo = seeded_repo().await;
    let tool = Arc::new(FlightLookupTool::new(repo)) as Arc<dyn Tool>;
    let executor = AgentExecutor::new(model, vec![tool]);
    let mut session = ChatSession::new(executor);

    let answer = session.ask("What airline operates LX 15?").await;
    assert!(answer.contains("I could not process that question"));
    // the failed exchange is still recorded
    assert_eq!(session.transcript().len(), 2);
}
