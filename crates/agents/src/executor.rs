//! The Thought/Action/Observation reasoning loop.
//!
//! A bounded state machine over a single question: ask the model for the
//! next step, invoke the named tool when the step is an action, feed the
//! result back as an observation, and stop on a final answer or when a
//! budget runs out. Strictly sequential: one model call or one tool call
//! is in flight at any moment, never both.

use crate::completion::{CompletionProvider, OBSERVATION_STOPS};
use crate::tool::Tool;
use crate::Result;
use groundtruth_core::Transcript;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const DEFAULT_MAX_TURNS: usize = 6;
const DEFAULT_MAX_PARSE_RETRIES: usize = 2;

/// Returned when the turn or retry budget runs out
pub const DEGRADED_ANSWER: &str =
    "I could not complete the lookup within the allowed number of steps. \
     Please try rephrasing the question.";

/// Corrective observation appended after an unparseable model step
const FORMAT_CORRECTION: &str =
    "Invalid format. Reply with an `Action: <tool name>` line followed by \
     `Action Input: <flight code>`, or finish with `Final Answer: <answer>`.";

const PROMPT_TEMPLATE: &str = r#"You are a precise data retrieval assistant for airport ground operations.
You answer questions ONLY using the information returned by your tools.

CRITICAL RULES:
1. Do NOT use outside knowledge. If the tool says the flight was not found, say "I have no information on that flight".
2. Do NOT invent flight routes, times, or aircraft.
3. When using the tool, provide ONLY the flight code as the input (e.g., "LX15"). Do not use JSON formatting.

TOOLS:
{tools}

FORMAT:
Question: the input question
Thought: think about what to do
Action: the action to take, must be one of [{tool_names}]
Action Input: the input to the action (simple text, no JSON)
Observation: the result of the action
... (repeat Thought/Action/Observation if needed)
Final Answer: the final answer based ONLY on the Observation.

Begin!

{history}Question: {input}
Thought:{scratchpad}"#;

/// One executed Thought/Action/Observation cycle
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub thought: String,
    pub action: String,
    pub action_input: String,
    pub observation: String,
}

/// Outcome of running the loop over one question
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub answer: String,
    pub steps: Vec<AgentStep>,
}

/// The reasoning loop over a fixed capability table.
///
/// Tools are registered at construction and dispatched by name lookup.
pub struct AgentExecutor<P> {
    model: P,
    tools: BTreeMap<String, Arc<dyn Tool>>,
    max_turns: usize,
    max_parse_retries: usize,
}

impl<P: CompletionProvider> AgentExecutor<P> {
    /// Create an executor over the given capability table
    pub fn new(model: P, tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), tool))
            .collect();
        Self {
            model,
            tools,
            max_turns: DEFAULT_MAX_TURNS,
            max_parse_retries: DEFAULT_MAX_PARSE_RETRIES,
        }
    }

    /// Builder: cap the number of Thought/Action/Observation cycles
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Builder: cap recoveries from unparseable model output
    pub fn with_max_parse_retries(mut self, max_parse_retries: usize) -> Self {
        self.max_parse_retries = max_parse_retries;
        self
    }

    /// Drive the loop for one question.
    ///
    /// Tool and store failures arrive as observations and never abort the
    /// loop; only a completion-transport failure surfaces as `Err`.
    #[instrument(skip(self, transcript, question))]
    pub async fn run(&self, transcript: &Transcript, question: &str) -> Result<AgentOutcome> {
        let stops: Vec<String> = OBSERVATION_STOPS.iter().map(|s| s.to_string()).collect();
        let mut scratchpad = String::new();
        let mut steps: Vec<AgentStep> = Vec::new();
        let mut parse_failures = 0usize;

        for _ in 0..self.max_turns {
            let prompt = self.build_prompt(transcript, question, &scratchpad);
            let text = self.model.complete(&prompt, &stops).await?;
            debug!(step = %text, "model step");

            match parse_step(&text) {
                ModelStep::FinalAnswer(answer) => {
                    info!(steps = steps.len(), "final answer produced");
                    return Ok(AgentOutcome { answer, steps });
                }
                ModelStep::Action { tool, input } => {
                    let observation = match self.tools.get(tool.as_str()) {
                        Some(handler) => Value::Object(handler.invoke(&input).await).to_string(),
                        None => format!(
                            "{} is not a valid tool, try one of [{}].",
                            tool,
                            self.tool_names()
                        ),
                    };

                    let thought = text
                        .split("Action:")
                        .next()
                        .unwrap_or("")
                        .trim()
                        .to_string();

                    scratchpad.push_str(text.trim_end());
                    scratchpad.push_str("\nObservation: ");
                    scratchpad.push_str(&observation);
                    scratchpad.push_str("\nThought:");

                    steps.push(AgentStep {
                        thought,
                        action: tool,
                        action_input: input,
                        observation,
                    });
                }
                ModelStep::Unparseable => {
                    parse_failures += 1;
                    warn!(parse_failures, "model output matched neither grammar");
                    if parse_failures > self.max_parse_retries {
                        return Ok(AgentOutcome {
                            answer: DEGRADED_ANSWER.to_string(),
                            steps,
                        });
                    }

                    scratchpad.push_str(text.trim_end());
                    scratchpad.push_str("\nObservation: ");
                    scratchpad.push_str(FORMAT_CORRECTION);
                    scratchpad.push_str("\nThought:");
                }
            }
        }

        warn!(max_turns = self.max_turns, "turn budget exhausted");
        Ok(AgentOutcome {
            answer: DEGRADED_ANSWER.to_string(),
            steps,
        })
    }

    fn build_prompt(&self, transcript: &Transcript, question: &str, scratchpad: &str) -> String {
        let history = if transcript.is_empty() {
            String::new()
        } else {
            format!("Previous conversation:\n{}\n\n", transcript.render())
        };

        PROMPT_TEMPLATE
            .replace("{tools}", &self.render_tools())
            .replace("{tool_names}", &self.tool_names())
            .replace("{history}", &history)
            .replace("{input}", question)
            .replace("{scratchpad}", scratchpad)
    }

    fn render_tools(&self) -> String {
        self.tools
            .values()
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn tool_names(&self) -> String {
        self.tools.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// The shapes a model step can take
#[derive(Debug, Clone, PartialEq, Eq)]
enum ModelStep {
    Action { tool: String, input: String },
    FinalAnswer(String),
    Unparseable,
}

/// Classify one chunk of model output against the action/final-answer
/// grammar. Output carrying both an action and a final answer is
/// ambiguous and treated as unparseable.
fn parse_step(text: &str) -> ModelStep {
    let final_answer = text
        .rfind("Final Answer:")
        .map(|idx| text[idx + "Final Answer:".len()..].trim().to_string());
    let action = parse_action(text);

    match (action, final_answer) {
        (Some(_), Some(_)) => ModelStep::Unparseable,
        (Some((tool, input)), None) => ModelStep::Action { tool, input },
        (None, Some(answer)) => ModelStep::FinalAnswer(answer),
        (None, None) => ModelStep::Unparseable,
    }
}

fn parse_action(text: &str) -> Option<(String, String)> {
    let mut tool = None;
    let mut input = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Action Input:") {
            if input.is_none() {
                input = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Action:") {
            if tool.is_none() {
                tool = Some(rest.trim().to_string());
            }
        }
    }

    match (tool, input) {
        (Some(tool), Some(input)) if !tool.is_empty() => Some((tool, input)),
        _ => None,
    }
}
