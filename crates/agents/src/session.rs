//! Session boundary - owns the transcript, exposes ask/reset

use crate::completion::CompletionProvider;
use crate::executor::AgentExecutor;
use groundtruth_core::{ChatTurn, Transcript};
use tracing::{error, instrument};
use uuid::Uuid;

/// One user's conversation with the assistant.
///
/// The transcript is owned exclusively by the session and mutated only
/// between completed questions; concurrent users each hold their own
/// session over the shared repository and model client.
pub struct ChatSession<P> {
    id: Uuid,
    executor: AgentExecutor<P>,
    transcript: Transcript,
}

impl<P: CompletionProvider> ChatSession<P> {
    /// Open a fresh session over the given executor
    pub fn new(executor: AgentExecutor<P>) -> Self {
        Self {
            id: Uuid::new_v4(),
            executor,
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Answer one question.
    ///
    /// Never fails: a completion-transport failure degrades to an
    /// explanatory answer, and the exchange is recorded either way.
    #[instrument(skip(self, question), fields(session = %self.id))]
    pub async fn ask(&mut self, question: &str) -> String {
        let answer = match self.executor.run(&self.transcript, question).await {
            Ok(outcome) => outcome.answer,
            Err(e) => {
                error!("agent run failed: {e}");
                format!("I could not process that question: {e}")
            }
        };

        self.transcript.push(ChatTurn::user(question));
        self.transcript.push(ChatTurn::assistant(&answer));

        answer
    }

    /// Drop the conversation history
    pub fn reset(&mut self) {
        self.transcript.clear();
    }
}
