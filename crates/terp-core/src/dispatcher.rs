//! Chat message dispatch
//!
//! Sending is split into two transitions. [`MessageDispatcher::send`] appends
//! the user message and marks the session loading before anything goes over
//! the wire; [`MessageDispatcher::poll`] (or [`MessageDispatcher::settle`])
//! later appends the assistant reply and clears the loading flag. A failed,
//! panicked, or cancelled request is reconciled the same way as a failure.

use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

use crate::api::{ChatRequest, ChatResponse, HistoryEntry, Transport};
use crate::error::TransportError;
use crate::state::{ChatMessage, SessionState};

/// Shown in place of a reply when the chat request fails
pub const CHAT_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your request. Please try again.";

type ChatTask = JoinHandle<Result<ChatResponse, TransportError>>;

pub struct MessageDispatcher {
    transport: Arc<dyn Transport>,
    in_flight: Option<ChatTask>,
}

impl MessageDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            in_flight: None,
        }
    }

    /// Start a chat request. Returns false when the submission was ignored.
    pub fn send(&mut self, state: &mut SessionState, raw_text: &str) -> bool {
        let text = raw_text.trim();
        if text.is_empty() {
            return false;
        }
        if state.is_loading || self.in_flight.is_some() {
            debug!("send rejected: a chat request is already in flight");
            return false;
        }
        if !state.backend_healthy {
            debug!("send rejected: backend unavailable");
            return false;
        }

        // History is captured before the new message is appended
        let request = ChatRequest {
            message: text.to_string(),
            chat_history: state.messages().iter().map(HistoryEntry::from).collect(),
        };

        state.push(ChatMessage::user(text));
        state.is_loading = true;
        debug!(history = request.chat_history.len(), "dispatching chat request");

        let transport = Arc::clone(&self.transport);
        self.in_flight = Some(tokio::spawn(async move { transport.chat(&request).await }));
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Reconcile the outstanding request if it has finished. Returns true if
    /// the session state changed.
    pub async fn poll(&mut self, state: &mut SessionState) -> bool {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if finished {
            self.settle(state).await;
        }
        finished
    }

    /// Wait for the outstanding request, if any, and reconcile it
    pub async fn settle(&mut self, state: &mut SessionState) {
        if let Some(task) = self.in_flight.take() {
            let outcome = flatten(task.await);
            reconcile(state, outcome);
        }
    }

    /// Cancel the outstanding request on teardown. Its result is discarded.
    pub fn abort(&mut self, state: &mut SessionState) {
        if let Some(task) = self.in_flight.take() {
            debug!("aborting in-flight chat request");
            task.abort();
            state.is_loading = false;
        }
    }
}

impl Drop for MessageDispatcher {
    fn drop(&mut self) {
        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
    }
}

fn flatten(
    joined: Result<Result<ChatResponse, TransportError>, JoinError>,
) -> Result<ChatResponse, TransportError> {
    joined.unwrap_or_else(|err| Err(TransportError::interrupted(err)))
}

fn reconcile(state: &mut SessionState, outcome: Result<ChatResponse, TransportError>) {
    match outcome {
        Ok(reply) if !reply.response.trim().is_empty() => {
            if state.chat_name.is_none() {
                state.chat_name = reply.chat_name.filter(|name| !name.trim().is_empty());
            }
            state.push(ChatMessage::assistant(reply.response.trim()));
        }
        Ok(_) => {
            warn!("chat response was empty");
            state.push(ChatMessage::assistant(CHAT_ERROR_MESSAGE));
        }
        Err(err) => {
            warn!(error = %err, "chat request failed");
            state.push(ChatMessage::assistant(CHAT_ERROR_MESSAGE));
        }
    }
    state.is_loading = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::state::ChatRole;

    fn setup() -> (Arc<MockTransport>, MessageDispatcher, SessionState) {
        let mock = Arc::new(MockTransport::new());
        let dispatcher = MessageDispatcher::new(mock.clone());
        (mock, dispatcher, SessionState::new())
    }

    #[tokio::test]
    async fn test_send_appends_user_then_assistant() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat("CMSC131 is Object-Oriented Programming I.");

        assert!(!state.is_loading());
        assert!(dispatcher.send(&mut state, "  Tell me about CMSC131  "));

        // Optimistic transition happens before the request resolves
        assert_eq!(state.messages().len(), 1);
        assert_eq!(state.messages()[0].role(), ChatRole::User);
        assert_eq!(state.messages()[0].content(), "Tell me about CMSC131");
        assert!(state.is_loading());

        dispatcher.settle(&mut state).await;
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].role(), ChatRole::Assistant);
        assert_eq!(
            state.messages()[1].content(),
            "CMSC131 is Object-Oriented Programming I."
        );
        assert!(!state.is_loading());
        assert!(!dispatcher.is_in_flight());
    }

    #[tokio::test]
    async fn test_blank_send_is_noop() {
        let (mock, mut dispatcher, mut state) = setup();

        assert!(!dispatcher.send(&mut state, ""));
        assert!(!dispatcher.send(&mut state, "   "));
        assert!(!dispatcher.send(&mut state, "\n\t"));
        assert!(state.messages().is_empty());
        assert!(!state.is_loading());
        assert!(mock.recorded_chats().is_empty());
    }

    #[tokio::test]
    async fn test_send_while_loading_is_noop() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat("first reply");

        assert!(dispatcher.send(&mut state, "first"));
        assert!(!dispatcher.send(&mut state, "second"));
        assert_eq!(state.messages().len(), 1);

        dispatcher.settle(&mut state).await;
        assert_eq!(state.messages().len(), 2);
        assert_eq!(mock.recorded_chats().len(), 1);
    }

    #[tokio::test]
    async fn test_send_while_unhealthy_is_noop() {
        let (_mock, mut dispatcher, mut state) = setup();
        state.backend_healthy = false;

        assert!(!dispatcher.send(&mut state, "hello"));
        assert!(state.messages().is_empty());
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_failure_appends_apology() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat_error(TransportError::status(500));

        assert!(dispatcher.send(&mut state, "hello"));
        dispatcher.settle(&mut state).await;

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].content(), CHAT_ERROR_MESSAGE);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn test_history_excludes_new_message() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat("reply one");
        mock.queue_chat("reply two");

        dispatcher.send(&mut state, "one");
        dispatcher.settle(&mut state).await;
        dispatcher.send(&mut state, "two");
        dispatcher.settle(&mut state).await;

        let requests = mock.recorded_chats();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].chat_history.is_empty());
        assert_eq!(requests[1].message, "two");
        assert_eq!(
            requests[1].chat_history,
            vec![
                HistoryEntry { role: ChatRole::User, content: "one".to_string() },
                HistoryEntry { role: ChatRole::Assistant, content: "reply one".to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn test_first_chat_name_is_kept() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat_response(ChatResponse {
            response: "Sure.".to_string(),
            chat_name: Some("Dining Halls".to_string()),
        });
        mock.queue_chat_response(ChatResponse {
            response: "Also sure.".to_string(),
            chat_name: Some("Something Else".to_string()),
        });

        dispatcher.send(&mut state, "dining?");
        dispatcher.settle(&mut state).await;
        dispatcher.send(&mut state, "more?");
        dispatcher.settle(&mut state).await;

        assert_eq!(state.chat_name(), Some("Dining Halls"));
    }

    #[tokio::test]
    async fn test_poll_waits_for_completion() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat("done");

        dispatcher.send(&mut state, "hi");
        while !dispatcher.poll(&mut state).await {
            tokio::task::yield_now().await;
        }
        assert_eq!(state.messages().len(), 2);
        assert!(!state.is_loading());
        assert!(!dispatcher.poll(&mut state).await);
    }

    #[tokio::test]
    async fn test_abort_discards_result() {
        let (mock, mut dispatcher, mut state) = setup();
        mock.queue_chat("never shown");

        dispatcher.send(&mut state, "hi");
        dispatcher.abort(&mut state);

        assert_eq!(state.messages().len(), 1);
        assert!(!state.is_loading());
        assert!(!dispatcher.is_in_flight());
    }

    #[test]
    fn test_empty_reply_is_treated_as_failure() {
        let mut state = SessionState::new();
        state.is_loading = true;
        reconcile(
            &mut state,
            Ok(ChatResponse { response: "  ".to_string(), chat_name: None }),
        );
        assert_eq!(state.messages()[0].content(), CHAT_ERROR_MESSAGE);
        assert!(!state.is_loading());
    }
}
