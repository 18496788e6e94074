//! Mock transport for testing
//!
//! Queued responses per operation, with every call recorded. An empty queue
//! answers with a network error.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    ChatRequest, ChatResponse, FunFactResponse, GreetingResponse, HealthResponse, Transport,
};
use crate::error::TransportError;

type Queued<T> = Mutex<VecDeque<(Duration, Result<T, TransportError>)>>;

#[derive(Default)]
pub struct MockTransport {
    chats: Queued<ChatResponse>,
    greetings: Queued<GreetingResponse>,
    facts: Queued<FunFactResponse>,
    healths: Queued<HealthResponse>,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub greeting_calls: Mutex<usize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_chat(&self, response: &str) {
        self.chats.lock().unwrap().push_back((
            Duration::ZERO,
            Ok(ChatResponse {
                response: response.to_string(),
                chat_name: None,
            }),
        ));
    }

    pub fn queue_chat_response(&self, response: ChatResponse) {
        self.chats.lock().unwrap().push_back((Duration::ZERO, Ok(response)));
    }

    pub fn queue_chat_error(&self, error: TransportError) {
        self.chats.lock().unwrap().push_back((Duration::ZERO, Err(error)));
    }

    pub fn queue_greeting(&self, greeting: Result<&str, TransportError>) {
        let result = greeting.map(|g| GreetingResponse {
            greeting: g.to_string(),
        });
        self.greetings.lock().unwrap().push_back((Duration::ZERO, result));
    }

    pub fn queue_health(&self, status: Result<&str, TransportError>) {
        let result = status.map(|s| HealthResponse {
            status: s.to_string(),
            model_loaded: true,
            index_loaded: true,
        });
        self.healths.lock().unwrap().push_back((Duration::ZERO, result));
    }

    pub fn queue_fact(&self, fact: Result<&str, TransportError>) {
        self.queue_fact_after(Duration::ZERO, fact);
    }

    /// Answer the next fun-fact call only after `delay`
    pub fn queue_fact_after(&self, delay: Duration, fact: Result<&str, TransportError>) {
        let result = fact.map(|f| FunFactResponse {
            fact: f.to_string(),
        });
        self.facts.lock().unwrap().push_back((delay, result));
    }

    pub fn recorded_chats(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn greeting_call_count(&self) -> usize {
        *self.greeting_calls.lock().unwrap()
    }
}

async fn next<T>(queue: &Queued<T>) -> Result<T, TransportError> {
    let entry = queue.lock().unwrap().pop_front();
    match entry {
        Some((delay, result)) => {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            result
        }
        None => Err(TransportError::new("no mock response queued")),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        self.chat_requests.lock().unwrap().push(request.clone());
        next(&self.chats).await
    }

    async fn greeting(&self) -> Result<GreetingResponse, TransportError> {
        *self.greeting_calls.lock().unwrap() += 1;
        next(&self.greetings).await
    }

    async fn fun_fact(&self) -> Result<FunFactResponse, TransportError> {
        next(&self.facts).await
    }

    async fn health(&self) -> Result<HealthResponse, TransportError> {
        next(&self.healths).await
    }
}
