// Deterministic gateway that replays a fixed sequence of model turns
//
// Used for offline runs and tests. Every request is recorded so callers can
// assert on what the engine actually sent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::types::{CompletionRequest, ModelTurn};
use super::ModelGateway;
use crate::errors::GatewayError;

pub struct ScriptedGateway {
    replies: Mutex<VecDeque<Result<ModelTurn, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Result<ModelTurn, GatewayError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Script made only of successful turns
    pub fn from_turns(turns: Vec<ModelTurn>) -> Self {
        Self::new(turns.into_iter().map(Ok).collect())
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ModelGateway for ScriptedGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<ModelTurn, GatewayError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .replies
            .lock()
            .map_err(|_| GatewayError::Transport("scripted gateway poisoned".to_string()))?
            .pop_front();

        next.unwrap_or_else(|| {
            Err(GatewayError::Transport(
                "scripted gateway has no replies left".to_string(),
            ))
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
