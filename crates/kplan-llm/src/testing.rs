//! A scripted [`CompletionClient`] for unit tests.

use std::sync::Mutex;

use crate::{CompletionClient, CompletionRequest, Error, Result};

pub(crate) enum Reply {
  Text(String),
  Status(u16),
  Empty,
}

pub(crate) struct ScriptedClient {
  reply:    Reply,
  requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
  pub(crate) fn new(reply: Reply) -> Self {
    Self {
      reply,
      requests: Mutex::new(Vec::new()),
    }
  }

  pub(crate) fn text(text: impl Into<String>) -> Self {
    Self::new(Reply::Text(text.into()))
  }

  pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
    self.requests.lock().unwrap().clone()
  }
}

impl CompletionClient for ScriptedClient {
  async fn complete(&self, request: &CompletionRequest) -> Result<String> {
    self.requests.lock().unwrap().push(request.clone());
    match &self.reply {
      Reply::Text(t) => Ok(t.clone()),
      Reply::Status(status) => Err(Error::Status {
        status: *status,
        body:   String::new(),
      }),
      Reply::Empty => Err(Error::EmptyResponse),
    }
  }
}
