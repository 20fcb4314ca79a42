use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{
  debug,
  instrument
};

use crate::error::StoreError;
use crate::remote::{
  NewTask,
  RemoteTask,
  RemoteTaskPage,
  TaskStore
};

#[derive(Debug, Clone)]
pub struct HttpTaskStore {
  base_url: String,
  client:   reqwest::Client
}

#[derive(Debug, Serialize)]
struct CompletedPatch {
  completed: bool
}

impl HttpTaskStore {
  pub fn new(
    base_url: impl Into<String>
  ) -> Result<Self, StoreError> {
    let base_url = base_url.into();
    let base_url = base_url
      .trim_end_matches('/')
      .to_string();

    let client =
      reqwest::Client::builder()
        .timeout(Duration::from_secs(
          30
        ))
        .build()
        .map_err(|source| {
          StoreError::Request {
            url: base_url.clone(),
            source
          }
        })?;

    Ok(Self {
      base_url,
      client
    })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/{path}",
      self.base_url
    )
  }

  async fn check_status(
    url: &str,
    response: reqwest::Response
  ) -> Result<
    reqwest::Response,
    StoreError
  > {
    let status = response.status();
    if status.is_success() {
      Ok(response)
    } else {
      Err(StoreError::Status {
        url:    url.to_string(),
        status: status.as_u16()
      })
    }
  }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
  #[instrument(skip(self))]
  async fn fetch_all(
    &self
  ) -> Result<Vec<RemoteTask>, StoreError>
  {
    let url = self.url("todos");
    let response = self
      .client
      .get(&url)
      .send()
      .await
      .map_err(|source| {
        StoreError::Request {
          url: url.clone(),
          source
        }
      })?;

    let page: RemoteTaskPage =
      Self::check_status(
        &url, response
      )
      .await?
      .json()
      .await
      .map_err(|source| {
        StoreError::Decode {
          url: url.clone(),
          source
        }
      })?;

    debug!(
      count = page.todos.len(),
      total = ?page.total,
      "fetched todos"
    );
    Ok(page.todos)
  }

  #[instrument(skip(self, draft), fields(text_len = draft.text.len()))]
  async fn add(
    &self,
    draft: &NewTask
  ) -> Result<RemoteTask, StoreError>
  {
    let url = self.url("todos/add");
    let response = self
      .client
      .post(&url)
      .json(draft)
      .send()
      .await
      .map_err(|source| {
        StoreError::Request {
          url: url.clone(),
          source
        }
      })?;

    let created: RemoteTask =
      Self::check_status(
        &url, response
      )
      .await?
      .json()
      .await
      .map_err(|source| {
        StoreError::Decode {
          url: url.clone(),
          source
        }
      })?;

    debug!(
      id = created.id,
      "created remote task"
    );
    Ok(created)
  }

  #[instrument(skip(self))]
  async fn set_completed(
    &self,
    id: u64,
    completed: bool
  ) -> Result<RemoteTask, StoreError>
  {
    let url = self
      .url(&format!("todos/{id}"));
    let response = self
      .client
      .put(&url)
      .json(&CompletedPatch {
        completed
      })
      .send()
      .await
      .map_err(|source| {
        StoreError::Request {
          url: url.clone(),
          source
        }
      })?;

    let updated: RemoteTask =
      Self::check_status(
        &url, response
      )
      .await?
      .json()
      .await
      .map_err(|source| {
        StoreError::Decode {
          url: url.clone(),
          source
        }
      })?;

    debug!(
      id = updated.id,
      completed = updated.completed,
      "updated remote task"
    );
    Ok(updated)
  }
}
