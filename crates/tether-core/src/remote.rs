pub mod http;

use async_trait::async_trait;
use serde::{
  Deserialize,
  Serialize
};

use crate::error::StoreError;
use crate::task::Task;

#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
  #[serde(rename = "todo")]
  pub text: String,

  pub completed: bool,

  #[serde(rename = "userId")]
  pub owner_id: u64,

  #[serde(rename = "createdAt")]
  pub created_at: String
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTask {
  pub id: u64,

  #[serde(rename = "todo")]
  pub text: String,

  #[serde(default)]
  pub completed: bool,

  #[serde(default, rename = "userId")]
  pub owner_id: Option<u64>,

  #[serde(
    default,
    rename = "createdAt"
  )]
  pub created_at: Option<String>
}

impl RemoteTask {
  pub fn into_task(self) -> Task {
    Task::new(
      self.id,
      self.text,
      self.completed,
      self.created_at
    )
  }
}

#[derive(Debug, Deserialize)]
pub struct RemoteTaskPage {
  pub todos: Vec<RemoteTask>,

  #[serde(default)]
  pub total: Option<u64>
}

#[async_trait]
pub trait TaskStore {
  async fn fetch_all(
    &self
  ) -> Result<Vec<RemoteTask>, StoreError>;

  async fn add(
    &self,
    draft: &NewTask
  ) -> Result<RemoteTask, StoreError>;

  async fn set_completed(
    &self,
    id: u64,
    completed: bool
  ) -> Result<RemoteTask, StoreError>;
}
