//! Access to the task backend.
//!
//! The board talks to the backend only through [`TaskApi`], so it can run
//! against the real REST service ([`HttpTaskApi`]) or an in-process store
//! ([`InMemoryTaskApi`]) for demos and tests.

mod http;
mod memory;

pub use http::HttpTaskApi;
pub use memory::{InMemoryTaskApi, RecordedRequest};

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `GET /tasks`
    async fn list(&self) -> ApiResult<Vec<Task>>;

    /// `GET /tasks/{id}`
    async fn fetch(&self, id: &TaskId) -> ApiResult<Task>;

    /// `POST /tasks`
    async fn create(&self, task: &NewTask) -> ApiResult<()>;

    /// `PUT /tasks/{id}` with only the fields set in `update`.
    async fn update(&self, id: &TaskId, update: &TaskUpdate) -> ApiResult<()>;

    /// `DELETE /tasks/{id}`
    async fn delete(&self, id: &TaskId) -> ApiResult<()>;
}
