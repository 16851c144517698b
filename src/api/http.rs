use async_trait::async_trait;
use reqwest::{Client, Response};

use super::TaskApi;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::task::{NewTask, Task, TaskEnvelope, TaskId, TaskList, TaskUpdate};

/// REST client for the task backend.
#[derive(Clone)]
pub struct HttpTaskApi {
    client: Client,
    config: Config,
}

impl HttpTaskApi {
    pub fn new(config: Config) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    fn task_url(&self, id: &TaskId) -> String {
        self.config.endpoint(&format!("/tasks/{id}"))
    }

    /// Turns a non-success reply into [`ApiError::Status`], keeping the body
    /// for the log.
    async fn check(resp: Response) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn list(&self) -> ApiResult<Vec<Task>> {
        let resp = self
            .client
            .get(self.config.endpoint("/tasks"))
            .send()
            .await?;
        let text = Self::check(resp).await?.text().await?;
        let list: TaskList = serde_json::from_str(&text)?;
        tracing::debug!(count = list.tasks.len(), "Fetched task list");
        Ok(list.tasks)
    }

    async fn fetch(&self, id: &TaskId) -> ApiResult<Task> {
        let resp = self.client.get(self.task_url(id)).send().await?;
        let text = Self::check(resp).await?.text().await?;
        let envelope: TaskEnvelope = serde_json::from_str(&text)?;
        Ok(envelope.task)
    }

    async fn create(&self, task: &NewTask) -> ApiResult<()> {
        tracing::info!(title = %task.title, due_date = %task.due_date, status = %task.status, "Creating task");
        let resp = self
            .client
            .post(self.config.endpoint("/tasks"))
            .json(task)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn update(&self, id: &TaskId, update: &TaskUpdate) -> ApiResult<()> {
        tracing::info!(task_id = %id, ?update, "Updating task");
        let resp = self
            .client
            .put(self.task_url(id))
            .json(update)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> ApiResult<()> {
        tracing::info!(task_id = %id, "Deleting task");
        let resp = self.client.delete(self.task_url(id)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }
}
