use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::StatusCode;

use super::TaskApi;
use crate::error::{ApiError, ApiResult};
use crate::task::{NewTask, Task, TaskId, TaskUpdate};

/// A request as the backend would have received it.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    List,
    Fetch(TaskId),
    Create(NewTask),
    Update(TaskId, TaskUpdate),
    Delete(TaskId),
}

#[derive(Default)]
struct Store {
    tasks: Vec<Task>,
    next_id: u64,
    requests: Vec<RecordedRequest>,
    fail_next: Option<StatusCode>,
}

/// Process-local backend following the REST service's rules: a create
/// without a title is rejected with 400, unknown ids answer 404, and an
/// update only touches the fields it carries. Every request is recorded,
/// and the next one can be made to fail.
#[derive(Default)]
pub struct InMemoryTaskApi {
    store: Mutex<Store>,
}

impl InMemoryTaskApi {
    pub fn new(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .filter_map(|t| t.id.as_str().parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            store: Mutex::new(Store {
                tasks,
                next_id,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.lock().tasks.clone()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Makes the next request answer with `status` without touching the store.
    pub fn fail_next(&self, status: StatusCode) {
        self.lock().fail_next = Some(status);
    }

    /// Records `request` and consumes a pending failure, if any.
    fn begin(&self, request: RecordedRequest) -> ApiResult<MutexGuard<'_, Store>> {
        let mut store = self.lock();
        store.requests.push(request);
        match store.fail_next.take() {
            Some(status) => Err(ApiError::Status {
                status,
                body: String::new(),
            }),
            None => Ok(store),
        }
    }
}

fn not_found(id: &TaskId) -> ApiError {
    ApiError::Status {
        status: StatusCode::NOT_FOUND,
        body: format!("task {id} not found"),
    }
}

#[async_trait]
impl TaskApi for InMemoryTaskApi {
    async fn list(&self) -> ApiResult<Vec<Task>> {
        let store = self.begin(RecordedRequest::List)?;
        Ok(store.tasks.clone())
    }

    async fn fetch(&self, id: &TaskId) -> ApiResult<Task> {
        let store = self.begin(RecordedRequest::Fetch(id.clone()))?;
        store
            .tasks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create(&self, task: &NewTask) -> ApiResult<()> {
        let mut store = self.begin(RecordedRequest::Create(task.clone()))?;
        if task.title.is_empty() {
            return Err(ApiError::Status {
                status: StatusCode::BAD_REQUEST,
                body: "Missing required fields".to_string(),
            });
        }
        let id = TaskId::from(store.next_id);
        store.next_id += 1;
        store.tasks.push(Task {
            id,
            title: task.title.clone(),
            description: Some(task.description.clone()),
            due_date: task.due_date,
            status: task.status,
        });
        Ok(())
    }

    async fn update(&self, id: &TaskId, update: &TaskUpdate) -> ApiResult<()> {
        let mut store = self.begin(RecordedRequest::Update(id.clone(), update.clone()))?;
        let task = store
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found(id))?;
        update.apply_to(task);
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> ApiResult<()> {
        let mut store = self.begin(RecordedRequest::Delete(id.clone()))?;
        let before = store.tasks.len();
        store.tasks.retain(|t| &t.id != id);
        if store.tasks.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }
}
