//! Terminal client for a REST task list.
//!
//! The board loads every task from the backend, shows them as rows, and lets
//! the user change a task's status, edit it inline, create new tasks and
//! delete tasks after confirmation. After any mutation other than a status
//! change, the whole list is fetched again.

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod date_picker;
pub mod error;
pub mod form;
pub mod logging;
pub mod task;
pub mod ui;

pub use api::{HttpTaskApi, InMemoryTaskApi, TaskApi};
pub use board::TaskBoard;
pub use config::Config;
pub use error::ApiError;
pub use task::{NewTask, Task, TaskId, TaskStatus, TaskUpdate};
