//! The task board controller.
//!
//! Holds what the screen shows (task rows, the row being edited, the create
//! form, a pending delete confirmation) and turns user actions into
//! requests. Requests run on the tokio runtime; their results come back as
//! [`BoardEvent`]s which the UI loop feeds to [`TaskBoard::handle`].
//!
//! Every mutation except a status change is followed by a full reload. Each
//! reload takes a new ticket and aborts the previous load, and only the
//! latest ticket's result is applied. While a status update is in flight no
//! list is fetched: a load already running is made stale and a fresh one is
//! issued once every pending status update has answered, so a list read
//! before the update cannot put the old status back on the row.

use std::{future::Future, sync::Arc};

use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::api::TaskApi;
use crate::date_picker::DatePicker;
use crate::error::{ApiError, ApiResult};
use crate::form::{self, TaskForm};
use crate::task::{Task, TaskId, TaskStatus, TaskUpdate};

#[derive(Debug)]
pub enum BoardEvent {
    Loaded {
        ticket: u64,
        result: ApiResult<Vec<Task>>,
    },
    Mutated {
        mutation: Mutation,
        result: ApiResult<()>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create,
    SaveEdit(TaskId),
    ChangeStatus(TaskId, TaskStatus),
    Delete(TaskId),
}

impl Mutation {
    fn failure_message(&self) -> &'static str {
        match self {
            Mutation::Create => "Failed to create task",
            Mutation::SaveEdit(_) => "Failed to update task details",
            Mutation::ChangeStatus(..) => "Failed to update task status",
            Mutation::Delete(_) => "Failed to delete task",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Create,
    ConfirmDelete { id: TaskId, title: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One line of feedback for the status bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    fn error(context: &str, err: &ApiError) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: format!("{context}: {err}"),
        }
    }
}

#[derive(Debug)]
struct EditSession {
    id: TaskId,
    form: TaskForm,
}

pub struct TaskBoard {
    api: Arc<dyn TaskApi>,
    runtime: Handle,
    events: UnboundedSender<BoardEvent>,
    tasks: Vec<Task>,
    selected: usize,
    editing: Option<EditSession>,
    create_form: TaskForm,
    mode: Mode,
    notice: Option<Notice>,
    latest_ticket: u64,
    loading: Option<JoinHandle<()>>,
    pending_status: usize,
    deferred_reload: bool,
    current_year: i32,
}

impl TaskBoard {
    /// Builds an empty board. Nothing is fetched until [`TaskBoard::reload`].
    pub fn new(api: Arc<dyn TaskApi>, runtime: Handle) -> (Self, UnboundedReceiver<BoardEvent>) {
        Self::with_picker(api, runtime, DatePicker::today(), form::current_year())
    }

    /// Like [`TaskBoard::new`] with a fixed "today" for the create form.
    pub fn with_picker(
        api: Arc<dyn TaskApi>,
        runtime: Handle,
        today: DatePicker,
        current_year: i32,
    ) -> (Self, UnboundedReceiver<BoardEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let board = Self {
            api,
            runtime,
            events,
            tasks: Vec::new(),
            selected: 0,
            editing: None,
            create_form: TaskForm::for_create(today),
            mode: Mode::Browse,
            notice: None,
            latest_ticket: 0,
            loading: None,
            pending_status: 0,
            deferred_reload: false,
            current_year,
        };
        (board, rx)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.selected)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some() || self.deferred_reload
    }

    pub fn row_state(&self, index: usize) -> RowState {
        match (&self.editing, self.tasks.get(index)) {
            (Some(session), Some(task)) if session.id == task.id => RowState::Editing,
            _ => RowState::Viewing,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn edit_form(&self) -> Option<&TaskForm> {
        self.editing.as_ref().map(|s| &s.form)
    }

    pub fn edit_form_mut(&mut self) -> Option<&mut TaskForm> {
        self.editing.as_mut().map(|s| &mut s.form)
    }

    pub fn create_form(&self) -> &TaskForm {
        &self.create_form
    }

    pub fn create_form_mut(&mut self) -> &mut TaskForm {
        &mut self.create_form
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.tasks.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select(&mut self, index: usize) {
        if index < self.tasks.len() {
            self.selected = index;
        }
    }

    /// Requests the whole task list. Supersedes any load still in flight.
    /// With status updates pending, the request waits until they answer.
    pub fn reload(&mut self) {
        self.invalidate_load();
        if self.pending_status > 0 {
            self.deferred_reload = true;
            return;
        }
        let ticket = self.latest_ticket;

        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        self.loading = Some(self.runtime.spawn(async move {
            let result = api.list().await;
            let _ = events.send(BoardEvent::Loaded { ticket, result });
        }));
    }

    /// Makes any load in flight stale.
    fn invalidate_load(&mut self) {
        self.latest_ticket += 1;
        if let Some(previous) = self.loading.take() {
            previous.abort();
        }
    }

    fn spawn_mutation<F, Fut>(&self, mutation: Mutation, request: F)
    where
        F: FnOnce(Arc<dyn TaskApi>) -> Fut + Send + 'static,
        Fut: Future<Output = ApiResult<()>> + Send + 'static,
    {
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let result = request(api).await;
            let _ = events.send(BoardEvent::Mutated { mutation, result });
        });
    }

    /// Applies a finished request to the board.
    pub fn handle(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Loaded { ticket, result } => self.apply_load(ticket, result),
            BoardEvent::Mutated { mutation, result } => self.apply_mutation(mutation, result),
        }
    }

    fn apply_load(&mut self, ticket: u64, result: ApiResult<Vec<Task>>) {
        if ticket != self.latest_ticket {
            tracing::debug!(ticket, latest = self.latest_ticket, "Dropping stale task list");
            return;
        }
        self.loading = None;

        match result {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "Rendering task list");
                self.tasks = tasks;
                // A full re-render puts every row back in view mode.
                self.editing = None;
                self.selected = self.selected.min(self.tasks.len().saturating_sub(1));
            }
            Err(err) => {
                tracing::error!(error = %err, "Error fetching tasks");
                self.notice = Some(Notice::error("Error fetching tasks", &err));
            }
        }
    }

    fn apply_mutation(&mut self, mutation: Mutation, result: ApiResult<()>) {
        if let Mutation::ChangeStatus(..) = mutation {
            self.pending_status = self.pending_status.saturating_sub(1);
            if self.pending_status == 0 && self.deferred_reload {
                self.deferred_reload = false;
                self.reload();
            }
        }

        if let Err(err) = result {
            tracing::error!(?mutation, error = %err, "{}", mutation.failure_message());
            self.notice = Some(Notice::error(mutation.failure_message(), &err));
            return;
        }

        match mutation {
            Mutation::ChangeStatus(id, status) => {
                tracing::debug!(task_id = %id, %status, "Status updated");
            }
            Mutation::Create => {
                self.notice = Some(Notice::info("Task created"));
                self.reload();
            }
            Mutation::SaveEdit(_) => {
                self.notice = Some(Notice::info("Task updated"));
                self.reload();
            }
            Mutation::Delete(_) => {
                self.notice = Some(Notice::info("Task deleted"));
                self.reload();
            }
        }
    }

    /// Puts the selected row in edit mode, prefilled from the task.
    pub fn begin_edit(&mut self) {
        if let Some(task) = self.tasks.get(self.selected) {
            self.editing = Some(EditSession {
                id: task.id.clone(),
                form: TaskForm::for_edit(task, self.current_year),
            });
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Sends the edited title, description and due date. The row stays in
    /// edit mode until the reload that follows success.
    pub fn save_edit(&mut self) {
        let Some(session) = &self.editing else {
            return;
        };
        let id = session.id.clone();
        let update = session.form.to_update();
        self.spawn_mutation(Mutation::SaveEdit(id.clone()), move |api| async move {
            api.update(&id, &update).await
        });
    }

    /// Sets the selected task's status and sends a status-only update. The
    /// row already shows the new value, so nothing is reloaded, except that
    /// a load already in flight is replaced by one issued after the update.
    pub fn set_status(&mut self, status: TaskStatus) {
        let Some(task) = self.tasks.get_mut(self.selected) else {
            return;
        };
        if task.status == status {
            return;
        }
        task.status = status;
        let id = task.id.clone();
        if self.loading.is_some() {
            self.invalidate_load();
            self.deferred_reload = true;
        }
        self.pending_status += 1;
        self.spawn_mutation(Mutation::ChangeStatus(id.clone(), status), move |api| async move {
            api.update(&id, &TaskUpdate::status(status)).await
        });
    }

    pub fn cycle_status(&mut self, forward: bool) {
        if let Some(task) = self.selected_task() {
            let status = if forward {
                task.status.next()
            } else {
                task.status.previous()
            };
            self.set_status(status);
        }
    }

    /// Shows the create form. Whatever was typed last time is still there.
    pub fn open_create(&mut self) {
        self.mode = Mode::Create;
    }

    pub fn close_create(&mut self) {
        if self.mode == Mode::Create {
            self.mode = Mode::Browse;
        }
    }

    /// Posts the create form as a new task. The form is left as is.
    pub fn submit_create(&mut self) {
        let task = self.create_form.to_new_task();
        tracing::info!(?task, "Sending task data");
        self.spawn_mutation(Mutation::Create, move |api| async move {
            api.create(&task).await
        });
    }

    /// Asks for confirmation before deleting the selected task.
    pub fn request_delete(&mut self) {
        if let Some(task) = self.tasks.get(self.selected) {
            self.mode = Mode::ConfirmDelete {
                id: task.id.clone(),
                title: task.title.clone(),
            };
        }
    }

    /// Answers the pending confirmation. Declining sends nothing.
    pub fn resolve_delete(&mut self, confirmed: bool) {
        let Mode::ConfirmDelete { id, .. } = std::mem::replace(&mut self.mode, Mode::Browse) else {
            return;
        };
        if !confirmed {
            tracing::debug!(task_id = %id, "Delete declined");
            return;
        }
        self.spawn_mutation(Mutation::Delete(id.clone()), move |api| async move {
            api.delete(&id).await
        });
    }
}
