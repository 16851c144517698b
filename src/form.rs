use chrono::Datelike;

use crate::date_picker::DatePicker;
use crate::task::{NewTask, Task, TaskStatus, TaskUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Year,
    Month,
    Day,
    Status,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Year => "Year",
            Field::Month => "Month",
            Field::Day => "Day",
            Field::Status => "Status",
        }
    }

    pub fn is_text(self) -> bool {
        matches!(self, Field::Title | Field::Description)
    }
}

const EDIT_FIELDS: [Field; 5] = [
    Field::Title,
    Field::Description,
    Field::Year,
    Field::Month,
    Field::Day,
];

const CREATE_FIELDS: [Field; 6] = [
    Field::Title,
    Field::Description,
    Field::Year,
    Field::Month,
    Field::Day,
    Field::Status,
];

/// Inputs of the create form and of a row in edit mode. The edit form has
/// no status selector; status changes go through the row's own selector.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub date: DatePicker,
    status: Option<TaskStatus>,
    focus: Field,
}

impl TaskForm {
    /// Empty create form dated today.
    pub fn for_create(date: DatePicker) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date,
            status: Some(TaskStatus::NotStarted),
            focus: Field::Title,
        }
    }

    /// Edit form prefilled from `task`.
    pub fn for_edit(task: &Task, current_year: i32) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            date: DatePicker::new(task.due_date, current_year),
            status: None,
            focus: Field::Title,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        if self.status.is_some() {
            &CREATE_FIELDS
        } else {
            &EDIT_FIELDS
        }
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: isize) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let next = (pos + delta).rem_euclid(fields.len() as isize) as usize;
        self.focus = fields[next];
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Title => Some(&mut self.title),
            Field::Description => Some(&mut self.description),
            _ => None,
        }
    }

    /// Typing only reaches the text inputs.
    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Steps the focused selector by `delta` options.
    pub fn adjust(&mut self, delta: i32) {
        match self.focus {
            Field::Year => self.date.step_year(delta),
            Field::Month => self.date.step_month(delta),
            Field::Day => self.date.step_day(delta),
            Field::Status => {
                if let Some(status) = self.status {
                    self.status = Some(if delta >= 0 {
                        status.next()
                    } else {
                        status.previous()
                    });
                }
            }
            Field::Title | Field::Description => {}
        }
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        if self.status.is_some() {
            self.status = Some(status);
        }
    }

    /// POST body. Nothing is validated beyond what the selectors allow.
    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.date.date(),
            status: self.status.unwrap_or_default(),
        }
    }

    /// PUT body replacing title, description and due date.
    pub fn to_update(&self) -> TaskUpdate {
        TaskUpdate::details(self.title.clone(), self.description.clone(), self.date.date())
    }

    /// Current value of `field` as shown in the form.
    pub fn display(&self, field: Field) -> String {
        match field {
            Field::Title => self.title.clone(),
            Field::Description => self.description.clone(),
            Field::Year => self.date.year_label(),
            Field::Month => self.date.month_label(),
            Field::Day => self.date.day_label(),
            Field::Status => self.status.unwrap_or_default().to_string(),
        }
    }
}

/// Year the pickers' window starts at.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskId;
    use chrono::NaiveDate;

    fn task() -> Task {
        Task {
            id: TaskId::from(7),
            title: "Pay rent".into(),
            description: None,
            due_date: NaiveDate::from_ymd_opt(2027, 1, 31).unwrap(),
            status: TaskStatus::OnHold,
        }
    }

    #[test]
    fn edit_form_is_prefilled_from_task() {
        let form = TaskForm::for_edit(&task(), 2026);
        assert_eq!(form.title, "Pay rent");
        assert_eq!(form.description, "");
        assert_eq!(form.date.compose(), "2027-01-31");
        assert_eq!(form.fields().len(), 5);
        assert!(!form.fields().contains(&Field::Status));
    }

    #[test]
    fn typing_goes_to_focused_text_input_only() {
        let mut form = TaskForm::for_edit(&task(), 2026);
        form.insert_char('!');
        form.focus_next();
        form.insert_char('x');
        form.focus_next();
        form.insert_char('9');
        assert_eq!(form.title, "Pay rent!");
        assert_eq!(form.description, "x");
        assert_eq!(form.date.year(), 2027);
        form.focus_previous();
        form.backspace();
        assert_eq!(form.description, "");
    }

    #[test]
    fn adjusting_month_clamps_day() {
        let mut form = TaskForm::for_edit(&task(), 2026);
        form.focus_next();
        form.focus_next();
        form.focus_next();
        assert_eq!(form.focus(), Field::Month);
        form.adjust(1);
        assert_eq!(form.date.compose(), "2027-02-28");
    }

    #[test]
    fn create_form_builds_post_body() {
        let date = DatePicker::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), 2025);
        let mut form = TaskForm::for_create(date);
        form.insert_char('A');
        form.focus_previous();
        assert_eq!(form.focus(), Field::Status);
        form.adjust(1);
        let body = form.to_new_task();
        assert_eq!(body.title, "A");
        assert_eq!(body.description, "");
        assert_eq!(body.due_date.to_string(), "2025-03-01");
        assert_eq!(body.status, TaskStatus::InProgress);
    }
}
