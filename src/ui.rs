use crate::board::{BoardEvent, Mode, NoticeLevel, RowState, TaskBoard};
use crate::form::TaskForm;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::{io, time::Duration};
use tokio::sync::mpsc::UnboundedReceiver;

const TICK: Duration = Duration::from_millis(100);

const BROWSE_HELP: &str =
    "↑/↓ select  ←/→ status  e edit  d delete  a add  r reload  q quit";
const FORM_HELP: &str = "Tab next field  ↑/↓ change  Enter save  Esc cancel";
const CREATE_HELP: &str = "Tab next field  ↑/↓ change  Enter create  Esc close";

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    board: &mut TaskBoard,
    events: &mut UnboundedReceiver<BoardEvent>,
) -> io::Result<()> {
    board.reload();
    loop {
        while let Ok(event) = events.try_recv() {
            board.handle(event);
        }

        terminal.draw(|f| draw(f, board))?;

        if !event::poll(TICK)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && handle_key(board, key) {
                return Ok(());
            }
        }
    }
}

/// Routes a key press to the board. Returns `true` when the user quits.
pub fn handle_key(board: &mut TaskBoard, key: KeyEvent) -> bool {
    match board.mode().clone() {
        Mode::ConfirmDelete { .. } => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    board.resolve_delete(true)
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    board.resolve_delete(false)
                }
                _ => {}
            }
            false
        }
        Mode::Create => {
            match key.code {
                KeyCode::Esc => board.close_create(),
                KeyCode::Enter => board.submit_create(),
                _ => edit_form_key(board.create_form_mut(), key.code),
            }
            false
        }
        Mode::Browse if board.is_editing() => {
            match key.code {
                KeyCode::Esc => board.cancel_edit(),
                KeyCode::Enter => board.save_edit(),
                _ => {
                    if let Some(form) = board.edit_form_mut() {
                        edit_form_key(form, key.code);
                    }
                }
            }
            false
        }
        Mode::Browse => {
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Up | KeyCode::Char('k') => board.select_previous(),
                KeyCode::Down | KeyCode::Char('j') => board.select_next(),
                KeyCode::Right | KeyCode::Char('s') => board.cycle_status(true),
                KeyCode::Left | KeyCode::Char('S') => board.cycle_status(false),
                KeyCode::Char('e') | KeyCode::Enter => board.begin_edit(),
                KeyCode::Char('d') | KeyCode::Delete => board.request_delete(),
                KeyCode::Char('a') => board.open_create(),
                KeyCode::Char('r') => board.reload(),
                KeyCode::Esc => board.dismiss_notice(),
                _ => {}
            }
            false
        }
    }
}

fn edit_form_key(form: &mut TaskForm, code: KeyCode) {
    match code {
        KeyCode::Tab => form.focus_next(),
        KeyCode::BackTab => form.focus_previous(),
        KeyCode::Up => form.adjust(1),
        KeyCode::Down => form.adjust(-1),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
}

pub fn draw(f: &mut Frame, board: &TaskBoard) {
    let create_height = if *board.mode() == Mode::Create { 4 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(3),
            Constraint::Length(create_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_task_list(f, board, chunks[0]);
    if *board.mode() == Mode::Create {
        draw_form(f, board.create_form(), "New task", chunks[1]);
    }
    draw_notice(f, board, chunks[2]);

    let help = match board.mode() {
        Mode::Create => CREATE_HELP,
        Mode::Browse if board.is_editing() => FORM_HELP,
        _ => BROWSE_HELP,
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    if let Mode::ConfirmDelete { title, .. } = board.mode() {
        draw_confirm(f, title);
    }
}

fn draw_task_list(f: &mut Frame, board: &TaskBoard, area: Rect) {
    let items: Vec<ListItem> = board
        .tasks()
        .iter()
        .enumerate()
        .map(|(i, t)| match (board.row_state(i), board.edit_form()) {
            (RowState::Editing, Some(form)) => ListItem::new(form_line(form)),
            _ => ListItem::new(Line::from(vec![
                Span::styled(&t.title, Style::default().fg(Color::White)),
                Span::raw(" | "),
                Span::raw(t.display_description()),
                Span::raw(format!(" | Due: {}", t.due_date)),
                Span::raw(" | "),
                Span::styled(
                    format!("◂ {} ▸", t.status),
                    Style::default().fg(status_color(t.status)),
                ),
            ])),
        })
        .collect();

    let title = if board.is_loading() {
        "Tasks (loading…)".to_string()
    } else {
        format!("Tasks ({})", board.tasks().len())
    };
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if !board.tasks().is_empty() {
        state.select(Some(board.selected()));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn status_color(status: crate::task::TaskStatus) -> Color {
    use crate::task::TaskStatus::*;
    match status {
        NotStarted => Color::Gray,
        InProgress => Color::Yellow,
        Completed => Color::Green,
        OnHold => Color::Magenta,
    }
}

/// One span per field; the focused one is highlighted.
fn form_line(form: &TaskForm) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, field) in form.fields().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let value = form.display(*field);
        let focused = form.focus() == *field;
        let text = if focused && field.is_text() {
            format!("[{}: {}_]", field.label(), value)
        } else {
            format!("[{}: {}]", field.label(), value)
        };
        let style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        };
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn draw_form(f: &mut Frame, form: &TaskForm, title: &str, area: Rect) {
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(form_line(form)).block(block), area);
}

fn draw_notice(f: &mut Frame, board: &TaskBoard, area: Rect) {
    if let Some(notice) = board.notice() {
        let color = match notice.level {
            NoticeLevel::Info => Color::Green,
            NoticeLevel::Error => Color::Red,
        };
        f.render_widget(
            Paragraph::new(notice.text.as_str()).style(Style::default().fg(color)),
            area,
        );
    }
}

fn draw_confirm(f: &mut Frame, title: &str) {
    let area = centered(f.area(), 50, 5);
    let text = vec![
        Line::from("Are you sure you want to delete this task?"),
        Line::from(Span::styled(
            title.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("y: delete   n: keep"),
    ];
    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .title("Delete")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        ),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{InMemoryTaskApi, RecordedRequest};
    use crate::date_picker::DatePicker;
    use crate::task::{Task, TaskId, TaskStatus};
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use tokio::runtime::Handle;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn loaded_board() -> (Arc<InMemoryTaskApi>, TaskBoard, UnboundedReceiver<BoardEvent>) {
        let api = Arc::new(InMemoryTaskApi::new(vec![Task {
            id: TaskId::from(1),
            title: "Water plants".into(),
            description: Some(String::new()),
            due_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            status: TaskStatus::NotStarted,
        }]));
        let (mut board, mut rx) = TaskBoard::with_picker(
            api.clone(),
            Handle::current(),
            DatePicker::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), 2026),
            2026,
        );
        board.reload();
        board.handle(rx.recv().await.unwrap());
        (api, board, rx)
    }

    fn screen(board: &TaskBoard) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|f| draw(f, board)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[tokio::test]
    async fn renders_rows_with_placeholder_description() {
        let (_api, board, _rx) = loaded_board().await;
        let screen = screen(&board);
        assert!(screen.contains("Water plants | No description | Due: 2026-10-20"));
        assert!(screen.contains("Not Started"));
    }

    #[tokio::test]
    async fn edit_row_shows_inputs() {
        let (_api, mut board, _rx) = loaded_board().await;
        assert!(!handle_key(&mut board, key(KeyCode::Char('e'))));
        let screen = screen(&board);
        assert!(screen.contains("[Title: Water plants_]"));
        assert!(screen.contains("[Month: 10/12]"));
        assert!(screen.contains("[Year: 2026 (1/6)]"));
        assert!(screen.contains("[Day: 20/31]"));
    }

    #[tokio::test]
    async fn delete_prompt_declined_with_n() {
        let (api, mut board, _rx) = loaded_board().await;
        handle_key(&mut board, key(KeyCode::Char('d')));
        assert!(screen(&board).contains("Are you sure"));
        handle_key(&mut board, key(KeyCode::Char('n')));
        assert_eq!(board.mode(), &Mode::Browse);
        assert_eq!(api.requests(), vec![RecordedRequest::List]);
    }

    #[tokio::test]
    async fn q_quits_only_when_browsing() {
        let (_api, mut board, _rx) = loaded_board().await;
        handle_key(&mut board, key(KeyCode::Char('a')));
        assert!(!handle_key(&mut board, key(KeyCode::Char('q'))));
        assert_eq!(board.create_form().title, "q");
        handle_key(&mut board, key(KeyCode::Esc));
        assert!(handle_key(&mut board, key(KeyCode::Char('q'))));
    }
}
