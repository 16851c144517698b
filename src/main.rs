use anyhow::Context;
use chrono::{Days, Local};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{self, BufRead, Write},
    sync::Arc,
};
use taskboard::{
    cli::{self, Cli, Command},
    logging, ui, HttpTaskApi, InMemoryTaskApi, Task, TaskApi, TaskBoard, TaskId,
    TaskStatus,
};
use tokio::runtime::Runtime;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    let runtime = Runtime::new().context("starting tokio runtime")?;

    match cli.command.unwrap_or(Command::Board { demo: false }) {
        Command::Board { demo } => {
            logging::init_file(&config.log_file)?;
            let api: Arc<dyn TaskApi> = if demo {
                tracing::info!("Starting board on the in-memory demo backend");
                Arc::new(InMemoryTaskApi::new(demo_tasks()))
            } else {
                tracing::info!(api_url = %config.base_url(), "Starting board");
                Arc::new(HttpTaskApi::new(config)?)
            };
            run_board(api, &runtime)
        }
        command => {
            logging::init_stderr()?;
            let api = HttpTaskApi::new(config)?;
            let mut stdout = io::stdout();
            runtime.block_on(cli::run(command, &api, &mut stdout, confirm))
        }
    }
}

fn run_board(api: Arc<dyn TaskApi>, runtime: &Runtime) -> anyhow::Result<()> {
    let (mut board, mut events) = TaskBoard::new(api, runtime.handle().clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut board, &mut events);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "Board exited with an error");
    }
    Ok(result?)
}

/// Asks on stdin; anything but `y`/`yes` declines.
fn confirm(message: &str) -> io::Result<bool> {
    print!("{message} [y/N] ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn demo_tasks() -> Vec<Task> {
    let today = Local::now().date_naive();
    let in_days = |n| today.checked_add_days(Days::new(n)).unwrap_or(today);
    vec![
        Task {
            id: TaskId::from(1),
            title: "Water the plants".into(),
            description: None,
            due_date: in_days(1),
            status: TaskStatus::NotStarted,
        },
        Task {
            id: TaskId::from(2),
            title: "Quarterly report".into(),
            description: Some("numbers from finance first".into()),
            due_date: in_days(14),
            status: TaskStatus::InProgress,
        },
        Task {
            id: TaskId::from(3),
            title: "Book flights".into(),
            description: Some("waiting on dates".into()),
            due_date: in_days(40),
            status: TaskStatus::OnHold,
        },
    ]
}
