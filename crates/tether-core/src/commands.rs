use anyhow::Context;
use tracing::{info, instrument};

use crate::cli::Command;
use crate::remote::TaskStore;
use crate::render::Renderer;
use crate::session::Session;

#[instrument(skip(session, renderer, command))]
pub async fn dispatch<S: TaskStore>(
    session: &mut Session<S>,
    renderer: &mut Renderer,
    command: Command,
) -> anyhow::Result<()> {
    session
        .load()
        .await
        .context("failed to load tasks from the remote store")?;

    match command {
        Command::List {
            page,
            search,
            from,
            to,
        } => cmd_list(session, renderer, page, search, from, to),
        Command::Add { title, description } => {
            cmd_add(session, renderer, &title, &description).await
        }
        Command::Done { id } => cmd_toggle(session, renderer, id, true).await,
        Command::Reopen { id } => cmd_toggle(session, renderer, id, false).await,
    }
}

#[instrument(skip(session, renderer, search))]
fn cmd_list<S: TaskStore>(
    session: &mut Session<S>,
    renderer: &mut Renderer,
    page: Option<usize>,
    search: Option<String>,
    from: Option<chrono::NaiveDate>,
    to: Option<chrono::NaiveDate>,
) -> anyhow::Result<()> {
    if let Some(query) = search {
        session.search(&query);
    } else if from.is_some() || to.is_some() {
        session.date_filter(from, to);
    } else if let Some(page) = page {
        session.set_page(page);
    }

    renderer.print_view(&session.view())
}

#[instrument(skip(session, renderer, title, description))]
async fn cmd_add<S: TaskStore>(
    session: &mut Session<S>,
    renderer: &mut Renderer,
    title: &str,
    description: &str,
) -> anyhow::Result<()> {
    let task = session
        .add(title, description)
        .await
        .context("failed to add task")?;

    info!(id = task.id, "task added");
    println!("Added task {}: {}", task.id, task.text);
    renderer.print_view(&session.view())
}

#[instrument(skip(session, renderer))]
async fn cmd_toggle<S: TaskStore>(
    session: &mut Session<S>,
    renderer: &mut Renderer,
    id: u64,
    completed: bool,
) -> anyhow::Result<()> {
    session
        .set_completed(id, completed)
        .await
        .with_context(|| format!("failed to update task {id}"))?;

    let verb = if completed { "Completed" } else { "Reopened" };
    println!("{verb} task {id}");
    renderer.print_view(&session.view())
}
