//! coi: review the commits of interest between a base revision and HEAD.
//!
//! A commit is "of interest" when at least one of its changed paths lies
//! outside the filtered components (tests, fixtures, lock files, ...).
//!
//! # Startup sequence
//!
//! 1. Parse arguments, start file logging, load the config file.
//! 2. Open the repository and resolve the base revision. Failures here exit
//!    with a one-line diagnostic before the terminal is touched.
//! 3. `install_panic_hook()`, then `register_sigterm()`, then `init_tui()`.
//! 4. Spawn the event task and the git worker thread, and ask the worker to
//!    materialize the commits of interest.
//!
//! The event loop exits only via `break`, so `restore_tui()` is always reached;
//! draw errors are captured and reported after the terminal is restored.

mod app;
mod config;
mod event;
mod git;
mod logging;
mod session;
mod theme;
mod tui;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use coi_core::changelog::{format_proposed_changelog, GithubRemote};
use coi_core::{CommitsOfInterest, FilterSet, Order, VcsQuery};
use crossbeam_channel::Sender;

use crate::app::App;
use crate::config::{Config, OrderArg};
use crate::event::{AppEvent, EventHandler};
use crate::git::repo::GitRepo;
use crate::git::types::GitRequest;
use crate::git::worker::git_worker_loop;
use crate::session::{Command, Effect};
use crate::theme::{Theme, THEME_NAMES};
use crate::ui::keybindings::{map_key, map_mouse};

/// Written next to the repository root when the user presses `s`.
const CHANGELOG_FILE: &str = "proposed_changelog.md";

/// Review the commits between a base revision and HEAD that touch more than
/// tests, fixtures and other filtered paths.
#[derive(Parser, Debug)]
#[command(name = "coi", version)]
struct Args {
    /// Base revision (exclusive). Defaults to the most recent tag.
    revision: Option<String>,

    /// Any path inside the repository to review
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Enumeration order of the commit list
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Color theme (dark, catppuccin-mocha)
    #[arg(long)]
    theme: Option<String>,

    /// Skip the pull-request lookup through the GitHub CLI
    #[arg(long)]
    no_pull_requests: bool,
}

/// Everything the interactive session needs, resolved before the terminal
/// is initialised.
struct Prepared {
    root: PathBuf,
    base: String,
    order: Order,
    filters: FilterSet,
    theme: Theme,
    warnings: Vec<String>,
    remote: Option<GithubRemote>,
    lookup_pull_requests: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "exiting with failure");
            eprintln!("coi: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let prepared = prepare(args)?;
    tracing::info!(
        base = %prepared.base,
        order = ?prepared.order,
        filters = prepared.filters.len(),
        "starting review"
    );

    let mut app = App::new(prepared.base.clone(), prepared.warnings);
    run_session(
        &mut app,
        &prepared.theme,
        prepared.root.clone(),
        GitRequest::Materialize {
            base: prepared.base,
            order: prepared.order,
            filters: prepared.filters,
            pull_requests: prepared
                .remote
                .clone()
                .filter(|_| prepared.lookup_pull_requests),
        },
    )
    .await?;

    if let Some(err) = app.fatal.take() {
        return Err(err).context("could not build the commits of interest");
    }
    if app.wants_changelog() {
        if let Some(session) = app.session() {
            let remote = prepared.remote.as_ref();
            let path = write_changelog(&prepared.root, session.commits(), remote)?;
            println!("Proposed changelog written to {}", path.display());
        }
    }
    Ok(())
}

/// Resolves configuration, repository and base revision.
fn prepare(args: Args) -> anyhow::Result<Prepared> {
    let config_file = config::config_path();
    let (config, config_warning) = Config::load(&config_file);
    let mut config_warnings: Vec<_> = config_warning.into_iter().collect();

    let repo = GitRepo::open(&args.repo)?;
    let base = match args.revision {
        Some(revision) => revision,
        None => {
            let tag = repo.most_recent_tag()?;
            eprintln!("No revision specified; using most recent tag: {tag}");
            tag
        }
    };
    repo.resolve_revision(&base)?;

    let (filters, filter_warnings) = config.filter_set(&config_file, repo.root());
    config_warnings.extend(filter_warnings);
    let mut warnings: Vec<String> = config_warnings
        .iter()
        .map(|warning| {
            tracing::warn!(%warning, "configuration");
            warning.to_string()
        })
        .collect();

    let theme = match args.theme.or(config.theme) {
        None => Theme::default(),
        Some(name) => Theme::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(theme = %name, "unknown theme");
            warnings.push(format!(
                "unknown theme '{name}', using 'dark' (known: {})",
                THEME_NAMES.join(", ")
            ));
            Theme::dark()
        }),
    };

    let remote = repo.origin_url().as_deref().and_then(GithubRemote::parse);

    Ok(Prepared {
        root: repo.root().to_path_buf(),
        base,
        order: args.order.or(config.order).map(Order::from).unwrap_or_default(),
        filters,
        theme,
        warnings,
        remote,
        lookup_pull_requests: config.pull_requests && !args.no_pull_requests,
    })
}

/// Runs the interactive loop until the user quits, SIGTERM arrives, or
/// building the list fails.
async fn run_session(
    app: &mut App,
    theme: &Theme,
    root: PathBuf,
    materialize: GitRequest,
) -> anyhow::Result<()> {
    // Panic hook first so it is the innermost hook.
    tui::install_panic_hook();
    let term_flag = tui::register_sigterm().context("cannot register SIGTERM handler")?;
    let mut terminal = match tui::init_tui() {
        Ok(terminal) => terminal,
        Err(err) => {
            // Raw mode may already be on.
            let _ = tui::restore_tui();
            return Err(coi_core::Error::RenderSurface(err).into());
        }
    };

    let handler = EventHandler::new();
    event::spawn_event_task(handler.tx.clone());
    let mut rx = handler.rx;

    let cancel = Arc::new(AtomicBool::new(false));
    let (git_tx, git_rx) = crossbeam_channel::unbounded();
    let worker = {
        let event_tx = handler.tx.clone();
        let cancel = Arc::clone(&cancel);
        std::thread::spawn(move || git_worker_loop(root, git_rx, event_tx, cancel))
    };
    let _ = git_tx.send(materialize);

    let mut surface_error: Option<io::Error> = None;
    'event_loop: loop {
        tokio::select! {
            // Heartbeat: SIGTERM is checked at least every 50ms even when no
            // other event arrives.
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                if term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
            maybe_event = rx.recv() => {
                let Some(event) = maybe_event else {
                    break 'event_loop;
                };
                match event {
                    AppEvent::Render => {
                        // Exactly one draw() call per Render event.
                        if let Err(err) = terminal.draw(|frame| ui::render(frame, app, theme)) {
                            surface_error = Some(err);
                            break 'event_loop;
                        }
                    }
                    AppEvent::Key(key) => {
                        if let Some(command) = map_key(key) {
                            dispatch(app, command, &git_tx);
                        }
                    }
                    AppEvent::Mouse(mouse) => {
                        if let Some(command) = map_mouse(mouse) {
                            dispatch(app, command, &git_tx);
                        }
                    }
                    AppEvent::Git(git_event) => app.apply_git_event(*git_event),
                    AppEvent::Tick => app.tick(),
                    // The next Render picks up the new size from frame.area().
                    AppEvent::Resize(_, _) => {}
                }
                if app.should_quit() || term_flag.load(Ordering::Relaxed) {
                    break 'event_loop;
                }
            }
        }
    }

    // In-flight work stops at its next commit or path boundary.
    cancel.store(true, Ordering::Relaxed);
    drop(git_tx);
    let restored = tui::restore_tui();
    if worker.join().is_err() {
        tracing::error!("git worker panicked");
    }

    restored.map_err(coi_core::Error::RenderSurface)?;
    if let Some(err) = surface_error {
        return Err(coi_core::Error::RenderSurface(err).into());
    }
    Ok(())
}

/// Applies a command and forwards any diff fetches to the git worker.
fn dispatch(app: &mut App, command: Command, git_tx: &Sender<GitRequest>) {
    if let Effect::Fetch(indices) = app.handle_command(command) {
        for request in app.diff_requests(&indices) {
            if git_tx.send(request).is_err() {
                tracing::warn!("git worker is gone; diff request dropped");
            }
        }
    }
}

/// Writes the proposed changelog into `root`, refusing to overwrite.
fn write_changelog(
    root: &Path,
    list: &CommitsOfInterest,
    remote: Option<&GithubRemote>,
) -> anyhow::Result<PathBuf> {
    let commits = list.commits();
    let path = root.join(CHANGELOG_FILE);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            anyhow::bail!("{} already exists; not overwriting it", path.display());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("cannot create {}", path.display()));
        }
    };
    file.write_all(format_proposed_changelog(commits, list.pull_requests(), remote).as_bytes())
        .with_context(|| format!("cannot write {}", path.display()))?;
    tracing::info!(path = %path.display(), commits = commits.len(), "proposed changelog written");
    Ok(path)
}
