//! Line-oriented interactive host.
//!
//! The session plays the host's part: it renders the table, prints the
//! outbound payloads when the engine asks for a notification, applies
//! reorders to the task file, and feeds the file back in whenever it changes
//! on disk. Its own writes come back through the watcher as echoes.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use crate::cli::commands::SessionArgs;
use crate::cli::output::{format_change, format_table};
use crate::io::watcher::TaskFileWatcher;
use crate::io::{config_io, task_io};
use crate::model::config::RenderConfig;
use crate::model::task::Direction;
use crate::ops::{Effect, Event, State, update};

const TICK: Duration = Duration::from_millis(250);

const HELP: &str = "\
commands:
  toggle ID       select/deselect a task and its subtree
  expand ID       expand/collapse a task
  all             toggle select all
  expand-all      expand every task
  collapse-all    collapse every task
  up ID           move a task up among its siblings
  down ID         move a task down among its siblings
  drop ID TARGET  drop a task at a sibling's position
  show            print the table
  outputs         print the outbound payloads
  reload          re-read the task file
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Toggle(String),
    Expand(String),
    SelectAll,
    ExpandAll,
    CollapseAll,
    Move { id: String, direction: Direction },
    Drop { moved: String, target: String },
    Show,
    Outputs,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("{command} needs {arg}")]
    MissingArg {
        command: &'static str,
        arg: &'static str,
    },
}

/// Parse one input line. Blank lines parse to None.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let mut next_arg = |command: &'static str, arg: &'static str| {
        words
            .next()
            .map(str::to_string)
            .ok_or(CommandError::MissingArg { command, arg })
    };

    let cmd = match word {
        "toggle" | "t" => SessionCommand::Toggle(next_arg("toggle", "an ID")?),
        "expand" | "e" => SessionCommand::Expand(next_arg("expand", "an ID")?),
        "all" | "a" => SessionCommand::SelectAll,
        "expand-all" => SessionCommand::ExpandAll,
        "collapse-all" => SessionCommand::CollapseAll,
        "up" => SessionCommand::Move {
            id: next_arg("up", "an ID")?,
            direction: Direction::Up,
        },
        "down" => SessionCommand::Move {
            id: next_arg("down", "an ID")?,
            direction: Direction::Down,
        },
        "drop" => {
            let moved = next_arg("drop", "an ID and a target")?;
            let target = next_arg("drop", "an ID and a target")?;
            SessionCommand::Drop { moved, target }
        }
        "show" | "s" => SessionCommand::Show,
        "outputs" | "o" => SessionCommand::Outputs,
        "reload" | "r" => SessionCommand::Reload,
        "help" | "?" => SessionCommand::Help,
        "quit" | "q" | "exit" => SessionCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(cmd))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    file: PathBuf,
    state: State,
    render: RenderConfig,
}

impl Session {
    pub fn new(file: &Path, state: State, render: RenderConfig) -> Self {
        Session {
            file: file.to_path_buf(),
            state,
            render,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    fn step(&mut self, event: Event) -> Effect {
        let (state, effect) = update(std::mem::take(&mut self.state), event);
        self.state = state;
        effect
    }

    /// Run one command. Returns false when the session should end.
    pub fn handle(&mut self, cmd: SessionCommand, out: &mut dyn Write) -> io::Result<bool> {
        let event = match cmd {
            SessionCommand::Quit => return Ok(false),
            SessionCommand::Help => {
                writeln!(out, "{}", HELP)?;
                return Ok(true);
            }
            SessionCommand::Show => {
                self.print_table(out)?;
                return Ok(true);
            }
            SessionCommand::Outputs => {
                self.print_outputs(out)?;
                return Ok(true);
            }
            SessionCommand::Reload => {
                self.reload(out)?;
                return Ok(true);
            }
            SessionCommand::Toggle(id) => Event::ToggleNode(id),
            SessionCommand::Expand(id) => Event::ToggleExpand(id),
            SessionCommand::SelectAll => Event::ToggleSelectAll,
            SessionCommand::ExpandAll => Event::ExpandAll,
            SessionCommand::CollapseAll => Event::CollapseAll,
            SessionCommand::Move { id, direction } => Event::Move { id, direction },
            SessionCommand::Drop { moved, target } => Event::Drop { moved, target },
        };

        let reorder = matches!(event, Event::Move { .. } | Event::Drop { .. });
        let effect = self.step(event);
        if effect == Effect::Notify {
            if reorder {
                self.host_apply_order(out)?;
            } else {
                self.print_selected(out)?;
            }
        } else if reorder {
            writeln!(out, "(not moved)")?;
        }
        self.print_table(out)?;
        Ok(true)
    }

    /// Re-read the task file and hand it to the engine.
    pub fn reload(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let raw = match task_io::read_payload(&self.file) {
            Ok(raw) => raw,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                return Ok(());
            }
        };
        if self.step(Event::Inbound(raw)) == Effect::Notify {
            self.print_selected(out)?;
        }
        Ok(())
    }

    /// Take the order-change payload and apply it to the task file, as a
    /// host does. The write comes back later as an echo.
    fn host_apply_order(&mut self, out: &mut dyn Write) -> io::Result<()> {
        let changes = self.state.take_order_changes();
        for change in &changes {
            writeln!(out, "order: {}", format_change(change))?;
        }
        match task_io::apply_changes_to_file(&self.file, &changes) {
            Ok(applied) => tracing::debug!(applied, "order changes written"),
            Err(e) => writeln!(out, "error: {}", e)?,
        }
        Ok(())
    }

    fn print_selected(&self, out: &mut dyn Write) -> io::Result<()> {
        match self.state.selected_output() {
            Some(payload) => writeln!(out, "selected: {}", payload),
            None => writeln!(out, "selected: (none)"),
        }
    }

    fn print_outputs(&self, out: &mut dyn Write) -> io::Result<()> {
        self.print_selected(out)?;
        let pending = self.state.pending_order();
        if pending.is_empty() {
            writeln!(out, "order: (none)")
        } else {
            for change in pending {
                writeln!(out, "order: {}", format_change(change))?;
            }
            Ok(())
        }
    }

    pub fn print_table(&self, out: &mut dyn Write) -> io::Result<()> {
        for line in format_table(&self.state, &self.render, self.render.expand_all) {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command handler
// ---------------------------------------------------------------------------

pub fn cmd_session(
    args: SessionArgs,
    config_flag: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_io::load_config(config_flag, &args.file)?;
    let raw = task_io::read_payload(&args.file)?;
    let state = State::new(raw.as_deref(), config.engine.reset_policy);
    let mut session = Session::new(&args.file, state, config.render);

    let watcher = if args.no_watch {
        None
    } else {
        Some(TaskFileWatcher::start(&args.file)?)
    };

    // Stdin blocks, so lines arrive over a channel and the loop can keep
    // polling the watcher in between.
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    let stdout = io::stdout();
    let mut out = stdout.lock();
    session.print_table(&mut out)?;

    loop {
        if let Some(w) = &watcher
            && w.poll()
        {
            tracing::debug!(file = %args.file.display(), "task file changed on disk");
            session.reload(&mut out)?;
        }

        match rx.recv_timeout(TICK) {
            Ok(line) => match parse_command(&line) {
                Ok(Some(cmd)) => {
                    if !session.handle(cmd, &mut out)? {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "{}", e)?,
            },
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        out.flush()?;
    }
    Ok(())
}
