mod session;
pub use session::{CommandError, Session, SessionCommand, cmd_session, parse_command};

use std::path::Path;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::{config_io, task_io};
use crate::model::config::Config;
use crate::model::store::TaskStore;
use crate::model::task::Direction;
use crate::ops::check;
use crate::ops::reorder_ops;
use crate::ops::{Event, State, update};
use crate::parse;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let config_flag = cli.config.as_deref();

    match cli.command {
        Commands::Tree(args) => cmd_tree(args, config_flag, json),
        Commands::Select(args) => cmd_select(args, config_flag, json),
        Commands::Mv(args) => cmd_mv(args, json),
        Commands::Check(args) => cmd_check(args, json),
        Commands::Session(args) => cmd_session(args, config_flag),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load config and task file into a fresh engine state.
fn open(file: &Path, config_flag: Option<&Path>) -> Result<(State, Config), Box<dyn std::error::Error>> {
    let config = config_io::load_config(config_flag, file)?;
    let raw = task_io::read_payload(file)?;
    let state = State::new(raw.as_deref(), config.engine.reset_policy);
    if let Some(err) = state.parse_error() {
        tracing::warn!(file = %file.display(), error = %err, "task file is not a valid task list");
    }
    Ok((state, config))
}

fn apply_all(mut state: State, events: impl IntoIterator<Item = Event>) -> State {
    for event in events {
        state = update(state, event).0;
    }
    state
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_tree(
    args: TreeArgs,
    config_flag: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (state, config) = open(&args.file, config_flag)?;
    let expand_all = args.expand_all || config.render.expand_all;

    let events = args
        .expand
        .into_iter()
        .map(Event::ToggleExpand)
        .chain(args.select.into_iter().map(Event::ToggleNode));
    let state = apply_all(state, events);

    if json {
        let tree = state.tree();
        println!("{}", serde_json::to_string_pretty(&tree_to_json(&state, &tree))?);
    } else {
        for line in format_table(&state, &config.render, expand_all) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_select(
    args: SelectArgs,
    config_flag: Option<&Path>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (state, _config) = open(&args.file, config_flag)?;
    let state = if args.all {
        apply_all(state, [Event::ToggleSelectAll])
    } else {
        apply_all(state, args.ids.into_iter().map(Event::ToggleNode))
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&select_to_json(&state))?);
    } else {
        println!("{}", format_select_all(state.select_all_state()));
        match state.selected_output() {
            Some(payload) => println!("{}", payload),
            None => println!("(nothing selected)"),
        }
    }
    Ok(())
}

fn cmd_check(args: CheckArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = task_io::read_payload(&args.file)?;
    let loaded = parse::load(raw.as_deref())?;
    let result = check::check_tasks(&loaded);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for line in format_check(&result) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_mv(args: MvArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let raw = task_io::read_payload(&args.file)?;
    let loaded = parse::load(raw.as_deref())?;
    let mut store = TaskStore::new(loaded.tasks);

    let result = match (args.onto.as_deref(), args.up, args.down) {
        (Some(target), _, _) => reorder_ops::drop_onto(&mut store, &args.id, target),
        (None, true, _) => reorder_ops::move_step(&mut store, &args.id, Direction::Up),
        (None, _, true) => reorder_ops::move_step(&mut store, &args.id, Direction::Down),
        (None, false, false) => return Err("one of --up, --down or --onto is required".into()),
    };
    // A rejected move is a no-op, not a failure
    let (changes, rejected) = match result {
        Ok(changes) => (changes, None),
        Err(e) => {
            tracing::debug!(error = %e, "move rejected");
            (Vec::new(), Some(e.to_string()))
        }
    };

    let written = args.write && !changes.is_empty();
    if written {
        task_io::apply_changes_to_file(&args.file, &changes)?;
    }

    if json {
        let out = MoveJson {
            changes: &changes,
            written,
            rejected,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if let Some(reason) = rejected {
        println!("(not moved) {}", reason);
    } else if changes.is_empty() {
        println!("(no changes)");
    } else {
        for change in &changes {
            println!("{}", format_change(change));
        }
        if written {
            println!("wrote {}", args.file.display());
        }
    }
    Ok(())
}
