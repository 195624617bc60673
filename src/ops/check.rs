use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::store::sibling_index;
use crate::model::task::Task;
use crate::parse::{Loaded, ValidationError};

/// Structured result from `tt check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<CheckWarning>,
}

/// Something that loads but renders or reorders unexpectedly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckWarning {
    /// Parent ID names a task that isn't in the list; shown as an extra root
    Orphan { id: String, parent_id: String },
    /// Task is its own ancestor
    Cycle { id: String },
    /// Siblings share a display order; ties fall back to list order
    DuplicateOrder {
        parent_id: Option<String>,
        order: i64,
        ids: Vec<String>,
    },
    /// Sibling orders aren't exactly 1..N; the next reorder renumbers them
    NonContiguous {
        parent_id: Option<String>,
        orders: Vec<i64>,
    },
}

// ---------------------------------------------------------------------------
// Main check entry point
// ---------------------------------------------------------------------------

/// Check a loaded task list. Read-only.
///
/// Dropped records are errors. Orphans, parent cycles, tied orders and
/// gapped groups are warnings.
pub fn check_tasks(loaded: &Loaded) -> CheckResult {
    let mut result = CheckResult {
        errors: loaded.dropped.clone(),
        ..Default::default()
    };

    let ids: HashSet<&str> = loaded.tasks.iter().map(|t| t.id.as_str()).collect();
    for task in &loaded.tasks {
        if let Some(parent) = task.parent()
            && !ids.contains(parent)
        {
            result.warnings.push(CheckWarning::Orphan {
                id: task.id.clone(),
                parent_id: parent.to_string(),
            });
        }
    }

    let parents: HashMap<&str, &str> = loaded
        .tasks
        .iter()
        .filter_map(|t| t.parent().map(|p| (t.id.as_str(), p)))
        .collect();
    for task in &loaded.tasks {
        if in_cycle(&parents, &task.id) {
            result.warnings.push(CheckWarning::Cycle {
                id: task.id.clone(),
            });
        }
    }

    check_groups(&loaded.tasks, &mut result.warnings);

    result.valid = result.errors.is_empty();
    result
}

/// Whether following parent links from `id` leads back to `id`.
fn in_cycle(parents: &HashMap<&str, &str>, id: &str) -> bool {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = id;
    while let Some(&parent) = parents.get(current) {
        if parent == id {
            return true;
        }
        if !seen.insert(parent) {
            // Loop above us that doesn't include `id`
            return false;
        }
        current = parent;
    }
    false
}

fn check_groups(tasks: &[Task], warnings: &mut Vec<CheckWarning>) {
    let index = sibling_index(tasks);
    // Walk groups in first-seen parent order so output is stable
    let mut seen: HashSet<Option<&str>> = HashSet::new();
    for task in tasks {
        let parent = task.parent();
        if !seen.insert(parent) {
            continue;
        }
        let Some(group) = index.get(&parent) else {
            continue;
        };
        let parent_id = parent.map(str::to_string);

        // Groups are sorted, so ties sit next to each other
        for run in group.chunk_by(|a, b| a.display_order == b.display_order) {
            if run.len() > 1 {
                warnings.push(CheckWarning::DuplicateOrder {
                    parent_id: parent_id.clone(),
                    order: run[0].display_order,
                    ids: run.iter().map(|t| t.id.clone()).collect(),
                });
            }
        }

        let orders: Vec<i64> = group.iter().map(|t| t.display_order).collect();
        let contiguous = orders
            .iter()
            .enumerate()
            .all(|(i, &order)| order == i as i64 + 1);
        if !contiguous {
            warnings.push(CheckWarning::NonContiguous { parent_id, orders });
        }
    }
}
