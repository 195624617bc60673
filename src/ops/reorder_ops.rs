use crate::model::store::TaskStore;
use crate::model::task::{Direction, OrderChange, Task};

/// A reorder request that can't be honored. Always a no-op for the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("cannot move {moved} next to {target}: they have different parents")]
    CrossParent { moved: String, target: String },
    #[error("cannot move {0} onto itself")]
    SameTask(String),
    #[error("cannot move {id} {direction}: already at the edge of its group")]
    AtEdge { id: String, direction: Direction },
}

// ---------------------------------------------------------------------------
// Pure reorder
// ---------------------------------------------------------------------------

/// Recompute a sibling group's order after moving `moved_id` to `target_id`'s slot.
///
/// `siblings` is the group in current display order. The moved task is removed
/// and reinserted at the target's index, so moving down lands after the target
/// and moving up lands before it. The group is then numbered 1..N and only the
/// entries whose value differs from their current `display_order` are returned,
/// listed in the group's pre-move order.
pub fn reorder(
    siblings: &[&Task],
    moved_id: &str,
    target_id: &str,
) -> Result<Vec<OrderChange>, MoveError> {
    if moved_id == target_id {
        return Err(MoveError::SameTask(moved_id.to_string()));
    }
    let from = position(siblings, moved_id)?;
    let to = position(siblings, target_id)?;

    let mut sequence: Vec<&Task> = siblings.to_vec();
    let moved = sequence.remove(from);
    sequence.insert(to, moved);

    let changes = siblings
        .iter()
        .filter_map(|task| {
            let slot = sequence.iter().position(|t| t.id == task.id)?;
            let new_order = slot as i64 + 1;
            (new_order != task.display_order).then(|| OrderChange::new(task.id.clone(), new_order))
        })
        .collect();
    Ok(changes)
}

fn position(siblings: &[&Task], id: &str) -> Result<usize, MoveError> {
    siblings
        .iter()
        .position(|t| t.id == id)
        .ok_or_else(|| MoveError::NotFound(id.to_string()))
}

// ---------------------------------------------------------------------------
// Store moves
// ---------------------------------------------------------------------------

/// Drop `moved_id` at `target_id`'s position. Both must share a parent.
/// Applies the result to the store and returns the changed entries.
pub fn drop_onto(
    store: &mut TaskStore,
    moved_id: &str,
    target_id: &str,
) -> Result<Vec<OrderChange>, MoveError> {
    let moved = store
        .get(moved_id)
        .ok_or_else(|| MoveError::NotFound(moved_id.to_string()))?;
    let target = store
        .get(target_id)
        .ok_or_else(|| MoveError::NotFound(target_id.to_string()))?;
    if !moved.is_sibling_of(target) {
        return Err(MoveError::CrossParent {
            moved: moved_id.to_string(),
            target: target_id.to_string(),
        });
    }

    let changes = reorder(&store.siblings(moved.parent()), moved_id, target_id)?;
    apply_to_store(store, &changes);
    Ok(changes)
}

/// Move a task one step within its sibling group.
///
/// Swaps `display_order` with the immediate neighbour and returns exactly the
/// two changed entries, the moved task first. Gaps in the group are kept. When
/// the neighbour holds the same value a swap changes nothing, so the group is
/// renumbered 1..N instead. First-up and last-down are rejected.
pub fn move_step(
    store: &mut TaskStore,
    id: &str,
    direction: Direction,
) -> Result<Vec<OrderChange>, MoveError> {
    let task = store
        .get(id)
        .ok_or_else(|| MoveError::NotFound(id.to_string()))?;
    let siblings = store.siblings(task.parent());
    let idx = position(&siblings, id)?;

    let neighbour = match direction {
        Direction::Up if idx > 0 => siblings[idx - 1],
        Direction::Down if idx + 1 < siblings.len() => siblings[idx + 1],
        _ => {
            return Err(MoveError::AtEdge {
                id: id.to_string(),
                direction,
            });
        }
    };

    let changes = if neighbour.display_order == task.display_order {
        reorder(&siblings, id, &neighbour.id)?
    } else {
        vec![
            OrderChange::new(id, neighbour.display_order),
            OrderChange::new(neighbour.id.clone(), task.display_order),
        ]
    };
    apply_to_store(store, &changes);
    Ok(changes)
}

fn apply_to_store(store: &mut TaskStore, changes: &[OrderChange]) {
    for change in changes {
        store.set_display_order(&change.id, change.new_order);
    }
}

// ---------------------------------------------------------------------------
// Host side
// ---------------------------------------------------------------------------

/// Apply an order-change payload to a flat list, as the host does before
/// echoing the list back. Unknown IDs are skipped. Returns how many tasks changed.
pub fn apply_order_changes(tasks: &mut [Task], changes: &[OrderChange]) -> usize {
    let mut applied = 0;
    for change in changes {
        if let Some(task) = tasks.iter_mut().find(|t| t.id == change.id) {
            task.display_order = change.new_order;
            applied += 1;
        }
    }
    applied
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
