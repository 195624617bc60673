use indexmap::IndexSet;

use crate::model::task::{OrderChange, Task};

/// Serialize a task list as a pretty JSON array, in store order.
pub fn serialize_tasks(tasks: &[Task]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(tasks)?;
    out.push('\n');
    Ok(out)
}

/// Outbound selection payload: a JSON array of IDs, or None when nothing is selected.
pub fn serialize_selected(selected: &IndexSet<String>) -> Option<String> {
    if selected.is_empty() {
        return None;
    }
    serde_json::to_string(selected).ok()
}

/// Outbound order-change payload: a JSON array of `{id, newOrder}`, or None when empty.
pub fn serialize_order_changes(changes: &[OrderChange]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }
    serde_json::to_string(changes).ok()
}
