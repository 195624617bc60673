use serde::Serialize;

use crate::model::config::RenderConfig;
use crate::model::task::{OrderChange, TreeNode};
use crate::model::view::SelectAllState;
use crate::ops::State;
use crate::ops::check::{CheckResult, CheckWarning};
use crate::ops::tree_ops::{Row, visible_rows};
use crate::util::unicode::{single_line, truncate_to_width};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TreeJson<'a> {
    pub select_all: SelectAllState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    pub selected: Vec<&'a str>,
    pub expanded: Vec<&'a str>,
    pub roots: &'a [TreeNode],
}

#[derive(Serialize)]
pub struct SelectJson {
    pub select_all: SelectAllState,
    pub label: &'static str,
    pub selected: Vec<String>,
}

#[derive(Serialize)]
pub struct MoveJson<'a> {
    pub changes: &'a [OrderChange],
    pub written: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn tree_to_json<'a>(state: &'a State, roots: &'a [TreeNode]) -> TreeJson<'a> {
    TreeJson {
        select_all: state.select_all_state(),
        parse_error: state.parse_error().map(|e| e.to_string()),
        selected: state.view().selected.iter().map(|s| s.as_str()).collect(),
        expanded: state.view().expanded.iter().map(|s| s.as_str()).collect(),
        roots,
    }
}

pub fn select_to_json(state: &State) -> SelectJson {
    let select_all = state.select_all_state();
    SelectJson {
        select_all,
        label: select_all.label(),
        selected: state.view().selected.iter().cloned().collect(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn checkbox(selected: bool) -> &'static str {
    if selected { "[x]" } else { "[ ]" }
}

fn expander(row: &Row) -> char {
    if !row.node.has_children() {
        ' '
    } else if row.expanded {
        '▾'
    } else {
        '▸'
    }
}

/// Format one visible row: indent, expander, checkbox, ID and name
pub fn format_row(row: &Row, render: &RenderConfig) -> String {
    let pad = " ".repeat(row.node.level * render.indent);
    let name = truncate_to_width(&single_line(&row.node.task.name), render.max_name_width);
    format!(
        "{}{} {} {} {}",
        pad,
        expander(row),
        checkbox(row.selected),
        row.node.id(),
        name
    )
}

/// The "select all" control line
pub fn format_select_all(state: SelectAllState) -> String {
    format!("{} {}", state.checkbox(), state.label())
}

/// The whole table as lines: parse indicator or select-all control, then rows
pub fn format_table(state: &State, render: &RenderConfig, expand_all: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(err) = state.parse_error() {
        lines.push(format!("! task data could not be read: {}", err));
        return lines;
    }
    if state.store().is_empty() {
        lines.push("(no tasks)".to_string());
        return lines;
    }
    lines.push(format_select_all(state.select_all_state()));
    let tree = state.tree();
    for row in visible_rows(&tree, state.view(), expand_all) {
        lines.push(format_row(&row, render));
    }
    lines
}

pub fn format_change(change: &OrderChange) -> String {
    format!("{} -> {}", change.id, change.new_order)
}

pub fn format_warning(warning: &CheckWarning) -> String {
    match warning {
        CheckWarning::Orphan { id, parent_id } => {
            format!("{} has missing parent {} (shown as a root)", id, parent_id)
        }
        CheckWarning::Cycle { id } => format!("{} is its own ancestor", id),
        CheckWarning::DuplicateOrder {
            parent_id,
            order,
            ids,
        } => format!(
            "{} share order {} under {}",
            ids.join(", "),
            order,
            group_label(parent_id.as_deref())
        ),
        CheckWarning::NonContiguous { parent_id, orders } => format!(
            "orders under {} are not 1..{}: {:?}",
            group_label(parent_id.as_deref()),
            orders.len(),
            orders
        ),
    }
}

fn group_label(parent_id: Option<&str>) -> String {
    match parent_id {
        Some(id) => id.to_string(),
        None => "root".to_string(),
    }
}

pub fn format_check(result: &CheckResult) -> Vec<String> {
    let mut lines = Vec::new();
    if !result.errors.is_empty() {
        lines.push("Errors:".to_string());
        for err in &result.errors {
            lines.push(format!("  {}", err));
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            lines.push(String::new());
        }
        lines.push("Warnings:".to_string());
        for warning in &result.warnings {
            lines.push(format!("  {}", format_warning(warning)));
        }
    }
    if result.valid {
        lines.push("✓ task list is valid".to_string());
    } else {
        lines.push("✗ task list has dropped records".to_string());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::ResetPolicy;
    use crate::ops::{Event, update};

    const SAMPLE: &str = r#"[
        {"id":"A","name":"Alpha","parentId":null,"displayOrder":1},
        {"id":"B","name":"Bravo","parentId":null,"displayOrder":2},
        {"id":"C","name":"Charlie","parentId":"A","displayOrder":1},
        {"id":"D","name":"Delta\nsecond line","parentId":"C","displayOrder":1}
    ]"#;

    fn render(state: &State, expand_all: bool) -> String {
        format_table(state, &RenderConfig::default(), expand_all).join("\n")
    }

    #[test]
    fn collapsed_table() {
        let state = State::new(Some(SAMPLE), ResetPolicy::Full);
        insta::assert_snapshot!(render(&state, false), @r"
        [ ] Select All
        ▸ [ ] A Alpha
          [ ] B Bravo
        ");
    }

    #[test]
    fn expanded_table_with_selection() {
        let state = State::new(Some(SAMPLE), ResetPolicy::Full);
        let (state, _) = update(state, Event::ToggleExpand("A".into()));
        let (state, _) = update(state, Event::ToggleNode("C".into()));
        insta::assert_snapshot!(render(&state, false), @r"
        [-] Select All
        ▾ [ ] A Alpha
          ▸ [x] C Charlie
          [ ] B Bravo
        ");
    }

    #[test]
    fn expand_all_table() {
        let state = State::new(Some(SAMPLE), ResetPolicy::Full);
        let (state, _) = update(state, Event::ToggleSelectAll);
        insta::assert_snapshot!(render(&state, true), @r"
        [x] Deselect All
        ▾ [x] A Alpha
          ▾ [x] C Charlie
              [x] D Delta second line
          [x] B Bravo
        ");
    }

    #[test]
    fn long_names_truncated() {
        let state = State::new(
            Some(r#"[{"id":"A","name":"a very long task name","displayOrder":1}]"#),
            ResetPolicy::Full,
        );
        let render = RenderConfig {
            max_name_width: 6,
            ..RenderConfig::default()
        };
        let lines = format_table(&state, &render, false);
        assert_eq!(lines[1], "  [ ] A a ver…");
    }

    #[test]
    fn empty_and_broken_tables() {
        let empty = State::new(None, ResetPolicy::Full);
        assert_eq!(format_table(&empty, &RenderConfig::default(), false), vec!["(no tasks)"]);

        let broken = State::new(Some("not json"), ResetPolicy::Full);
        let lines = format_table(&broken, &RenderConfig::default(), false);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("! task data could not be read"));
    }

    #[test]
    fn tree_json_shape() {
        let state = State::new(Some(SAMPLE), ResetPolicy::Full);
        let (state, _) = update(state, Event::ToggleNode("A".into()));
        let tree = state.tree();
        let json = serde_json::to_value(tree_to_json(&state, &tree)).unwrap();
        assert_eq!(json["select_all"], "some");
        assert_eq!(json["selected"], serde_json::json!(["A", "C", "D"]));
        assert_eq!(json["roots"][0]["id"], "A");
        assert_eq!(json["roots"][0]["children"][0]["level"], 1);
        assert!(json.get("parse_error").is_none());
    }
}
