use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Ephemeral UI state: which tasks are selected and which are expanded.
///
/// Both sets keep insertion order so the outbound selection payload is
/// deterministic. Neither set is part of a task; both are pruned whenever
/// the task list is replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    #[serde(default)]
    pub selected: IndexSet<String>,
    #[serde(default)]
    pub expanded: IndexSet<String>,
}

/// Summary state of the synthetic "select all" control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectAllState {
    None,
    Some,
    All,
}

impl SelectAllState {
    /// Label the control shows for this state
    pub fn label(self) -> &'static str {
        match self {
            SelectAllState::All => "Deselect All",
            SelectAllState::None | SelectAllState::Some => "Select All",
        }
    }

    /// Checkbox glyph: `[x]` all, `[-]` some, `[ ]` none
    pub fn checkbox(self) -> &'static str {
        match self {
            SelectAllState::All => "[x]",
            SelectAllState::Some => "[-]",
            SelectAllState::None => "[ ]",
        }
    }
}

impl std::fmt::Display for SelectAllState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectAllState::None => write!(f, "none"),
            SelectAllState::Some => write!(f, "some"),
            SelectAllState::All => write!(f, "all"),
        }
    }
}

impl ViewState {
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Drop both sets entirely (full external reset)
    pub fn clear(&mut self) {
        self.selected.clear();
        self.expanded.clear();
    }

    /// Keep only IDs accepted by `is_valid` (partial external change).
    /// Returns the number of IDs removed across both sets.
    pub fn retain_valid<F>(&mut self, is_valid: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let before = self.selected.len() + self.expanded.len();
        self.selected.retain(|id| is_valid(id));
        self.expanded.retain(|id| is_valid(id));
        before - (self.selected.len() + self.expanded.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_valid_prunes_both_sets() {
        let mut view = ViewState::default();
        view.selected.insert("A".into());
        view.selected.insert("gone".into());
        view.expanded.insert("gone".into());
        view.expanded.insert("B".into());

        let removed = view.retain_valid(|id| id != "gone");
        assert_eq!(removed, 2);
        assert!(view.is_selected("A"));
        assert!(view.is_expanded("B"));
        assert!(!view.is_selected("gone"));
    }

    #[test]
    fn selected_keeps_insertion_order() {
        let mut view = ViewState::default();
        for id in ["C", "A", "B"] {
            view.selected.insert(id.to_string());
        }
        let ids: Vec<&str> = view.selected.iter().map(|s| s.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn select_all_labels() {
        assert_eq!(SelectAllState::All.label(), "Deselect All");
        assert_eq!(SelectAllState::Some.label(), "Select All");
        assert_eq!(SelectAllState::None.checkbox(), "[ ]");
        assert_eq!(SelectAllState::Some.to_string(), "some");
    }
}
