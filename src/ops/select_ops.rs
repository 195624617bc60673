use crate::model::config::ResetPolicy;
use crate::model::store::TaskStore;
use crate::model::view::{SelectAllState, ViewState};
use crate::ops::tree_ops::descendant_ids;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Toggle a task and its whole subtree.
///
/// Selected → the task and every descendant are deselected. Unselected → the
/// task and every descendant are selected. Descendants come from the store,
/// not from whatever tree was last rendered. Returns false for an unknown ID.
pub fn toggle_node(view: &mut ViewState, store: &TaskStore, id: &str) -> bool {
    if !store.contains(id) {
        return false;
    }
    let mut affected = vec![id.to_string()];
    affected.extend(descendant_ids(store.tasks(), id));

    if view.is_selected(id) {
        for task_id in &affected {
            view.selected.shift_remove(task_id);
        }
    } else {
        for task_id in affected {
            view.selected.insert(task_id);
        }
    }
    true
}

/// Tri-state summary for the "select all" control.
pub fn select_all_state(view: &ViewState, store: &TaskStore) -> SelectAllState {
    if view.selected.is_empty() {
        return SelectAllState::None;
    }
    if !store.is_empty() && store.ids().all(|id| view.is_selected(id)) {
        SelectAllState::All
    } else {
        SelectAllState::Some
    }
}

/// `none`/`some` → select every task; `all` → clear. Returns false on an
/// empty task list, where the control isn't shown.
pub fn toggle_select_all(view: &mut ViewState, store: &TaskStore) -> bool {
    if store.is_empty() {
        return false;
    }
    match select_all_state(view, store) {
        SelectAllState::All => view.selected.clear(),
        SelectAllState::None | SelectAllState::Some => {
            view.selected.clear();
            for id in store.ids() {
                view.selected.insert(id.to_string());
            }
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Flip one task's expanded flag. Descendants keep theirs, so re-expanding
/// a parent restores the depth that was open before.
///
/// Only tasks with children can be expanded; an unknown ID or a leaf is
/// rejected and false is returned. Collapsing always succeeds.
pub fn toggle_expand(view: &mut ViewState, store: &TaskStore, id: &str) -> bool {
    if view.expanded.shift_remove(id) {
        return true;
    }
    if !store.contains(id) || store.siblings(Some(id)).is_empty() {
        return false;
    }
    view.expanded.insert(id.to_string());
    true
}

/// Expand every task that has children.
pub fn expand_all(view: &mut ViewState, store: &TaskStore) {
    let index = store.sibling_index();
    for id in store.ids() {
        if index.contains_key(&Some(id)) {
            view.expanded.insert(id.to_string());
        }
    }
}

pub fn collapse_all(view: &mut ViewState) {
    view.expanded.clear();
}

// ---------------------------------------------------------------------------
// Store replacement
// ---------------------------------------------------------------------------

/// Reconcile UI state with a replaced task list.
///
/// `Full` clears both sets; `Partial` drops IDs that are no longer present.
/// Returns the number of IDs removed.
pub fn reconcile_view(view: &mut ViewState, store: &TaskStore, policy: ResetPolicy) -> usize {
    match policy {
        ResetPolicy::Full => {
            let removed = view.selected.len() + view.expanded.len();
            view.clear();
            removed
        }
        ResetPolicy::Partial => {
            let ids = store.id_set();
            view.retain_valid(|id| ids.contains(id))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;

    fn sample_store() -> TaskStore {
        TaskStore::new(vec![
            Task::new("A", "Alpha", 1),
            Task::new("B", "Bravo", 2),
            Task::new("C", "Charlie", 1).with_parent("A"),
            Task::new("D", "Delta", 1).with_parent("C"),
        ])
    }

    fn selected(view: &ViewState) -> Vec<&str> {
        let mut ids: Vec<&str> = view.selected.iter().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn toggle_cascades_to_descendants() {
        let store = sample_store();
        let mut view = ViewState::default();
        assert!(toggle_node(&mut view, &store, "A"));
        assert_eq!(selected(&view), vec!["A", "C", "D"]);
    }

    #[test]
    fn toggle_twice_restores_subtree() {
        let store = sample_store();
        let mut view = ViewState::default();
        view.selected.insert("B".into());
        toggle_node(&mut view, &store, "A");
        toggle_node(&mut view, &store, "A");
        assert_eq!(selected(&view), vec!["B"]);
    }

    #[test]
    fn deselect_clears_partially_selected_subtree() {
        let store = sample_store();
        let mut view = ViewState::default();
        toggle_node(&mut view, &store, "A");
        // Deselect a child; the parent stays selected
        toggle_node(&mut view, &store, "C");
        assert_eq!(selected(&view), vec!["A"]);
        // Parent is selected, so toggling it deselects the whole subtree
        toggle_node(&mut view, &store, "A");
        assert!(view.selected.is_empty());
    }

    #[test]
    fn toggle_unknown_is_noop() {
        let store = sample_store();
        let mut view = ViewState::default();
        assert!(!toggle_node(&mut view, &store, "Z"));
        assert!(view.selected.is_empty());
    }

    #[test]
    fn select_all_tri_state() {
        let store = sample_store();
        let mut view = ViewState::default();
        assert_eq!(select_all_state(&view, &store), SelectAllState::None);
        view.selected.insert("B".into());
        assert_eq!(select_all_state(&view, &store), SelectAllState::Some);
        toggle_node(&mut view, &store, "A");
        assert_eq!(select_all_state(&view, &store), SelectAllState::All);
    }

    #[test]
    fn empty_store_is_never_all() {
        let store = TaskStore::default();
        let mut view = ViewState::default();
        assert_eq!(select_all_state(&view, &store), SelectAllState::None);
        assert!(!toggle_select_all(&mut view, &store));
        // A stale selection on an empty list reads as `some`, not `all`
        view.selected.insert("ghost".into());
        assert_eq!(select_all_state(&view, &store), SelectAllState::Some);
    }

    #[test]
    fn toggle_select_all_promotes_some_to_all() {
        let store = sample_store();
        let mut view = ViewState::default();
        view.selected.insert("C".into());
        assert!(toggle_select_all(&mut view, &store));
        assert_eq!(select_all_state(&view, &store), SelectAllState::All);
        assert!(toggle_select_all(&mut view, &store));
        assert_eq!(select_all_state(&view, &store), SelectAllState::None);
        assert!(toggle_select_all(&mut view, &store));
        assert_eq!(selected(&view), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn toggle_expand_keeps_descendant_flags() {
        let store = sample_store();
        let mut view = ViewState::default();
        toggle_expand(&mut view, &store, "A");
        toggle_expand(&mut view, &store, "C");
        toggle_expand(&mut view, &store, "A");
        assert!(!view.is_expanded("A"));
        assert!(view.is_expanded("C"));
        toggle_expand(&mut view, &store, "A");
        assert!(view.is_expanded("A"));
    }

    #[test]
    fn toggle_expand_rejects_unknown_and_leaves() {
        let store = sample_store();
        let mut view = ViewState::default();
        assert!(!toggle_expand(&mut view, &store, "ghost"));
        assert!(!toggle_expand(&mut view, &store, "B"));
        assert!(view.expanded.is_empty());

        // A flag left over from an older list can still be cleared
        view.expanded.insert("ghost".into());
        assert!(toggle_expand(&mut view, &store, "ghost"));
        assert!(view.expanded.is_empty());
    }

    #[test]
    fn expand_all_only_parents() {
        let store = sample_store();
        let mut view = ViewState::default();
        expand_all(&mut view, &store);
        let mut expanded: Vec<&str> = view.expanded.iter().map(|s| s.as_str()).collect();
        expanded.sort();
        assert_eq!(expanded, vec!["A", "C"]);
        collapse_all(&mut view);
        assert!(view.expanded.is_empty());
    }

    #[test]
    fn reconcile_full_clears() {
        let store = sample_store();
        let mut view = ViewState::default();
        toggle_node(&mut view, &store, "A");
        toggle_expand(&mut view, &store, "A");
        assert_eq!(reconcile_view(&mut view, &store, ResetPolicy::Full), 4);
        assert_eq!(view, ViewState::default());
    }

    #[test]
    fn reconcile_partial_prunes_stale() {
        let store = sample_store();
        let mut view = ViewState::default();
        toggle_node(&mut view, &store, "A");
        toggle_expand(&mut view, &store, "C");

        let replaced = TaskStore::new(vec![Task::new("A", "Alpha", 1), Task::new("B", "Bravo", 2)]);
        assert_eq!(reconcile_view(&mut view, &replaced, ResetPolicy::Partial), 3);
        assert_eq!(selected(&view), vec!["A"]);
        assert!(view.expanded.is_empty());
    }
}
