use std::collections::{HashMap, HashSet};

use super::task::Task;

/// The canonical flat task list. Single source of truth for the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

/// Sibling groups keyed by parent ID, each stable-sorted by display order
pub type SiblingIndex<'a> = HashMap<Option<&'a str>, Vec<&'a Task>>;

/// Group tasks by parent key. Ties in display order keep input order.
pub fn sibling_index(tasks: &[Task]) -> SiblingIndex<'_> {
    let mut index: SiblingIndex<'_> = HashMap::new();
    for task in tasks {
        index.entry(task.parent()).or_default().push(task);
    }
    for group in index.values_mut() {
        group.sort_by_key(|t| t.display_order);
    }
    index
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskStore { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All task IDs, in store order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.id.as_str())
    }

    pub fn id_set(&self) -> HashSet<&str> {
        self.ids().collect()
    }

    /// Whether a task's parent reference points at a task that isn't loaded
    pub fn is_orphan(&self, task: &Task) -> bool {
        task.parent().is_some_and(|p| !self.contains(p))
    }

    pub fn sibling_index(&self) -> SiblingIndex<'_> {
        sibling_index(&self.tasks)
    }

    /// The sibling group for `parent`, stable-sorted by display order.
    pub fn siblings(&self, parent: Option<&str>) -> Vec<&Task> {
        let mut group: Vec<&Task> = self.tasks.iter().filter(|t| t.parent() == parent).collect();
        group.sort_by_key(|t| t.display_order);
        group
    }

    /// Set a task's display order. Returns false if the task is unknown.
    pub fn set_display_order(&mut self, id: &str, order: i64) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.display_order = order;
                true
            }
            None => false,
        }
    }
}
