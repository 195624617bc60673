use serde::{Deserialize, Serialize};

/// A single flat task record as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identity, unique within a store
    pub id: String,
    /// Display label
    pub name: String,
    /// Parent task ID (None = root)
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Position within the sibling group (ascending)
    pub display_order: i64,
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>, display_order: i64) -> Self {
        Task {
            id: id.into(),
            name: name.into(),
            parent_id: None,
            display_order,
        }
    }

    /// Builder-style parent assignment
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// The parent key used for sibling grouping
    pub fn parent(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    /// Whether two tasks belong to the same sibling group
    pub fn is_sibling_of(&self, other: &Task) -> bool {
        self.parent() == other.parent()
    }
}

/// A derived hierarchical view of a task. Rebuilt on every render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub task: Task,
    /// Nesting depth (0 = root)
    pub level: usize,
    /// Children ordered by ascending display order
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        &self.task.id
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// One entry of the outbound order-change payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderChange {
    pub id: String,
    pub new_order: i64,
}

impl OrderChange {
    pub fn new(id: impl Into<String>, new_order: i64) -> Self {
        OrderChange {
            id: id.into(),
            new_order,
        }
    }
}

/// Direction for a single-step move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}
