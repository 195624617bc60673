pub mod check;
pub mod echo;
pub mod engine;
pub mod reorder_ops;
pub mod select_ops;
pub mod tree_ops;

pub use engine::{Effect, Event, State, update};
