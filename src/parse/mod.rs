pub mod task_parser;
pub mod task_serializer;

pub use task_parser::{Loaded, ParseError, ValidationError, load, validate_record};
pub use task_serializer::{serialize_order_changes, serialize_selected, serialize_tasks};
