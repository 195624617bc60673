pub mod config_io;
pub mod task_io;
pub mod watcher;
