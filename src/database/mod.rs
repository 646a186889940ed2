pub mod handlers;
pub mod manager;
pub mod schema;

pub use handlers::{run_history_handler, HistoryRecorder};
pub use manager::{DatabaseManager, HistoryError};
