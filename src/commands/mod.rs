pub mod context;
pub mod prize;

// Re-exports for the later usage in main.rs
pub use crate::commands::context::{Context, UserData};
pub use crate::commands::prize::commands_list;
