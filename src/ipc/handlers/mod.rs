pub mod actions;
pub mod core;
pub mod stats;
pub mod students;
pub mod tasks;
