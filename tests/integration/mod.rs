//! Integration tests over in-memory SQLite

mod executor_tests;
mod guard_tests;
mod progress_tests;
