//! Task-management client logic on top of `session-auth`: account flows,
//! task CRUD, form validation and the task list view model.

pub use error::Error;

pub mod account;
pub mod board;
pub mod error;
pub mod task;
pub mod todo;
pub mod validation;

mod api;
