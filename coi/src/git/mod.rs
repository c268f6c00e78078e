//! Git integration for coi.
//!
//! A background `std::thread::spawn` thread owns the repository for its
//! lifetime. `Repository` is !Send, so it never crosses a thread boundary;
//! the main loop talks to it through [`types::GitRequest`] and receives
//! [`types::GitEvent`]s on the event bus.
pub mod github;
pub mod highlight;
pub mod repo;
pub mod types;
pub mod worker;
