//! Client-side synchronization layer for an expense-tracking backend.
//!
//! The crate wires a typed REST client ([`api`]) to two state containers
//! ([`store::SessionStore`], [`store::ExpenseStore`]) that a view layer
//! drives: dispatch an intent, the store issues one request, and on
//! success mutates its slice of state for the next render. Failures
//! normalize to a display string in the store's error slot; state is
//! otherwise left as it was.

pub mod api;
pub mod models;
pub mod persist;
pub mod store;
pub mod validation;

pub use api::{ApiError, AuthToken, ExpenseApi, HttpApi};
pub use store::{AuthStatus, ExpenseStore, SessionStore};
