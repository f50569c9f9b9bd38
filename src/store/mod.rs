pub mod expenses;
pub mod session;

pub use expenses::ExpenseStore;
pub use session::{AuthStatus, SessionStore};
