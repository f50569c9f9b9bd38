pub mod analytics;
pub mod expense;
pub mod user;

// Re-export only the types we actually use
pub use analytics::{Analytics, CategoryShare, StatusCounts};
pub use expense::{
    CreateExpense, Expense, ExpenseCategory, ExpenseFilters, ExpenseStatus, UpdateExpenseStatus,
};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User, UserRole};
