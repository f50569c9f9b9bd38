pub mod client;
pub mod error;

pub use client::{AuthToken, HttpApi};
pub use error::ApiError;

use uuid::Uuid;

use crate::models::{
    Analytics, AuthResponse, CreateExpense, Expense, ExpenseFilters, LoginRequest,
    RegisterRequest, UpdateExpenseStatus, User,
};

/// The request/response boundary to the expense backend: one method per
/// endpoint, no retries, no caching, no deduplication. Stores depend on
/// this trait so tests can script responses without a network.
#[allow(async_fn_in_trait)]
pub trait ExpenseApi {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError>;
    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn list_expenses(&self, filters: &ExpenseFilters) -> Result<Vec<Expense>, ApiError>;
    async fn get_expense(&self, id: Uuid) -> Result<Expense, ApiError>;
    async fn create_expense(&self, req: &CreateExpense) -> Result<Expense, ApiError>;
    async fn update_expense_status(
        &self,
        id: Uuid,
        req: &UpdateExpenseStatus,
    ) -> Result<Expense, ApiError>;
    async fn pending_expenses(&self) -> Result<Vec<Expense>, ApiError>;
    async fn analytics(&self) -> Result<Analytics, ApiError>;
}
