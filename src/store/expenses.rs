use std::sync::Arc;

use log::debug;
use uuid::Uuid;

use crate::api::ExpenseApi;
use crate::models::{
    Analytics, CategoryShare, CreateExpense, Expense, ExpenseFilters, UpdateExpenseStatus,
};
use crate::validation::{self, ValidationErrors};

const FETCH_FALLBACK: &str = "Failed to fetch expenses";
const CREATE_FALLBACK: &str = "Failed to create expense";
const UPDATE_FALLBACK: &str = "Failed to update expense status";
const PENDING_FALLBACK: &str = "Failed to fetch pending expenses";
const ANALYTICS_FALLBACK: &str = "Failed to fetch analytics";

/// Client-side cache of the caller's visible expenses, the admin pending
/// queue, and the server-computed analytics. Every fetch replaces its
/// slice wholesale; nothing here merges server state.
pub struct ExpenseStore<A> {
    api: Arc<A>,
    expenses: Vec<Expense>,
    pending: Vec<Expense>,
    analytics: Option<Analytics>,
    filters: ExpenseFilters,
    is_loading: bool,
    error: Option<String>,
}

impl<A: ExpenseApi> ExpenseStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            expenses: Vec::new(),
            pending: Vec::new(),
            analytics: None,
            filters: ExpenseFilters::default(),
            is_loading: false,
            error: None,
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn pending_expenses(&self) -> &[Expense] {
        &self.pending
    }

    pub fn analytics(&self) -> Option<&Analytics> {
        self.analytics.as_ref()
    }

    pub fn filters(&self) -> &ExpenseFilters {
        &self.filters
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Wholesale replacement of the active filter set; clearing means
    /// passing `ExpenseFilters::default()`. Never fetches by itself;
    /// whichever view observes the change drives the fetch.
    pub fn set_filters(&mut self, filters: ExpenseFilters) {
        self.filters = filters;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Fetch the caller's visible expenses under the current filters and
    /// replace the list with exactly the response payload. The last call
    /// to resolve wins.
    pub async fn fetch_expenses(&mut self) {
        self.is_loading = true;
        self.error = None;
        let filters = self.filters.clone();
        match self.api.list_expenses(&filters).await {
            Ok(expenses) => {
                debug!("fetched {} expenses", expenses.len());
                self.expenses = expenses;
            }
            Err(err) => self.error = Some(err.message_or(FETCH_FALLBACK)),
        }
        self.is_loading = false;
    }

    /// Validated client-side before anything is sent. On success the new
    /// record goes to the head of the list, most recent submission
    /// first, regardless of the server's ordering.
    pub async fn create_expense(&mut self, input: CreateExpense) -> Result<(), ValidationErrors> {
        validation::validate_new_expense(&input)?;
        self.is_loading = true;
        self.error = None;
        match self.api.create_expense(&input).await {
            Ok(expense) => self.expenses.insert(0, expense),
            Err(err) => self.error = Some(err.message_or(CREATE_FALLBACK)),
        }
        self.is_loading = false;
        Ok(())
    }

    /// Replace the admin pending queue wholesale.
    pub async fn fetch_pending_expenses(&mut self) {
        self.is_loading = true;
        match self.api.pending_expenses().await {
            Ok(pending) => self.pending = pending,
            Err(err) => self.error = Some(err.message_or(PENDING_FALLBACK)),
        }
        self.is_loading = false;
    }

    /// Approve or reject. Rejecting without a reason fails validation and
    /// sends nothing. On success the single response payload drives both
    /// mutations together: the main-list entry is replaced in place and
    /// the record leaves the pending queue.
    pub async fn update_expense_status(
        &mut self,
        id: Uuid,
        update: UpdateExpenseStatus,
    ) -> Result<(), ValidationErrors> {
        validation::validate_status_update(&update)?;
        match self.api.update_expense_status(id, &update).await {
            Ok(updated) => self.apply_status_update(updated),
            Err(err) => self.error = Some(err.message_or(UPDATE_FALLBACK)),
        }
        Ok(())
    }

    /// Replace the stored analytics wholesale.
    pub async fn fetch_analytics(&mut self) {
        self.is_loading = true;
        match self.api.analytics().await {
            Ok(analytics) => self.analytics = Some(analytics),
            Err(err) => self.error = Some(err.message_or(ANALYTICS_FALLBACK)),
        }
        self.is_loading = false;
    }

    /// Top `n` category bars from the already-fetched analytics payload;
    /// the client never derives global aggregates itself.
    pub fn category_breakdown(&self, n: usize) -> Vec<CategoryShare> {
        self.analytics
            .as_ref()
            .map(|a| a.top_categories(n))
            .unwrap_or_default()
    }

    // Both collections change from one payload, inside one &mut borrow,
    // so no reader can observe the list updated but the queue not.
    fn apply_status_update(&mut self, updated: Expense) {
        if let Some(existing) = self.expenses.iter_mut().find(|e| e.id == updated.id) {
            *existing = updated.clone();
        }
        self.pending.retain(|e| e.id != updated.id);
    }
}
