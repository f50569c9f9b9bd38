//! Client-side form validation. These checks keep obviously bad input off
//! the wire and feed inline per-field messages; the server remains the
//! authority on every rule.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{CreateExpense, ExpenseCategory, ExpenseStatus, RegisterRequest, UpdateExpenseStatus};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// One or more rejected fields. The operation that produced this never
/// issued a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    fn from_vec(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&joined.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    ValidationErrors::from_vec(errors)
}

pub fn validate_registration(req: &RegisterRequest) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if req.email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !req.email.contains('@') {
        errors.push(FieldError::new("email", "Email address is invalid"));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if req.first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", "First name is required"));
    }
    if req.last_name.trim().is_empty() {
        errors.push(FieldError::new("lastName", "Last name is required"));
    }
    ValidationErrors::from_vec(errors)
}

pub fn validate_new_expense(req: &CreateExpense) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if req.amount <= Decimal::ZERO {
        errors.push(FieldError::new("amount", "Amount must be greater than 0"));
    }
    if req.description.trim().is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    }
    ValidationErrors::from_vec(errors)
}

/// An approval decision must be exactly approve or reject, and rejecting
/// requires a reason; the server enforces the same invariant.
pub fn validate_status_update(update: &UpdateExpenseStatus) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    match update.status {
        ExpenseStatus::Pending => {
            errors.push(FieldError::new(
                "status",
                "Status must be approved or rejected",
            ));
        }
        ExpenseStatus::Rejected => {
            let blank = update
                .rejection_reason
                .as_deref()
                .map(|r| r.trim().is_empty())
                .unwrap_or(true);
            if blank {
                errors.push(FieldError::new(
                    "rejectionReason",
                    "Rejection reason is required",
                ));
            }
        }
        ExpenseStatus::Approved => {}
    }
    ValidationErrors::from_vec(errors)
}

/// Parse raw form fields into a create request, collecting every bad
/// field instead of stopping at the first.
pub fn parse_expense_form(
    amount: &str,
    category: &str,
    date: &str,
    description: &str,
) -> Result<CreateExpense, ValidationErrors> {
    let mut errors = Vec::new();

    let amount = match amount.trim().parse::<Decimal>() {
        Ok(value) if value > Decimal::ZERO => Some(value),
        Ok(_) => {
            errors.push(FieldError::new("amount", "Amount must be greater than 0"));
            None
        }
        Err(_) => {
            errors.push(FieldError::new("amount", "Amount must be a number"));
            None
        }
    };

    let category = match category.parse::<ExpenseCategory>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new("category", "Unknown category"));
            None
        }
    };

    let date = match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(
                "expenseDate",
                "Date must be formatted YYYY-MM-DD",
            ));
            None
        }
    };

    if description.trim().is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    }

    match (amount, category, date) {
        (Some(amount), Some(category), Some(expense_date)) if errors.is_empty() => {
            Ok(CreateExpense {
                amount,
                category,
                description: description.trim().to_string(),
                expense_date,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}
