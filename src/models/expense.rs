use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseStatus {
    Pending,
    Approved,
    Rejected,
}

impl ExpenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseStatus::Pending => "pending",
            ExpenseStatus::Approved => "approved",
            ExpenseStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ExpenseStatus::Pending),
            "approved" => Ok(ExpenseStatus::Approved),
            "rejected" => Ok(ExpenseStatus::Rejected),
            other => Err(format!("unknown expense status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Travel,
    Food,
    OfficeSupplies,
    Utilities,
    Equipment,
    Software,
    Marketing,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Travel,
        ExpenseCategory::Food,
        ExpenseCategory::OfficeSupplies,
        ExpenseCategory::Utilities,
        ExpenseCategory::Equipment,
        ExpenseCategory::Software,
        ExpenseCategory::Marketing,
        ExpenseCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::Food => "food",
            ExpenseCategory::OfficeSupplies => "office_supplies",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Software => "software",
            ExpenseCategory::Marketing => "marketing",
            ExpenseCategory::Other => "other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExpenseCategory::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown expense category: {}", s))
    }
}

/// A spend record as the backend returns it. `rejection_reason` is set
/// if and only if the status is `rejected`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub description: String,
    pub expense_date: NaiveDate,
    pub status: ExpenseStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    pub user_id: Uuid,
    pub user: User,
    #[serde(default)]
    pub approved_by: Option<Uuid>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    pub amount: Decimal,
    pub category: ExpenseCategory,
    pub description: String,
    pub expense_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpenseStatus {
    pub status: ExpenseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl UpdateExpenseStatus {
    pub fn approve() -> Self {
        Self {
            status: ExpenseStatus::Approved,
            rejection_reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            status: ExpenseStatus::Rejected,
            rejection_reason: Some(reason.into()),
        }
    }
}

/// Criteria sent to the server to narrow an expense fetch. An absent
/// field places no constraint; the date range is inclusive on both ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilters {
    pub category: Option<ExpenseCategory>,
    pub status: Option<ExpenseStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilters {
    pub fn is_empty(&self) -> bool {
        *self == ExpenseFilters::default()
    }

    /// Query pairs for the expense list endpoint. Only present fields
    /// appear in the query string.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(category) = self.category {
            pairs.push(("category", category.as_str().to_string()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.format("%Y-%m-%d").to_string()));
        }
        pairs
    }
}
