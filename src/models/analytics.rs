use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ExpenseCategory, ExpenseStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

/// Aggregate summary computed by the backend for the caller's scope.
/// The client replaces it wholesale on each fetch and only derives
/// per-view slices (see [`Analytics::top_categories`]) from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_expenses: u64,
    pub total_amount: Decimal,
    #[serde(default)]
    pub category_totals: HashMap<ExpenseCategory, Decimal>,
    #[serde(default)]
    pub status_totals: HashMap<ExpenseStatus, Decimal>,
    pub status_counts: StatusCounts,
}

/// One bar of a per-view category breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: Decimal,
    /// Percentage of the largest bar in the breakdown, 0..=100.
    pub share_of_max: f64,
}

impl Analytics {
    /// Top `n` categories by summed amount, descending. Share is relative
    /// to the largest included category, matching the dashboard bars.
    pub fn top_categories(&self, n: usize) -> Vec<CategoryShare> {
        let mut totals: Vec<(ExpenseCategory, Decimal)> = self
            .category_totals
            .iter()
            .map(|(category, amount)| (*category, *amount))
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1));
        totals.truncate(n);

        let max: f64 = totals
            .iter()
            .map(|(_, amount)| decimal_to_f64(*amount))
            .fold(1.0_f64, f64::max);

        totals
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                category,
                amount,
                share_of_max: decimal_to_f64(amount) / max * 100.0,
            })
            .collect()
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    use rust_decimal::prelude::ToPrimitive;
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample() -> Analytics {
        let mut category_totals = HashMap::new();
        category_totals.insert(ExpenseCategory::Travel, dec("800"));
        category_totals.insert(ExpenseCategory::Food, dec("200"));
        category_totals.insert(ExpenseCategory::Software, dec("400"));
        category_totals.insert(ExpenseCategory::Equipment, dec("100"));
        category_totals.insert(ExpenseCategory::Marketing, dec("50"));
        category_totals.insert(ExpenseCategory::Other, dec("25"));
        Analytics {
            total_expenses: 12,
            total_amount: dec("1575"),
            category_totals,
            status_totals: HashMap::new(),
            status_counts: StatusCounts {
                pending: 3,
                approved: 8,
                rejected: 1,
            },
        }
    }

    #[test]
    fn test_top_categories_sorted_and_truncated() {
        let top = sample().top_categories(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].category, ExpenseCategory::Travel);
        assert_eq!(top[1].category, ExpenseCategory::Software);
        assert_eq!(top[2].category, ExpenseCategory::Food);
        assert!((top[0].share_of_max - 100.0).abs() < 1e-9);
        assert!((top[1].share_of_max - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_categories_of_empty_analytics() {
        assert!(Analytics::default().top_categories(5).is_empty());
    }

    #[test]
    fn test_analytics_deserializes_category_keyed_map() {
        let json = r#"{
            "totalExpenses": 2,
            "totalAmount": 150.0,
            "categoryTotals": {"office_supplies": 100.0, "food": 50.0},
            "statusTotals": {"pending": 150.0},
            "statusCounts": {"pending": 2, "approved": 0, "rejected": 0}
        }"#;
        let analytics: Analytics = serde_json::from_str(json).unwrap();
        assert_eq!(
            analytics.category_totals[&ExpenseCategory::OfficeSupplies],
            dec("100")
        );
        assert_eq!(analytics.status_totals[&ExpenseStatus::Pending], dec("150"));
        assert_eq!(analytics.status_counts.pending, 2);
    }
}
