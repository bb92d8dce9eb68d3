//! Aggregation of raw records into summary figures and chart series.
//!
//! Everything here is pure: the functions take the records already fetched
//! for a window and return fresh values. No function filters by date, so the
//! caller must restrict the input to the wanted window first (see
//! [`Window::select`](crate::Window::select) and
//! [`Window::filter`](crate::Window::filter)).
//!
//! Revenue is always the sum of the persisted sale totals. Quantity times
//! price is never recomputed here, since the stored total is what the user
//! confirmed at entry time.

use std::{collections::BTreeMap, ops::AddAssign};

use api_types::{
    expense::{Expense, ExpenseCategory},
    production::Production,
    sale::Sale,
};
use serde::{Deserialize, Serialize};

use crate::{Granularity, Money};

/// Headline figures for a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_production_liters: f64,
    pub average_daily_production_liters: f64,
    pub total_sold_liters: f64,
    pub total_revenue: Money,
    pub total_expenses: Money,
    /// Always `total_revenue - total_expenses`.
    pub net_profit: Money,
}

/// One bucket of a series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint<V = f64> {
    pub label: String,
    pub value: V,
}

impl<V> ChartPoint<V> {
    pub fn new(label: impl Into<String>, value: V) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// A bucket present in at least one of two merged series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint<L, R> {
    pub label: String,
    pub left: L,
    pub right: R,
}

/// Revenue and expenses side by side, keyed like the dashboard chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueExpensePoint {
    pub label: String,
    #[serde(rename = "vendas")]
    pub revenue: Money,
    #[serde(rename = "despesas")]
    pub expenses: Money,
}

/// Liters produced and liters sold in the same bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductionSalesPoint {
    pub label: String,
    #[serde(rename = "producao")]
    pub produced_liters: f64,
    #[serde(rename = "vendas")]
    pub sold_liters: f64,
}

/// Share of expenses of one category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryPoint {
    pub category: ExpenseCategory,
    pub label: String,
    pub value: Money,
}

/// Computes the headline figures.
///
/// `window_days` is the divisor for the daily average and comes from the
/// caller's window, never from the data. A non-positive value yields a zero
/// average.
pub fn compute_summary(
    productions: &[Production],
    sales: &[Sale],
    expenses: &[Expense],
    window_days: i64,
) -> SummaryStats {
    let total_production_liters: f64 = productions.iter().map(|p| p.quantity_liters).sum();
    let average_daily_production_liters = if window_days <= 0 {
        0.0
    } else {
        total_production_liters / window_days as f64
    };
    let total_sold_liters: f64 = sales.iter().map(|s| s.quantity_liters).sum();
    let total_revenue: Money = sales.iter().map(sale_total).sum();
    let total_expenses: Money = expenses.iter().map(expense_amount).sum();

    SummaryStats {
        total_production_liters,
        average_daily_production_liters,
        total_sold_liters,
        total_revenue,
        total_expenses,
        net_profit: total_revenue - total_expenses,
    }
}

/// Groups `records` by `key_fn` and sums `value_fn` inside each group.
///
/// One point per distinct key, sorted ascending by key. With ISO date or
/// month keys this is chronological order; with categorical keys it is
/// alphabetical, which keeps the output deterministic.
pub fn bucket_by_key<T, K, V, FK, FV>(records: &[T], key_fn: FK, value_fn: FV) -> Vec<ChartPoint<V>>
where
    K: Into<String>,
    V: Copy + Default + AddAssign,
    FK: Fn(&T) -> K,
    FV: Fn(&T) -> V,
{
    let mut buckets: BTreeMap<String, V> = BTreeMap::new();
    for record in records {
        *buckets.entry(key_fn(record).into()).or_default() += value_fn(record);
    }

    buckets
        .into_iter()
        .map(|(label, value)| ChartPoint { label, value })
        .collect()
}

/// Joins two series on the union of their labels.
///
/// A label present on one side only gets the default (zero) value on the
/// other side; it is never dropped. Output is sorted ascending by label.
pub fn merge_on_union<L, R>(left: &[ChartPoint<L>], right: &[ChartPoint<R>]) -> Vec<MergedPoint<L, R>>
where
    L: Copy + Default + AddAssign,
    R: Copy + Default + AddAssign,
{
    let mut merged: BTreeMap<&str, (L, R)> = BTreeMap::new();
    for point in left {
        merged.entry(point.label.as_str()).or_default().0 += point.value;
    }
    for point in right {
        merged.entry(point.label.as_str()).or_default().1 += point.value;
    }

    merged
        .into_iter()
        .map(|(label, (left, right))| MergedPoint {
            label: label.to_string(),
            left,
            right,
        })
        .collect()
}

/// Liters produced per bucket.
pub fn production_series(productions: &[Production], granularity: Granularity) -> Vec<ChartPoint> {
    bucket_by_key(
        productions,
        |p| granularity.key(p.date),
        |p| p.quantity_liters,
    )
}

/// Liters sold per bucket.
pub fn sold_liters_series(sales: &[Sale], granularity: Granularity) -> Vec<ChartPoint> {
    bucket_by_key(sales, |s| granularity.key(s.date), |s| s.quantity_liters)
}

/// Revenue (persisted sale totals) per bucket.
pub fn revenue_series(sales: &[Sale], granularity: Granularity) -> Vec<ChartPoint<Money>> {
    bucket_by_key(sales, |s| granularity.key(s.date), sale_total)
}

/// Expense amounts per bucket.
pub fn expense_series(expenses: &[Expense], granularity: Granularity) -> Vec<ChartPoint<Money>> {
    bucket_by_key(expenses, |e| granularity.key(e.date), expense_amount)
}

pub fn revenue_vs_expenses(
    sales: &[Sale],
    expenses: &[Expense],
    granularity: Granularity,
) -> Vec<RevenueExpensePoint> {
    merge_on_union(
        &revenue_series(sales, granularity),
        &expense_series(expenses, granularity),
    )
    .into_iter()
    .map(|point| RevenueExpensePoint {
        label: point.label,
        revenue: point.left,
        expenses: point.right,
    })
    .collect()
}

pub fn production_vs_sales(
    productions: &[Production],
    sales: &[Sale],
    granularity: Granularity,
) -> Vec<ProductionSalesPoint> {
    merge_on_union(
        &production_series(productions, granularity),
        &sold_liters_series(sales, granularity),
    )
    .into_iter()
    .map(|point| ProductionSalesPoint {
        label: point.label,
        produced_liters: point.left,
        sold_liters: point.right,
    })
    .collect()
}

/// Expense totals per category, alphabetical by category key.
pub fn expenses_by_category(expenses: &[Expense]) -> Vec<CategoryPoint> {
    bucket_by_key(expenses, |e| e.category.as_str(), expense_amount)
        .into_iter()
        .filter_map(|point| {
            let category = ExpenseCategory::try_from(point.label.as_str()).ok()?;
            Some(CategoryPoint {
                category,
                label: category.label().to_string(),
                value: point.value,
            })
        })
        .collect()
}

/// Expense totals per free-text description (trimmed), alphabetical.
pub fn expenses_by_description(expenses: &[Expense]) -> Vec<ChartPoint<Money>> {
    bucket_by_key(expenses, |e| e.description.trim().to_string(), expense_amount)
}

fn sale_total(sale: &Sale) -> Money {
    Money::new(sale.total_amount_cents)
}

fn expense_amount(expense: &Expense) -> Money {
    Money::new(expense.amount_cents)
}
