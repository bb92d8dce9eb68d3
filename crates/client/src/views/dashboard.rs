use chrono::NaiveDate;
use engine::{
    ChartPoint, Granularity, RevenueExpensePoint, SummaryStats, Window,
    aggregate::{production_series, revenue_vs_expenses},
    compute_summary,
};

use super::{Collections, Notice, fetch_collections};
use crate::{
    error::ViewError,
    store::{ClientResult, RecordStore},
};

pub const DEFAULT_DASHBOARD_DAYS: u32 = 30;

/// Summary and daily charts over a trailing window.
#[derive(Debug, Default)]
pub struct DashboardView {
    pub window: Option<Window>,
    pub summary: SummaryStats,
    pub daily_production: Vec<ChartPoint>,
    pub daily_revenue_vs_expenses: Vec<RevenueExpensePoint>,
    busy: bool,
    notice: Option<Notice>,
}

impl DashboardView {
    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Marks the view busy and returns the window of the `days` days ending
    /// `today`.
    pub fn begin_load(&mut self, today: NaiveDate, days: u32) -> Result<Window, ViewError> {
        if self.busy {
            return Err(ViewError::Busy);
        }
        self.busy = true;
        Ok(Window::trailing(today, days))
    }

    /// Recomputes everything from `fetched`. On failure the previous figures
    /// stay.
    pub fn finish_load(
        &mut self,
        window: Window,
        fetched: ClientResult<Collections>,
    ) -> Result<(), ViewError> {
        self.busy = false;
        let (productions, sales, expenses) = match fetched {
            Ok(fetched) => fetched,
            Err(err) => {
                let err = ViewError::from(err);
                tracing::warn!("failed to load dashboard: {err}");
                self.notice = Some(Notice::error("Erro ao carregar dados", err.to_string()));
                return Err(err);
            }
        };

        self.summary = compute_summary(&productions, &sales, &expenses, window.days());
        self.daily_production = production_series(&productions, Granularity::Day);
        self.daily_revenue_vs_expenses = revenue_vs_expenses(&sales, &expenses, Granularity::Day);
        self.window = Some(window);
        Ok(())
    }

    pub async fn load<S: RecordStore>(
        &mut self,
        store: &S,
        today: NaiveDate,
        days: u32,
    ) -> Result<(), ViewError> {
        let window = self.begin_load(today, days)?;
        let fetched = fetch_collections(store, &window.filter()).await;
        self.finish_load(window, fetched)
    }
}

#[cfg(test)]
mod tests {
    use api_types::{
        expense::{Expense, ExpenseCategory, ExpenseNew},
        production::{Production, ProductionNew, Quality},
        sale::{Sale, SaleNew},
    };
    use engine::Money;

    use super::*;
    use crate::testing::FakeStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, d).unwrap()
    }

    async fn seeded() -> FakeStore {
        let store = FakeStore::default();
        store
            .insert::<Production>(&ProductionNew {
                date: day(1),
                quantity_liters: 120.0,
                cow_count: 12,
                quality: Quality::A,
                notes: None,
            })
            .await
            .unwrap();
        store
            .insert::<Sale>(&SaleNew {
                date: day(1),
                quantity_liters: 100.0,
                price_per_liter_cents: 250,
                buyer: "Laticínio Serra".to_string(),
                notes: None,
            })
            .await
            .unwrap();
        store
            .insert::<Expense>(&ExpenseNew {
                date: day(2),
                amount_cents: 30000,
                category: ExpenseCategory::Feed,
                description: "Ração".to_string(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn one_day_window_excludes_later_expense() {
        let store = seeded().await;
        let mut view = DashboardView::default();
        view.load(&store, day(1), 1).await.unwrap();

        assert_eq!(view.summary.total_production_liters, 120.0);
        assert_eq!(view.summary.total_revenue, Money::new(25000));
        assert_eq!(view.summary.total_expenses, Money::ZERO);
        assert_eq!(view.daily_production, vec![ChartPoint::new("2023-05-01", 120.0)]);
    }

    #[tokio::test]
    async fn merged_series_keeps_one_sided_days() {
        let store = seeded().await;
        let mut view = DashboardView::default();
        view.load(&store, day(2), DEFAULT_DASHBOARD_DAYS).await.unwrap();

        let labels: Vec<&str> = view
            .daily_revenue_vs_expenses
            .iter()
            .map(|p| p.label.as_str())
            .collect();
        assert_eq!(labels, vec!["2023-05-01", "2023-05-02"]);
        assert_eq!(view.daily_revenue_vs_expenses[0].expenses, Money::ZERO);
        assert_eq!(view.daily_revenue_vs_expenses[1].revenue, Money::ZERO);
        assert_eq!(view.summary.net_profit, Money::new(-5000));
        assert_eq!(view.summary.average_daily_production_liters, 4.0);
    }

    #[tokio::test]
    async fn busy_while_fetching() {
        let store = seeded().await;
        let mut view = DashboardView::default();

        let window = view.begin_load(day(2), DEFAULT_DASHBOARD_DAYS).unwrap();
        assert!(view.busy());
        assert_eq!(view.begin_load(day(2), 1), Err(ViewError::Busy));

        let fetched = fetch_collections(&store, &window.filter()).await;
        view.finish_load(window, fetched).unwrap();
        assert!(!view.busy());
        assert_eq!(view.window, Some(window));
        assert_eq!(view.summary.total_production_liters, 120.0);
    }

    #[tokio::test]
    async fn failure_keeps_previous_figures() {
        let store = seeded().await;
        let mut view = DashboardView::default();
        view.load(&store, day(1), 1).await.unwrap();

        store.fail("offline");
        assert!(view.load(&store, day(2), 30).await.is_err());
        assert_eq!(view.summary.total_production_liters, 120.0);
        assert!(view.notice().is_some());
    }
}
