use chrono::NaiveDate;
use engine::{
    CategoryPoint, ChartPoint, Granularity, Period, ProductionSalesPoint, RevenueExpensePoint,
    SummaryStats, Window,
    aggregate::{expenses_by_category, production_series, production_vs_sales, revenue_vs_expenses},
    compute_summary,
};

use super::{Collections, Notice, fetch_collections};
use crate::{
    error::ViewError,
    store::{ClientResult, RecordStore},
};

/// Monthly report for one [`Period`].
#[derive(Debug, Default)]
pub struct ReportView {
    pub period: Period,
    pub window: Option<Window>,
    pub summary: SummaryStats,
    pub monthly_production: Vec<ChartPoint>,
    pub production_vs_sales: Vec<ProductionSalesPoint>,
    pub expenses_by_category: Vec<CategoryPoint>,
    pub monthly_revenue_vs_expenses: Vec<RevenueExpensePoint>,
    busy: bool,
    notice: Option<Notice>,
}

impl ReportView {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            ..Self::default()
        }
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Marks the view busy and returns the window of the selected period.
    pub fn begin_load(&mut self, today: NaiveDate) -> Result<Window, ViewError> {
        if self.busy {
            return Err(ViewError::Busy);
        }
        self.busy = true;
        Ok(self.period.window(today))
    }

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
                tracing::warn!("failed to load {} report: {err}", self.period);
                self.notice = Some(Notice::error("Erro ao carregar relatório", err.to_string()));
                return Err(err);
            }
        };

        self.summary = compute_summary(&productions, &sales, &expenses, window.days());
        self.monthly_production = production_series(&productions, Granularity::Month);
        self.production_vs_sales = production_vs_sales(&productions, &sales, Granularity::Month);
        self.expenses_by_category = expenses_by_category(&expenses);
        self.monthly_revenue_vs_expenses =
            revenue_vs_expenses(&sales, &expenses, Granularity::Month);
        self.window = Some(window);
        Ok(())
    }

    pub async fn load<S: RecordStore>(&mut self, store: &S, today: NaiveDate) -> Result<(), ViewError> {
        let window = self.begin_load(today)?;
        let fetched = fetch_collections(store, &window.filter()).await;
        self.finish_load(window, fetched)
    }
}
