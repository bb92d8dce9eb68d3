//! Terminal views. Each owns the records it renders and replaces them
//! wholesale after a fetch or a confirmed write.

pub use dashboard::{DEFAULT_DASHBOARD_DAYS, DashboardView};
pub use login::{Credentials, login, logout};
pub use records::{Listed, RecordsView};
pub use report::ReportView;

use api_types::{RecordFilter, expense::Expense, production::Production, sale::Sale};

use crate::store::{ClientResult, RecordStore};

mod dashboard;
mod login;
mod records;
mod report;

/// Productions, sales and expenses of one window.
pub type Collections = (Vec<Production>, Vec<Sale>, Vec<Expense>);

pub async fn fetch_collections<S: RecordStore>(
    store: &S,
    filter: &RecordFilter,
) -> ClientResult<Collections> {
    let productions = store.list::<Production>(filter).await?;
    let sales = store.list::<Sale>(filter).await?;
    let expenses = store.list::<Expense>(filter).await?;
    Ok((productions, sales, expenses))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A dismissable message shown above the view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.to_string(),
            message: message.into(),
        }
    }

    pub fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            message: message.into(),
        }
    }
}
