//! Core of Farm Milk Monitor.
//!
//! The crate has two halves:
//!
//! - a pure half ([`aggregate`], [`format`], [`Window`], [`Money`],
//!   [`Validate`]) used by every client to turn fetched records into
//!   summaries and chart series;
//! - the [`Engine`], which persists records and sessions through SeaORM and
//!   backs the REST service.

pub use aggregate::{
    CategoryPoint, ChartPoint, MergedPoint, ProductionSalesPoint, RevenueExpensePoint,
    SummaryStats, bucket_by_key, compute_summary, merge_on_union,
};
pub use error::EngineError;
pub use format::{format_currency, format_date, format_day_label, format_naive_date};
pub use money::Money;
pub use ops::{
    DEFAULT_SESSION_TTL_SECS, Engine, EngineBuilder, MAX_SESSION_TTL_SECS, MIN_HASH_COST,
};
pub use sessions::Session;
pub use validate::{Validate, validate_filter};
pub use window::{Granularity, Period, Window};

pub mod aggregate;
mod error;
mod expenses;
pub mod format;
mod money;
mod ops;
mod production;
mod sales;
mod sessions;
mod users;
mod util;
mod validate;
mod window;

pub type ResultEngine<T> = Result<T, EngineError>;
