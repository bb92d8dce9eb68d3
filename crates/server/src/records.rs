//! Record collection endpoints
//!
//! The three collections share one set of handlers, dispatched to the engine
//! through [`StoredRecord`].

use std::future::Future;

use api_types::{
    Record, RecordFilter,
    expense::{Expense, ExpenseNew},
    production::{Production, ProductionNew},
    sale::{Sale, SaleNew},
};
use axum::{
    Extension, Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{Engine, ResultEngine, Session};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

/// Engine operations backing one collection.
pub trait StoredRecord: Record {
    fn insert(
        engine: &Engine,
        user_id: &str,
        new: &Self::New,
    ) -> impl Future<Output = ResultEngine<Self>> + Send;

    fn list(
        engine: &Engine,
        user_id: &str,
        filter: &RecordFilter,
    ) -> impl Future<Output = ResultEngine<Vec<Self>>> + Send;

    fn delete(
        engine: &Engine,
        user_id: &str,
        id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send;
}

impl StoredRecord for Production {
    fn insert(
        engine: &Engine,
        user_id: &str,
        new: &ProductionNew,
    ) -> impl Future<Output = ResultEngine<Self>> + Send {
        engine.insert_production(user_id, new)
    }

    fn list(
        engine: &Engine,
        user_id: &str,
        filter: &RecordFilter,
    ) -> impl Future<Output = ResultEngine<Vec<Self>>> + Send {
        engine.list_production(user_id, filter)
    }

    fn delete(
        engine: &Engine,
        user_id: &str,
        id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send {
        engine.delete_production(user_id, id)
    }
}

impl StoredRecord for Sale {
    fn insert(
        engine: &Engine,
        user_id: &str,
        new: &SaleNew,
    ) -> impl Future<Output = ResultEngine<Self>> + Send {
        engine.insert_sale(user_id, new)
    }

    fn list(
        engine: &Engine,
        user_id: &str,
        filter: &RecordFilter,
    ) -> impl Future<Output = ResultEngine<Vec<Self>>> + Send {
        engine.list_sales(user_id, filter)
    }

    fn delete(
        engine: &Engine,
        user_id: &str,
        id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send {
        engine.delete_sale(user_id, id)
    }
}

impl StoredRecord for Expense {
    fn insert(
        engine: &Engine,
        user_id: &str,
        new: &ExpenseNew,
    ) -> impl Future<Output = ResultEngine<Self>> + Send {
        engine.insert_expense(user_id, new)
    }

    fn list(
        engine: &Engine,
        user_id: &str,
        filter: &RecordFilter,
    ) -> impl Future<Output = ResultEngine<Vec<Self>>> + Send {
        engine.list_expenses(user_id, filter)
    }

    fn delete(
        engine: &Engine,
        user_id: &str,
        id: Uuid,
    ) -> impl Future<Output = ResultEngine<()>> + Send {
        engine.delete_expense(user_id, id)
    }
}

/// Handle requests for listing a collection, newest date first
pub async fn list<R: StoredRecord>(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    filter: Result<Query<RecordFilter>, QueryRejection>,
) -> Result<Json<Vec<R>>, ServerError> {
    let Query(filter) = filter?;
    let records = R::list(&state.engine, &session.user_id, &filter).await?;
    Ok(Json(records))
}

/// Handle requests for creating a record
pub async fn create<R: StoredRecord>(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    payload: Result<Json<R::New>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ServerError> {
    let Json(payload) = payload?;
    let record = R::insert(&state.engine, &session.user_id, &payload).await?;
    tracing::debug!("{} record {} created", R::COLLECTION, record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

/// Handle requests for deleting a record
pub async fn remove<R: StoredRecord>(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(id) = id?;
    R::delete(&state.engine, &session.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
