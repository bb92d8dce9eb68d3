//! In-memory fakes of the store and auth traits.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use api_types::{Collection, Record, RecordFilter, auth::SessionView};
use serde_json::Value;
use tokio::sync::watch;
use uuid::Uuid;

use crate::{
    error::ClientError,
    store::{AuthProvider, ClientResult, RecordStore, SessionEvent},
};

pub const IDENTIFIER: &str = "alice@farm.test";
pub const SECRET: &str = "pasture";

/// Keeps records as JSON per collection. Sale totals are computed on insert
/// like the real service does.
#[derive(Default)]
pub struct FakeStore {
    records: Mutex<HashMap<Collection, Vec<Value>>>,
    fail_with: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl FakeStore {
    /// Every following call fails with `message`.
    pub fn fail(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.fail_with.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seed<R: Record>(&self, records: &[R]) {
        let mut all = self.records.lock().unwrap();
        let entry = all.entry(R::COLLECTION).or_default();
        entry.extend(records.iter().map(|r| serde_json::to_value(r).unwrap()));
    }

    fn begin(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_with.lock().unwrap().clone() {
            Some(message) => Err(ClientError::Server(message)),
            None => Ok(()),
        }
    }
}

impl RecordStore for FakeStore {
    async fn insert<R: Record>(&self, new: &R::New) -> ClientResult<R> {
        self.begin()?;
        let mut value = serde_json::to_value(new).unwrap();
        let object = value.as_object_mut().unwrap();
        object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        if R::COLLECTION == Collection::Sales {
            let liters = object["quantity_liters"].as_f64().unwrap();
            let price = object["price_per_liter_cents"].as_f64().unwrap();
            object.insert(
                "total_amount_cents".to_string(),
                Value::from((liters * price).round() as i64),
            );
        }
        let record: R = serde_json::from_value(value.clone()).unwrap();
        self.records
            .lock()
            .unwrap()
            .entry(R::COLLECTION)
            .or_default()
            .push(value);
        Ok(record)
    }

    async fn list<R: Record>(&self, filter: &RecordFilter) -> ClientResult<Vec<R>> {
        self.begin()?;
        let all = self.records.lock().unwrap();
        let mut records: Vec<R> = all
            .get(&R::COLLECTION)
            .into_iter()
            .flatten()
            .map(|v| serde_json::from_value(v.clone()).unwrap())
            .filter(|r: &R| filter.date_from.is_none_or(|from| r.date() >= from))
            .filter(|r: &R| filter.date_to.is_none_or(|to| r.date() <= to))
            .collect();
        records.sort_by(|a, b| b.date().cmp(&a.date()));
        Ok(records)
    }

    async fn delete<R: Record>(&self, id: Uuid) -> ClientResult<()> {
        self.begin()?;
        let mut all = self.records.lock().unwrap();
        let entry = all.entry(R::COLLECTION).or_default();
        let before = entry.len();
        entry.retain(|v| v["id"].as_str() != Some(id.to_string().as_str()));
        if entry.len() == before {
            return Err(ClientError::NotFound);
        }
        Ok(())
    }
}

pub struct FakeAuth {
    session: Mutex<Option<SessionView>>,
    failing: bool,
    queries: AtomicUsize,
    events: watch::Sender<Option<SessionEvent>>,
}

impl FakeAuth {
    fn build(session: Option<SessionView>, failing: bool) -> Self {
        Self {
            session: Mutex::new(session),
            failing,
            queries: AtomicUsize::new(0),
            events: watch::channel(None).0,
        }
    }

    pub fn signed_out() -> Self {
        Self::build(None, false)
    }

    pub fn with_session(session: SessionView) -> Self {
        Self::build(Some(session), false)
    }

    /// Every session query errors.
    pub fn failing() -> Self {
        Self::build(None, true)
    }

    pub fn session_queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn publish(&self, event: SessionEvent) {
        self.events.send_replace(Some(event));
    }
}

impl AuthProvider for FakeAuth {
    async fn sign_in(&self, identifier: &str, secret: &str) -> ClientResult<SessionView> {
        if identifier != IDENTIFIER || secret != SECRET {
            return Err(ClientError::InvalidCredentials);
        }
        let session = SessionView {
            token: Uuid::new_v4().simple().to_string(),
            identifier: identifier.to_string(),
            expires_at: chrono::Utc::now() + chrono::TimeDelta::hours(1),
        };
        *self.session.lock().unwrap() = Some(session.clone());
        self.publish(SessionEvent::SignedIn);
        Ok(session)
    }

    async fn get_session(&self) -> ClientResult<Option<SessionView>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ClientError::Server("auth service unavailable".to_string()));
        }
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> ClientResult<()> {
        self.session.lock().unwrap().take();
        self.publish(SessionEvent::SignedOut);
        Ok(())
    }

    fn session_changes(&self) -> watch::Receiver<Option<SessionEvent>> {
        self.events.subscribe()
    }
}
