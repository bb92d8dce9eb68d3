//! Seams to the two remote collaborators: the record store and the auth
//! service. Views and the session gate only see these traits, so tests can
//! drive them with in-memory fakes.

use std::future::Future;

use api_types::{Record, RecordFilter, auth::SessionView};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::ClientError;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

pub trait RecordStore: Send + Sync {
    /// Creates a record; the store assigns its id.
    fn insert<R: Record>(&self, new: &R::New) -> impl Future<Output = ClientResult<R>> + Send;

    /// Records inside the filter's inclusive bounds, newest date first.
    fn list<R: Record>(
        &self,
        filter: &RecordFilter,
    ) -> impl Future<Output = ClientResult<Vec<R>>> + Send;

    fn delete<R: Record>(&self, id: Uuid) -> impl Future<Output = ClientResult<()>> + Send;
}

/// Change of the remote session noticed by the auth collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
    /// A request was rejected because the session expired or was revoked.
    Invalidated,
}

pub trait AuthProvider: Send + Sync {
    fn sign_in(
        &self,
        identifier: &str,
        secret: &str,
    ) -> impl Future<Output = ClientResult<SessionView>> + Send;

    /// The current session, `None` when there is none or it expired.
    fn get_session(&self) -> impl Future<Output = ClientResult<Option<SessionView>>> + Send;

    fn sign_out(&self) -> impl Future<Output = ClientResult<()>> + Send;

    /// Receiver of session changes. Holds `None` until the first change.
    fn session_changes(&self) -> watch::Receiver<Option<SessionEvent>>;
}
