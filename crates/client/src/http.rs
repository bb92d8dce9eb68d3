//! HTTP client for the record store service.

use api_types::{
    Record, RecordFilter,
    auth::{SessionView, SignIn},
};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use crate::{
    error::ClientError,
    store::{AuthProvider, ClientResult, RecordStore, SessionEvent},
};

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Talks to the REST service and keeps the bearer token of the current
/// session.
///
/// Any `401` on an authenticated request drops the cached token and
/// publishes [`SessionEvent::Invalidated`].
#[derive(Debug)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    token: RwLock<Option<String>>,
    events: watch::Sender<Option<SessionEvent>>,
}

impl Client {
    /// `token` is a previously cached session token, if any.
    pub fn new(base_url: &str, token: Option<String>) -> ClientResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let (events, _) = watch::channel(None);
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            token: RwLock::new(token),
            events,
        })
    }

    /// The token to persist between runs.
    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Extends the current session by one server-side TTL.
    pub async fn refresh_session(&self) -> ClientResult<SessionView> {
        let res = self
            .authorized(self.http.post(self.endpoint("auth/refresh")?))
            .await?;
        let res = self.check(res).await?;
        Ok(res.json::<SessionView>().await?)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::InvalidUrl(err.to_string()))
    }

    /// Attaches the bearer token and sends. Without a token nothing is sent.
    async fn authorized(&self, request: RequestBuilder) -> ClientResult<Response> {
        let Some(token) = self.token().await else {
            return Err(ClientError::Unauthorized);
        };
        Ok(request.bearer_auth(token).send().await?)
    }

    async fn check(&self, res: Response) -> ClientResult<Response> {
        if res.status().is_success() {
            return Ok(res);
        }
        if res.status() == StatusCode::UNAUTHORIZED {
            self.invalidate().await;
        }
        Err(error_from_response(res).await)
    }

    async fn invalidate(&self) {
        if self.token.write().await.take().is_some() {
            tracing::warn!("session rejected by the server");
        }
        self.events.send_replace(Some(SessionEvent::Invalidated));
    }
}

async fn error_from_response(res: Response) -> ClientError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    match status.as_u16() {
        401 => ClientError::Unauthorized,
        404 => ClientError::NotFound,
        409 => ClientError::Conflict(body),
        422 => ClientError::Validation(body),
        _ => ClientError::Server(body),
    }
}

impl RecordStore for Client {
    async fn insert<R: Record>(&self, new: &R::New) -> ClientResult<R> {
        let endpoint = self.endpoint(R::COLLECTION.path())?;
        let res = self.authorized(self.http.post(endpoint).json(new)).await?;
        let res = self.check(res).await?;
        Ok(res.json::<R>().await?)
    }

    async fn list<R: Record>(&self, filter: &RecordFilter) -> ClientResult<Vec<R>> {
        let endpoint = self.endpoint(R::COLLECTION.path())?;
        let res = self.authorized(self.http.get(endpoint).query(filter)).await?;
        let res = self.check(res).await?;
        Ok(res.json::<Vec<R>>().await?)
    }

    async fn delete<R: Record>(&self, id: Uuid) -> ClientResult<()> {
        let endpoint = self.endpoint(&format!("{}/{id}", R::COLLECTION.path()))?;
        let res = self.authorized(self.http.delete(endpoint)).await?;
        self.check(res).await?;
        Ok(())
    }
}

impl AuthProvider for Client {
    async fn sign_in(&self, identifier: &str, secret: &str) -> ClientResult<SessionView> {
        let payload = SignIn {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        };
        let res = self
            .http
            .post(self.endpoint("auth/signin")?)
            .json(&payload)
            .send()
            .await?;

        if res.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::InvalidCredentials);
        }
        if !res.status().is_success() {
            return Err(error_from_response(res).await);
        }

        let session = res.json::<SessionView>().await?;
        *self.token.write().await = Some(session.token.clone());
        self.events.send_replace(Some(SessionEvent::SignedIn));
        Ok(session)
    }

    async fn get_session(&self) -> ClientResult<Option<SessionView>> {
        if self.token().await.is_none() {
            return Ok(None);
        }
        let res = self
            .authorized(self.http.get(self.endpoint("auth/session")?))
            .await?;
        match self.check(res).await {
            Ok(res) => Ok(Some(res.json::<SessionView>().await?)),
            Err(ClientError::Unauthorized) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn sign_out(&self) -> ClientResult<()> {
        let token = self.token.write().await.take();
        self.events.send_replace(Some(SessionEvent::SignedOut));
        let Some(token) = token else {
            return Ok(());
        };

        let res = self
            .http
            .post(self.endpoint("auth/signout")?)
            .bearer_auth(token)
            .send()
            .await?;
        // The session may already be gone server side.
        if res.status().is_success() || res.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Err(error_from_response(res).await)
    }

    fn session_changes(&self) -> watch::Receiver<Option<SessionEvent>> {
        self.events.subscribe()
    }
}
