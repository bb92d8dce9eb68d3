//! Session gate guarding the protected commands.
//!
//! `Checking` moves to `Authenticated` only when the auth service returns a
//! live session *and* the local remembered flag is set. Everything else,
//! including a failed query, ends in `Unauthenticated` with a redirect to the
//! login entry point.

use api_types::auth::SessionView;
use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    error::ClientError,
    store::{AuthProvider, SessionEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateStatus {
    Checking,
    Authenticated,
    Unauthenticated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// The local remembered flag is not set.
    NotRemembered,
    NoSession,
    Expired,
    /// The session query failed; the gate fails closed.
    QueryFailed(String),
    SignedOut,
    Invalidated,
}

impl DenyReason {
    pub fn message(&self) -> String {
        match self {
            Self::NotRemembered | Self::NoSession => "Você não está autenticado".to_string(),
            Self::Expired | Self::Invalidated => "Sessão expirada".to_string(),
            Self::QueryFailed(err) => format!("Não foi possível verificar a sessão: {err}"),
            Self::SignedOut => "Sessão encerrada".to_string(),
        }
    }

    /// `false` when the session could not be checked: the cached token may
    /// still be valid and is kept for the next attempt.
    pub fn ends_session(&self) -> bool {
        !matches!(self, Self::QueryFailed(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Granted(SessionView),
    Denied(DenyReason),
}

/// Where a denied caller is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redirect {
    Login,
}

/// Decides on the outcome of a single session query.
pub fn evaluate(
    remembered: bool,
    query: Result<Option<SessionView>, ClientError>,
    now: DateTime<Utc>,
) -> GateDecision {
    let session = match query {
        Ok(Some(session)) => session,
        Ok(None) => return GateDecision::Denied(DenyReason::NoSession),
        Err(err) => return GateDecision::Denied(DenyReason::QueryFailed(err.to_string())),
    };
    if !session.is_valid_at(now) {
        return GateDecision::Denied(DenyReason::Expired);
    }
    if !remembered {
        return GateDecision::Denied(DenyReason::NotRemembered);
    }
    GateDecision::Granted(session)
}

pub struct SessionGate<'a, A> {
    auth: &'a A,
    remembered: bool,
    changes: watch::Receiver<Option<SessionEvent>>,
    decision: Option<GateDecision>,
}

impl<'a, A: AuthProvider> SessionGate<'a, A> {
    /// `remembered` is the local opt-in flag, read by the caller.
    pub fn new(auth: &'a A, remembered: bool) -> Self {
        Self {
            auth,
            remembered,
            changes: auth.session_changes(),
            decision: None,
        }
    }

    pub fn status(&self) -> GateStatus {
        match self.decision {
            None => GateStatus::Checking,
            Some(GateDecision::Granted(_)) => GateStatus::Authenticated,
            Some(GateDecision::Denied(_)) => GateStatus::Unauthenticated,
        }
    }

    pub fn session(&self) -> Option<&SessionView> {
        match &self.decision {
            Some(GateDecision::Granted(session)) => Some(session),
            _ => None,
        }
    }

    /// Issues the session query and settles the gate.
    ///
    /// Only a gate still in `Checking` queries; a settled gate answers with
    /// its last decision.
    pub async fn check(&mut self) -> GateDecision {
        if let Some(decision) = &self.decision {
            return decision.clone();
        }

        let query = self.auth.get_session().await;
        let decision = evaluate(self.remembered, query, Utc::now());
        if let GateDecision::Denied(reason) = &decision {
            tracing::debug!("session gate denied: {reason:?}");
        }
        self.decision = Some(decision.clone());
        decision
    }

    /// Re-evaluates after a session change.
    ///
    /// Sign-out and invalidation move the gate to `Unauthenticated` and
    /// return the redirect.
    pub fn on_session_change(&mut self, event: SessionEvent) -> Option<Redirect> {
        let reason = match event {
            SessionEvent::SignedIn => return None,
            SessionEvent::SignedOut => DenyReason::SignedOut,
            SessionEvent::Invalidated => DenyReason::Invalidated,
        };
        tracing::debug!("session gate closed: {reason:?}");
        self.decision = Some(GateDecision::Denied(reason));
        self.redirect()
    }

    /// Waits for the next session change that closes the gate.
    ///
    /// Returns `None` if the auth provider went away.
    pub async fn closed(&mut self) -> Option<Redirect> {
        loop {
            self.changes.changed().await.ok()?;
            let event = *self.changes.borrow_and_update();
            if let Some(redirect) = event.and_then(|event| self.on_session_change(event)) {
                return Some(redirect);
            }
        }
    }

    pub fn redirect(&self) -> Option<Redirect> {
        (self.status() == GateStatus::Unauthenticated).then_some(Redirect::Login)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::testing::FakeAuth;

    fn session(expires_in: TimeDelta) -> SessionView {
        SessionView {
            token: "t".to_string(),
            identifier: "alice@farm.test".to_string(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn evaluate_requires_both_session_and_flag() {
        let now = Utc::now();
        let live = session(TimeDelta::hours(1));

        assert_eq!(
            evaluate(true, Ok(Some(live.clone())), now),
            GateDecision::Granted(live.clone())
        );
        assert_eq!(
            evaluate(false, Ok(Some(live)), now),
            GateDecision::Denied(DenyReason::NotRemembered)
        );
        assert_eq!(
            evaluate(true, Ok(None), now),
            GateDecision::Denied(DenyReason::NoSession)
        );
    }

    #[test]
    fn evaluate_rejects_expired_session() {
        let stale = session(TimeDelta::seconds(-1));
        assert_eq!(
            evaluate(true, Ok(Some(stale)), Utc::now()),
            GateDecision::Denied(DenyReason::Expired)
        );
    }

    #[test]
    fn evaluate_fails_closed() {
        let decision = evaluate(true, Err(ClientError::Server("boom".to_string())), Utc::now());
        assert!(matches!(
            decision,
            GateDecision::Denied(DenyReason::QueryFailed(_))
        ));
    }

    #[test]
    fn only_a_failed_query_keeps_the_cached_session() {
        assert!(!DenyReason::QueryFailed("offline".to_string()).ends_session());
        for reason in [
            DenyReason::NotRemembered,
            DenyReason::NoSession,
            DenyReason::Expired,
            DenyReason::SignedOut,
            DenyReason::Invalidated,
        ] {
            assert!(reason.ends_session(), "{reason:?}");
        }
    }

    #[tokio::test]
    async fn gate_starts_checking_and_queries_once() {
        let auth = FakeAuth::with_session(session(TimeDelta::hours(1)));
        let mut gate = SessionGate::new(&auth, true);
        assert_eq!(gate.status(), GateStatus::Checking);

        assert!(matches!(gate.check().await, GateDecision::Granted(_)));
        assert_eq!(gate.status(), GateStatus::Authenticated);
        assert_eq!(gate.redirect(), None);

        gate.check().await;
        assert_eq!(auth.session_queries(), 1);
    }

    #[tokio::test]
    async fn query_error_redirects_to_login() {
        let auth = FakeAuth::failing();
        let mut gate = SessionGate::new(&auth, true);
        assert!(matches!(gate.check().await, GateDecision::Denied(_)));
        assert_eq!(gate.status(), GateStatus::Unauthenticated);
        assert_eq!(gate.redirect(), Some(Redirect::Login));
    }

    #[tokio::test]
    async fn invalidation_after_mount_closes_gate() {
        let auth = FakeAuth::with_session(session(TimeDelta::hours(1)));
        let mut gate = SessionGate::new(&auth, true);
        gate.check().await;

        assert_eq!(gate.on_session_change(SessionEvent::SignedIn), None);
        assert_eq!(gate.status(), GateStatus::Authenticated);

        assert_eq!(
            gate.on_session_change(SessionEvent::Invalidated),
            Some(Redirect::Login)
        );
        assert_eq!(gate.status(), GateStatus::Unauthenticated);
        assert!(gate.session().is_none());
    }

    #[tokio::test]
    async fn closed_waits_for_a_closing_event() {
        let auth = FakeAuth::with_session(session(TimeDelta::hours(1)));
        let mut gate = SessionGate::new(&auth, true);
        gate.check().await;

        auth.publish(SessionEvent::Invalidated);
        assert_eq!(gate.closed().await, Some(Redirect::Login));
        assert_eq!(gate.status(), GateStatus::Unauthenticated);
    }
}
