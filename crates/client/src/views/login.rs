use api_types::auth::SessionView;

use crate::{error::ViewError, local_state::LocalState, store::AuthProvider};

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
    /// Keep the identifier for the next login.
    pub remember: bool,
}

/// Signs in and records the outcome in `state`.
///
/// A failure clears the authenticated flag and is returned to the caller,
/// which stays on the login prompt.
pub async fn login<A: AuthProvider>(
    auth: &A,
    state: &mut LocalState,
    credentials: &Credentials,
) -> Result<SessionView, ViewError> {
    let identifier = credentials.identifier.trim();
    if identifier.is_empty() || credentials.secret.is_empty() {
        return Err(ViewError::Validation(
            "Por favor, preencha todos os campos".to_string(),
        ));
    }

    match auth.sign_in(identifier, &credentials.secret).await {
        Ok(session) => {
            state.signed_in(identifier, credentials.remember, Some(session.token.clone()));
            tracing::info!("signed in as {}", session.identifier);
            Ok(session)
        }
        Err(err) => {
            state.signed_out();
            Err(err.into())
        }
    }
}

/// Ends the session. The local flag is cleared even if the service fails.
pub async fn logout<A: AuthProvider>(auth: &A, state: &mut LocalState) -> Result<(), ViewError> {
    state.signed_out();
    auth.sign_out().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gate::{GateDecision, SessionGate},
        testing::{FakeAuth, IDENTIFIER, SECRET},
    };

    fn credentials(secret: &str, remember: bool) -> Credentials {
        Credentials {
            identifier: format!("  {IDENTIFIER} "),
            secret: secret.to_string(),
            remember,
        }
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_locally() {
        let auth = FakeAuth::signed_out();
        let mut state = LocalState::default();
        let err = login(&auth, &mut state, &Credentials::default()).await.unwrap_err();
        assert!(matches!(err, ViewError::Validation(_)));
    }

    #[tokio::test]
    async fn wrong_secret_clears_flag() {
        let auth = FakeAuth::signed_out();
        let mut state = LocalState {
            authenticated: true,
            ..Default::default()
        };
        let err = login(&auth, &mut state, &credentials("wrong", true))
            .await
            .unwrap_err();
        assert!(matches!(err, ViewError::Auth(_)));
        assert!(!state.authenticated);
    }

    #[tokio::test]
    async fn login_then_gate_then_logout() {
        let auth = FakeAuth::signed_out();
        let mut state = LocalState::default();
        login(&auth, &mut state, &credentials(SECRET, true)).await.unwrap();
        assert!(state.authenticated);
        assert_eq!(state.remembered_identifier.as_deref(), Some(IDENTIFIER));

        let mut gate = SessionGate::new(&auth, state.authenticated);
        assert!(matches!(gate.check().await, GateDecision::Granted(_)));

        logout(&auth, &mut state).await.unwrap();
        assert!(!state.authenticated);
        assert_eq!(gate.closed().await, Some(crate::gate::Redirect::Login));
    }
}
