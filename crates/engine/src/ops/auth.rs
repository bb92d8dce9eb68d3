use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Session, sessions,
    users::{self, MAX_SECRET_BYTES, hash_secret},
};

use super::{Engine, with_tx};

/// Identifiers are emails: compared trimmed and lowercased.
fn normalize_identifier(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("identifier is required".to_string()));
    }
    Ok(trimmed.to_lowercase())
}

impl Engine {
    /// When a session opened or refreshed at `now` runs out.
    fn expiry_from(&self, now: DateTime<Utc>) -> ResultEngine<DateTime<Utc>> {
        now.checked_add_signed(self.session_ttl)
            .ok_or_else(|| EngineError::InvalidRange("session expiry out of range".to_string()))
    }

    /// Creates a user able to sign in with `identifier` and `secret`.
    pub async fn create_user(&self, identifier: &str, secret: &str) -> ResultEngine<()> {
        let identifier = normalize_identifier(identifier)?;
        if secret.is_empty() {
            return Err(EngineError::Validation("secret is required".to_string()));
        }
        if secret.len() > MAX_SECRET_BYTES {
            return Err(EngineError::Validation(format!(
                "secret must be at most {MAX_SECRET_BYTES} bytes"
            )));
        }
        let password_hash = hash_secret(secret, self.hash_cost)?;

        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(identifier.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(identifier));
            }

            users::ActiveModel {
                username: ActiveValue::Set(identifier.clone()),
                password_hash: ActiveValue::Set(password_hash),
            }
            .insert(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Checks the credentials and opens a new session.
    ///
    /// Unknown identifiers and wrong secrets fail the same way.
    pub async fn sign_in(&self, identifier: &str, secret: &str) -> ResultEngine<Session> {
        let identifier =
            normalize_identifier(identifier).map_err(|_| EngineError::InvalidCredentials)?;
        let user = users::Entity::find_by_id(identifier)
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;
        if !user.verify(secret) {
            return Err(EngineError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.username,
            created_at: now,
            expires_at: self.expiry_from(now)?,
        };
        sessions::ActiveModel::from(&session)
            .insert(&self.database)
            .await?;
        Ok(session)
    }

    /// Returns the session behind `token` if it exists and has not expired.
    ///
    /// An expired session is removed on the way out.
    pub async fn session(&self, token: &str) -> ResultEngine<Session> {
        let session: Session = sessions::Entity::find_by_id(token.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthenticated)?
            .into();

        if !session.is_valid_at(Utc::now()) {
            sessions::Entity::delete_by_id(token.to_string())
                .exec(&self.database)
                .await?;
            return Err(EngineError::Unauthenticated);
        }
        Ok(session)
    }

    /// Pushes the expiry of a still valid session one TTL into the future.
    pub async fn refresh_session(&self, token: &str) -> ResultEngine<Session> {
        let mut session = self.session(token).await?;
        session.expires_at = self.expiry_from(Utc::now())?;

        sessions::ActiveModel {
            token: ActiveValue::Set(session.token.clone()),
            expires_at: ActiveValue::Set(session.expires_at),
            ..Default::default()
        }
        .update(&self.database)
        .await?;
        Ok(session)
    }

    /// Ends a session. Ending an unknown session is not an error.
    pub async fn sign_out(&self, token: &str) -> ResultEngine<()> {
        sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.database)
            .await?;
        Ok(())
    }

    /// Removes every expired session and returns how many were dropped.
    pub async fn purge_expired_sessions(&self) -> ResultEngine<u64> {
        let res = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(Utc::now()))
            .exec(&self.database)
            .await?;
        Ok(res.rows_affected)
    }
}
