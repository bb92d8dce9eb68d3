//! The module contains `Session` struct and its table.

use api_types::auth::SessionView;
use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};

/// A signed-in session.
///
/// The token is an opaque random value handed to the client, which sends it
/// back as a bearer token on every request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

impl From<Session> for SessionView {
    fn from(value: Session) -> Self {
        Self {
            token: value.token,
            identifier: value.user_id,
            expires_at: value.expires_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
    pub expires_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Session> for ActiveModel {
    fn from(value: &Session) -> Self {
        Self {
            token: ActiveValue::Set(value.token.clone()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            created_at: ActiveValue::Set(value.created_at),
            expires_at: ActiveValue::Set(value.expires_at),
        }
    }
}

impl From<Model> for Session {
    fn from(model: Model) -> Self {
        Self {
            token: model.token,
            user_id: model.user_id,
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}
