//! Users table (minimal entity).
//!
//! Records and sessions reference a user by `user_id`, which is the login
//! identifier (the email). Secrets are stored as bcrypt hashes.

use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine};

/// bcrypt reads at most this many bytes of a secret.
pub const MAX_SECRET_BYTES: usize = 72;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Salted bcrypt hash of `secret`, salt and cost embedded.
pub(crate) fn hash_secret(secret: &str, cost: u32) -> ResultEngine<String> {
    bcrypt::hash(secret, cost).map_err(|err| EngineError::Hashing(err.to_string()))
}

impl Model {
    /// A stored hash bcrypt cannot parse never matches.
    pub(crate) fn verify(&self, secret: &str) -> bool {
        bcrypt::verify(secret, &self.password_hash).unwrap_or(false)
    }
}
