use chrono::TimeDelta;

use crate::{EngineError, ResultEngine};
use sea_orm::DatabaseConnection;

mod auth;
mod records;

/// Default lifetime of a session.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;
/// Longest accepted session lifetime: one year.
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 3600;
/// Cheapest bcrypt cost accepted for secret hashes.
pub const MIN_HASH_COST: u32 = 4;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Persistence and authentication over a SeaORM database.
///
/// Every record operation is scoped to a `user_id`: a user never sees,
/// lists or deletes another user's records.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    session_ttl: TimeDelta,
    hash_cost: u32,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// How long a new or refreshed session stays valid.
    pub fn session_ttl(&self) -> TimeDelta {
        self.session_ttl
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    session_ttl: Option<TimeDelta>,
    hash_cost: Option<u32>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the session lifetime (default: one hour). Checked by
    /// [`EngineBuilder::build`]: it must be positive and at most
    /// [`MAX_SESSION_TTL_SECS`].
    pub fn session_ttl(mut self, ttl: TimeDelta) -> EngineBuilder {
        self.session_ttl = Some(ttl);
        self
    }

    /// bcrypt cost of new secret hashes (default: `bcrypt::DEFAULT_COST`).
    /// Must lie in `MIN_HASH_COST..=31`.
    pub fn hash_cost(mut self, cost: u32) -> EngineBuilder {
        self.hash_cost = Some(cost);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let session_ttl = match self.session_ttl {
            None => TimeDelta::seconds(DEFAULT_SESSION_TTL_SECS),
            Some(ttl)
                if ttl > TimeDelta::zero() && ttl.num_seconds() <= MAX_SESSION_TTL_SECS =>
            {
                ttl
            }
            Some(ttl) => {
                return Err(EngineError::InvalidRange(format!(
                    "session ttl must be between 1 and {MAX_SESSION_TTL_SECS} seconds, got {}",
                    ttl.num_seconds()
                )));
            }
        };

        let hash_cost = self.hash_cost.unwrap_or(bcrypt::DEFAULT_COST);
        if !(MIN_HASH_COST..=31).contains(&hash_cost) {
            return Err(EngineError::InvalidRange(format!(
                "hash cost must be between {MIN_HASH_COST} and 31, got {hash_cost}"
            )));
        }

        Ok(Engine {
            database: self.database,
            session_ttl,
            hash_cost,
        })
    }
}
