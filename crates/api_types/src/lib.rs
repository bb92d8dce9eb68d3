use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// The record collections exposed by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Production,
    Sales,
    Expenses,
}

impl Collection {
    /// URL path segment (and table name) of the collection.
    pub fn path(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sales => "sales",
            Self::Expenses => "expenses",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A persisted record kind.
///
/// Ties a record to its collection and to the payload used to create it, so
/// store implementations can stay generic over the three collections.
pub trait Record:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Payload sent to the store to create a record. Carries no identifier.
    type New: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    const COLLECTION: Collection;

    fn id(&self) -> Uuid;

    fn date(&self) -> NaiveDate;
}

/// Date window used when listing records.
///
/// Both bounds are inclusive calendar dates and both are optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

pub mod production {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum Quality {
        A,
        B,
        C,
    }

    impl Quality {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::A => "A",
                Self::B => "B",
                Self::C => "C",
            }
        }
    }

    impl TryFrom<&str> for Quality {
        type Error = String;

        fn try_from(value: &str) -> Result<Self, Self::Error> {
            match value.trim() {
                "A" | "a" => Ok(Self::A),
                "B" | "b" => Ok(Self::B),
                "C" | "c" => Ok(Self::C),
                other => Err(format!("unknown quality: {other}")),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ProductionNew {
        pub date: NaiveDate,
        pub quantity_liters: f64,
        pub cow_count: u32,
        pub quality: Quality,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Production {
        pub id: Uuid,
        pub date: NaiveDate,
        pub quantity_liters: f64,
        pub cow_count: u32,
        pub quality: Quality,
        pub notes: Option<String>,
    }

    impl Record for Production {
        type New = ProductionNew;

        const COLLECTION: Collection = Collection::Production;

        fn id(&self) -> Uuid {
            self.id
        }

        fn date(&self) -> NaiveDate {
            self.date
        }
    }
}

pub mod sale {
    use super::*;

    /// A sale as entered by the user.
    ///
    /// The total is not part of the payload: the store computes it from
    /// quantity and price when the sale is inserted.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SaleNew {
        pub date: NaiveDate,
        pub quantity_liters: f64,
        pub price_per_liter_cents: i64,
        pub buyer: String,
        pub notes: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Sale {
        pub id: Uuid,
        pub date: NaiveDate,
        pub quantity_liters: f64,
        pub price_per_liter_cents: i64,
        /// Total persisted at insert time. Authoritative for revenue.
        pub total_amount_cents: i64,
        pub buyer: String,
        pub notes: Option<String>,
    }

    impl Record for Sale {
        type New = SaleNew;

        const COLLECTION: Collection = Collection::Sales;

        fn id(&self) -> Uuid {
            self.id
        }

        fn date(&self) -> NaiveDate {
            self.date
        }
    }
}

pub mod expense {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ExpenseCategory {
        Feed,
        Medication,
        Equipment,
        Labor,
        Other,
    }

    impl ExpenseCategory {
        /// Returns the canonical key used by the store and by bucketing.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Feed => "feed",
                Self::Medication => "medication",
                Self::Equipment => "equipment",
                Self::Labor => "labor",
                Self::Other => "other",
            }
        }

        /// Label shown to the user.
        pub fn label(self) -> &'static str {
            match self {
                Self::Feed => "Alimentação",
                Self::Medication => "Medicamentos",
                Self::Equipment => "Equipamentos",
                Self::Labor => "Mão de obra",
                Self::Other => "Outros",
            }
        }
    }

    impl TryFrom<&str> for ExpenseCategory {
        type Error = String;

        fn try_from(value: &str) -> Result<Self, Self::Error> {
            match value.trim().to_lowercase().as_str() {
                "feed" => Ok(Self::Feed),
                "medication" => Ok(Self::Medication),
                "equipment" => Ok(Self::Equipment),
                "labor" => Ok(Self::Labor),
                "other" => Ok(Self::Other),
                other => Err(format!("unknown expense category: {other}")),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub date: NaiveDate,
        pub amount_cents: i64,
        pub category: ExpenseCategory,
        pub description: String,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: Uuid,
        pub date: NaiveDate,
        pub amount_cents: i64,
        pub category: ExpenseCategory,
        pub description: String,
    }

    impl Record for Expense {
        type New = ExpenseNew;

        const COLLECTION: Collection = Collection::Expenses;

        fn id(&self) -> Uuid {
            self.id
        }

        fn date(&self) -> NaiveDate {
            self.date
        }
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignIn {
        /// Login identifier (the user's email).
        pub identifier: String,
        pub secret: String,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SessionView {
        /// Opaque bearer token.
        pub token: String,
        pub identifier: String,
        pub expires_at: DateTime<Utc>,
    }

    impl SessionView {
        /// Returns `true` if the session is still valid at `now`.
        pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
            self.expires_at > now
        }
    }
}
