//! Milk sales records.

use api_types::sale::Sale;
use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub date: Date,
    pub quantity_liters: f64,
    pub price_per_liter_cents: i64,
    /// Quantity times price, rounded to the centavo when the sale was inserted.
    pub total_amount_cents: i64,
    pub buyer: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Sale {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "sale")?,
            date: model.date,
            quantity_liters: model.quantity_liters,
            price_per_liter_cents: model.price_per_liter_cents,
            total_amount_cents: model.total_amount_cents,
            buyer: model.buyer,
            notes: model.notes,
        })
    }
}
