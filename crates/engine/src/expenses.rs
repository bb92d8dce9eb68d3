//! Farm expense records.

use api_types::expense::{Expense, ExpenseCategory};
use sea_orm::entity::prelude::*;

use crate::{
    EngineError, ResultEngine,
    util::{parse_stored, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub date: Date,
    pub amount_cents: i64,
    pub category: String,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Expense {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            date: model.date,
            amount_cents: model.amount_cents,
            category: parse_stored::<ExpenseCategory>(&model.category, "category")?,
            description: model.description,
        })
    }
}
