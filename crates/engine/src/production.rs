//! Milk production records.

use api_types::production::{Production, Quality};
use sea_orm::entity::prelude::*;

use crate::{
    EngineError, ResultEngine,
    util::{parse_stored, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "production")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub date: Date,
    pub quantity_liters: f64,
    pub cow_count: i32,
    pub quality: String,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Production {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let cow_count = u32::try_from(model.cow_count)
            .map_err(|_| EngineError::Corrupted("negative cow_count".to_string()))?;

        Ok(Self {
            id: parse_uuid(&model.id, "production")?,
            date: model.date,
            quantity_liters: model.quantity_liters,
            cow_count,
            quality: parse_stored::<Quality>(&model.quality, "quality")?,
            notes: model.notes,
        })
    }
}
