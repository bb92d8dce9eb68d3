use api_types::{
    RecordFilter,
    expense::{Expense, ExpenseNew},
    production::{Production, ProductionNew},
    sale::{Sale, SaleNew},
};
use chrono::Utc;
use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Money, ResultEngine, Validate, expenses, production, sales,
    validate::validate_filter,
};

use super::Engine;

/// Inclusive date bounds on `column`; a missing bound is not applied.
fn date_condition<C: ColumnTrait>(column: C, filter: &RecordFilter) -> Condition {
    Condition::all()
        .add_option(filter.date_from.map(|from| column.gte(from)))
        .add_option(filter.date_to.map(|to| column.lte(to)))
}

fn not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(id.to_string())
}

impl Engine {
    /// Records a day of milk production.
    pub async fn insert_production(
        &self,
        user_id: &str,
        new: &ProductionNew,
    ) -> ResultEngine<Production> {
        let new = new.normalized();
        new.validate()?;
        let cow_count = i32::try_from(new.cow_count)
            .map_err(|_| EngineError::Validation("cow count too large".to_string()))?;

        let model = production::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            date: ActiveValue::Set(new.date),
            quantity_liters: ActiveValue::Set(new.quantity_liters),
            cow_count: ActiveValue::Set(cow_count),
            quality: ActiveValue::Set(new.quality.as_str().to_string()),
            notes: ActiveValue::Set(new.notes),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;

        Production::try_from(model)
    }

    /// Lists production records, newest date first.
    pub async fn list_production(
        &self,
        user_id: &str,
        filter: &RecordFilter,
    ) -> ResultEngine<Vec<Production>> {
        validate_filter(filter)?;
        production::Entity::find()
            .filter(production::Column::UserId.eq(user_id))
            .filter(date_condition(production::Column::Date, filter))
            .order_by_desc(production::Column::Date)
            .order_by_desc(production::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Production::try_from)
            .collect()
    }

    pub async fn delete_production(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        let res = production::Entity::delete_many()
            .filter(production::Column::Id.eq(id.to_string()))
            .filter(production::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Records a sale.
    ///
    /// The total is computed here, once, as quantity times price rounded to
    /// the centavo, and persisted with the sale.
    pub async fn insert_sale(&self, user_id: &str, new: &SaleNew) -> ResultEngine<Sale> {
        let new = new.normalized();
        new.validate()?;
        let total = Money::for_quantity(new.quantity_liters, Money::new(new.price_per_liter_cents))
            .ok_or_else(|| EngineError::Validation("sale total out of range".to_string()))?;

        let model = sales::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            date: ActiveValue::Set(new.date),
            quantity_liters: ActiveValue::Set(new.quantity_liters),
            price_per_liter_cents: ActiveValue::Set(new.price_per_liter_cents),
            total_amount_cents: ActiveValue::Set(total.cents()),
            buyer: ActiveValue::Set(new.buyer),
            notes: ActiveValue::Set(new.notes),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;

        Sale::try_from(model)
    }

    /// Lists sales, newest date first.
    pub async fn list_sales(&self, user_id: &str, filter: &RecordFilter) -> ResultEngine<Vec<Sale>> {
        validate_filter(filter)?;
        sales::Entity::find()
            .filter(sales::Column::UserId.eq(user_id))
            .filter(date_condition(sales::Column::Date, filter))
            .order_by_desc(sales::Column::Date)
            .order_by_desc(sales::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Sale::try_from)
            .collect()
    }

    pub async fn delete_sale(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        let res = sales::Entity::delete_many()
            .filter(sales::Column::Id.eq(id.to_string()))
            .filter(sales::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Records an expense.
    pub async fn insert_expense(&self, user_id: &str, new: &ExpenseNew) -> ResultEngine<Expense> {
        let new = new.normalized();
        new.validate()?;

        let model = expenses::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            date: ActiveValue::Set(new.date),
            amount_cents: ActiveValue::Set(new.amount_cents),
            category: ActiveValue::Set(new.category.as_str().to_string()),
            description: ActiveValue::Set(new.description),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await?;

        Expense::try_from(model)
    }

    /// Lists expenses, newest date first.
    pub async fn list_expenses(
        &self,
        user_id: &str,
        filter: &RecordFilter,
    ) -> ResultEngine<Vec<Expense>> {
        validate_filter(filter)?;
        expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id))
            .filter(date_condition(expenses::Column::Date, filter))
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    pub async fn delete_expense(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        let res = expenses::Entity::delete_many()
            .filter(expenses::Column::Id.eq(id.to_string()))
            .filter(expenses::Column::UserId.eq(user_id))
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
