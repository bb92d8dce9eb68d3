//! Validation of new-record payloads.
//!
//! The same rules run in the client before any request is sent and in the
//! engine before anything is written, so an invalid form never reaches the
//! store or the aggregator.

use api_types::{RecordFilter, expense::ExpenseNew, production::ProductionNew, sale::SaleNew};

use crate::{EngineError, Money, ResultEngine};

pub trait Validate {
    fn validate(&self) -> ResultEngine<()>;

    /// Returns a copy with text fields trimmed and blank optionals removed.
    fn normalized(&self) -> Self
    where
        Self: Sized;
}

fn invalid(message: impl Into<String>) -> EngineError {
    EngineError::Validation(message.into())
}

fn require_quantity(value: f64, label: &str) -> ResultEngine<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{label} must be a number >= 0")));
    }
    Ok(())
}

fn require_cents(value: i64, label: &str) -> ResultEngine<()> {
    if value < 0 {
        return Err(invalid(format!("{label} must be >= 0")));
    }
    if value > Money::MAX_RECORD.cents() {
        return Err(invalid(format!("{label} must be <= {}", Money::MAX_RECORD)));
    }
    Ok(())
}

fn require_text(value: &str, label: &str) -> ResultEngine<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{label} is required")));
    }
    Ok(())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

impl Validate for ProductionNew {
    fn validate(&self) -> ResultEngine<()> {
        require_quantity(self.quantity_liters, "quantity")?;
        if self.cow_count == 0 {
            return Err(invalid("cow count must be >= 1"));
        }
        Ok(())
    }

    fn normalized(&self) -> Self {
        Self {
            notes: normalize_optional_text(self.notes.as_deref()),
            ..self.clone()
        }
    }
}

impl Validate for SaleNew {
    fn validate(&self) -> ResultEngine<()> {
        require_quantity(self.quantity_liters, "quantity")?;
        require_cents(self.price_per_liter_cents, "price per liter")?;
        require_text(&self.buyer, "buyer")?;
        match Money::for_quantity(self.quantity_liters, Money::new(self.price_per_liter_cents)) {
            Some(total) if total <= Money::MAX_RECORD => Ok(()),
            _ => Err(invalid(format!("sale total must be <= {}", Money::MAX_RECORD))),
        }
    }

    fn normalized(&self) -> Self {
        Self {
            buyer: self.buyer.trim().to_string(),
            notes: normalize_optional_text(self.notes.as_deref()),
            ..self.clone()
        }
    }
}

impl Validate for ExpenseNew {
    fn validate(&self) -> ResultEngine<()> {
        require_cents(self.amount_cents, "amount")?;
        require_text(&self.description, "description")?;
        Ok(())
    }

    fn normalized(&self) -> Self {
        Self {
            description: self.description.trim().to_string(),
            ..self.clone()
        }
    }
}

/// Rejects a filter whose start is after its end.
pub fn validate_filter(filter: &RecordFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to)
        && from > to
    {
        return Err(EngineError::InvalidRange(
            "date_from must be <= date_to".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use api_types::{expense::ExpenseCategory, production::Quality};
    use chrono::NaiveDate;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 5, 1).unwrap()
    }

    #[test]
    fn production_requires_cows_and_positive_liters() {
        let mut new = ProductionNew {
            date: day(),
            quantity_liters: 120.0,
            cow_count: 12,
            quality: Quality::A,
            notes: Some("   ".to_string()),
        };
        assert!(new.validate().is_ok());
        assert_eq!(new.normalized().notes, None);

        new.cow_count = 0;
        assert!(matches!(new.validate(), Err(EngineError::Validation(_))));

        new.cow_count = 1;
        new.quantity_liters = f64::INFINITY;
        assert!(new.validate().is_err());
        new.quantity_liters = -1.0;
        assert!(new.validate().is_err());
    }

    #[test]
    fn sale_requires_buyer() {
        let new = SaleNew {
            date: day(),
            quantity_liters: 100.0,
            price_per_liter_cents: 250,
            buyer: "  ".to_string(),
            notes: None,
        };
        assert_eq!(
            new.validate(),
            Err(EngineError::Validation("buyer is required".to_string()))
        );
    }

    #[test]
    fn expense_rejects_negative_amount() {
        let new = ExpenseNew {
            date: day(),
            amount_cents: -1,
            category: ExpenseCategory::Other,
            description: "Cerca".to_string(),
        };
        assert!(new.validate().is_err());
    }

    #[test]
    fn amounts_are_capped_per_record() {
        let mut expense = ExpenseNew {
            date: day(),
            amount_cents: Money::MAX_RECORD.cents(),
            category: ExpenseCategory::Equipment,
            description: "Ordenhadeira".to_string(),
        };
        assert!(expense.validate().is_ok());
        expense.amount_cents = i64::MAX / 2 + 1;
        assert_eq!(
            expense.validate(),
            Err(EngineError::Validation(
                "amount must be <= R$ 1000000000.00".to_string()
            ))
        );

        let mut sale = SaleNew {
            date: day(),
            quantity_liters: 1.0,
            price_per_liter_cents: Money::MAX_RECORD.cents() + 1,
            buyer: "Cooperativa".to_string(),
            notes: None,
        };
        assert!(sale.validate().is_err());

        // Each field fits, the product does not.
        sale.price_per_liter_cents = Money::MAX_RECORD.cents();
        sale.quantity_liters = 2.0;
        assert_eq!(
            sale.validate(),
            Err(EngineError::Validation(
                "sale total must be <= R$ 1000000000.00".to_string()
            ))
        );
    }

    #[test]
    fn filter_order() {
        let later = NaiveDate::from_ymd_opt(2023, 5, 2).unwrap();
        let ok = RecordFilter {
            date_from: Some(day()),
            date_to: Some(day()),
        };
        assert!(validate_filter(&ok).is_ok());
        let reversed = RecordFilter {
            date_from: Some(later),
            date_to: Some(day()),
        };
        assert!(validate_filter(&reversed).is_err());
    }
}
