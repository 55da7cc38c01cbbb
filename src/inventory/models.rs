use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

pub const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Ledger row kind. `sale`, `manual-remove` and `adjustment-remove` count
/// against stock; every other kind counts toward it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum TransactionType {
    Initial,
    Sale,
    Return,
    ManualAdd,
    ManualRemove,
    AdjustmentAdd,
    AdjustmentRemove,
}

#[derive(Debug, Serialize, FromRow)]
pub struct InventoryTransaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub transaction_type: TransactionType,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Ledger row joined with the acting user's display name.
#[derive(Debug, Serialize, FromRow)]
pub struct InventoryTransactionWithUser {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub transaction_type: TransactionType,
    pub reference_id: Option<Uuid>,
    pub reference_type: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_by_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentType {
    Add,
    Remove,
    Set,
}

impl AdjustmentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "add" => Some(AdjustmentType::Add),
            "remove" => Some(AdjustmentType::Remove),
            "set" => Some(AdjustmentType::Set),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryRequest {
    pub product_id: Option<Uuid>,
    pub quantity: Option<i32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i32>,
}

/// Outcome of a manual stock correction: the stock value to write and the
/// ledger row to append alongside it. `ledger` is None when the correction
/// is a no-op (a `set` to the current value), in which case no zero-quantity
/// audit row is written.
#[derive(Debug, PartialEq, Eq)]
pub struct Adjustment {
    pub new_stock: i32,
    pub ledger: Option<(i32, TransactionType)>,
}

pub fn apply_adjustment(
    product_id: Uuid,
    stock: i32,
    quantity: i32,
    kind: AdjustmentType,
) -> Result<Adjustment, AppError> {
    if quantity < 0 {
        return Err(AppError::Validation(
            "Quantity must be a non-negative integer".into(),
        ));
    }

    match kind {
        AdjustmentType::Add => Ok(Adjustment {
            new_stock: stock + quantity,
            ledger: (quantity > 0).then_some((quantity, TransactionType::ManualAdd)),
        }),
        AdjustmentType::Remove => {
            if quantity > stock {
                return Err(AppError::InsufficientStock {
                    product_id,
                    available: stock,
                });
            }
            Ok(Adjustment {
                new_stock: stock - quantity,
                ledger: (quantity > 0).then_some((quantity, TransactionType::ManualRemove)),
            })
        }
        AdjustmentType::Set => {
            let difference = quantity - stock;
            let ledger = if difference > 0 {
                Some((difference, TransactionType::ManualAdd))
            } else if difference < 0 {
                Some((-difference, TransactionType::ManualRemove))
            } else {
                None
            };
            Ok(Adjustment {
                new_stock: quantity,
                ledger,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn add_increments_and_logs() {
        let adj = apply_adjustment(pid(), 7, 3, AdjustmentType::Add).unwrap();
        assert_eq!(adj.new_stock, 10);
        assert_eq!(adj.ledger, Some((3, TransactionType::ManualAdd)));
    }

    #[test]
    fn remove_decrements_and_logs() {
        let adj = apply_adjustment(pid(), 7, 3, AdjustmentType::Remove).unwrap();
        assert_eq!(adj.new_stock, 4);
        assert_eq!(adj.ledger, Some((3, TransactionType::ManualRemove)));
    }

    #[test]
    fn remove_beyond_stock_is_rejected() {
        let id = pid();
        let err = apply_adjustment(id, 2, 3, AdjustmentType::Remove).unwrap_err();
        match err {
            AppError::InsufficientStock {
                product_id,
                available,
            } => {
                assert_eq!(product_id, id);
                assert_eq!(available, 2);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }
    }

    #[test]
    fn set_above_logs_the_delta_as_add() {
        // stock 7, set to 12: delta of 5 recorded as manual-add
        let adj = apply_adjustment(pid(), 7, 12, AdjustmentType::Set).unwrap();
        assert_eq!(adj.new_stock, 12);
        assert_eq!(adj.ledger, Some((5, TransactionType::ManualAdd)));
    }

    #[test]
    fn set_below_logs_the_delta_as_remove() {
        let adj = apply_adjustment(pid(), 12, 7, AdjustmentType::Set).unwrap();
        assert_eq!(adj.new_stock, 7);
        assert_eq!(adj.ledger, Some((5, TransactionType::ManualRemove)));
    }

    #[test]
    fn set_to_current_value_writes_no_ledger_row() {
        let adj = apply_adjustment(pid(), 7, 7, AdjustmentType::Set).unwrap();
        assert_eq!(adj.new_stock, 7);
        assert_eq!(adj.ledger, None);
    }

    #[test]
    fn set_to_zero_is_allowed() {
        let adj = apply_adjustment(pid(), 4, 0, AdjustmentType::Set).unwrap();
        assert_eq!(adj.new_stock, 0);
        assert_eq!(adj.ledger, Some((4, TransactionType::ManualRemove)));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = apply_adjustment(pid(), 5, -1, AdjustmentType::Add).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn unknown_type_does_not_parse() {
        assert_eq!(AdjustmentType::parse("add"), Some(AdjustmentType::Add));
        assert_eq!(AdjustmentType::parse("drop"), None);
    }

    #[test]
    fn transaction_types_serialize_kebab_case() {
        assert_eq!(
            serde_json::to_string(&TransactionType::ManualAdd).unwrap(),
            "\"manual-add\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionType::AdjustmentRemove).unwrap(),
            "\"adjustment-remove\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionType::Sale).unwrap(),
            "\"sale\""
        );
    }
}
