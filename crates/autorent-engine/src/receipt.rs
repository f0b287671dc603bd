//! Successful results of engine operations, shaped for the HTTP layer.

use serde::Serialize;
use ts_rs::TS;

use autorent_core::{Money, RentalStatus};

/// Returned by `create_rental`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct RentalReceipt {
    pub rental_id: String,
    pub total_price: Money,
    pub status: RentalStatus,
}

/// Returned by `pay_rental`, `finish_rental` and `cancel_rental`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct StatusReceipt {
    pub rental_id: String,
    pub status: RentalStatus,
}

/// Returned by `top_up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct BalanceReceipt {
    pub user_id: String,
    pub balance: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_receipt_wire_format() {
        let receipt = StatusReceipt {
            rental_id: "r1".to_string(),
            status: RentalStatus::Active,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["status"], "active");
        assert_eq!(json["rental_id"], "r1");
    }

    #[test]
    fn test_money_serializes_as_cents() {
        let receipt = RentalReceipt {
            rental_id: "r1".to_string(),
            total_price: Money::from_cents(18000),
            status: RentalStatus::Pending,
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["total_price"], 18000);
    }
}
