use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const PAYMENT_CURRENCY: &str = "USD";
pub const PAYMENT_STATUS_COMPLETED: &str = "completed";

/// Payment methods accepted by the simulated checkout. No gateway is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Demo,
    Card,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Demo => "demo",
            PaymentMethod::Card => "card",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub method: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(PaymentMethod::Demo.as_str(), "demo");
        let method: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(method, PaymentMethod::Card);
        assert!(serde_json::from_str::<PaymentMethod>("\"bitcoin\"").is_err());
    }
}
