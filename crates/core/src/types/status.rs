//! Status and method enums shared by checkout and persisted orders.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, waiting for the bank transfer to arrive.
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The snake_case wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays.
///
/// Card payments are accepted by the checkout form but never succeed; see
/// [`crate::checkout::CheckoutFlow::finish_card_processing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.payment_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Manual bank transfer to the account shown at checkout.
    #[default]
    Bank,
    Card,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bank => write!(f, "bank"),
            Self::Card => write!(f, "card"),
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank" => Ok(Self::Bank),
            "card" => Ok(Self::Card),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}

/// Delivery speed selected on the shipping step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.shipping_method", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
    Overnight,
}

impl std::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Express => write!(f, "express"),
            Self::Overnight => write!(f, "overnight"),
        }
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            "overnight" => Ok(Self::Overnight),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("bank".parse::<PaymentMethod>().unwrap(), PaymentMethod::Bank);
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_shipping_method_roundtrip_display() {
        for method in [
            ShippingMethod::Standard,
            ShippingMethod::Express,
            ShippingMethod::Overnight,
        ] {
            assert_eq!(method.to_string().parse::<ShippingMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Bank);
        assert_eq!(ShippingMethod::default(), ShippingMethod::Standard);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).unwrap(),
            "\"processing\""
        );
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"card\"").unwrap(),
            PaymentMethod::Card
        );
    }
}
