//! Checkout form fields.
//!
//! Only the shipping step is validated here. Billing and payment fields are
//! taken as entered; the server-side order endpoint applies the stricter
//! [`crate::Email`] check.

use serde::{Deserialize, Serialize};

use crate::types::{PaymentMethod, ShippingMethod};

/// A postal address as entered on the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressFields {
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
}

/// Step 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingDetails {
    #[serde(flatten)]
    pub address: AddressFields,
    pub email: String,
    pub phone: String,
    pub method: ShippingMethod,
}

/// Shipping fields that must be filled before leaving step 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
}

impl ShippingField {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
        }
    }
}

impl std::fmt::Display for ShippingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ShippingDetails {
    /// Required fields that are blank after trimming, in form order.
    #[must_use]
    pub fn missing_required(&self) -> Vec<ShippingField> {
        [
            (ShippingField::FirstName, &self.address.first_name),
            (ShippingField::LastName, &self.address.last_name),
            (ShippingField::Email, &self.email),
            (ShippingField::Phone, &self.phone),
            (ShippingField::Address, &self.address.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Step 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingDetails {
    pub same_as_shipping: bool,
    #[serde(flatten)]
    pub address: AddressFields,
}

impl Default for BillingDetails {
    fn default() -> Self {
        Self {
            same_as_shipping: true,
            address: AddressFields::default(),
        }
    }
}

/// Card fields kept for display. The full number is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetails {
    pub holder: String,
    pub last4: String,
    pub expiry: String,
}

/// Step 3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub card: Option<CardDetails>,
}

/// Everything entered across the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub shipping: ShippingDetails,
    pub billing: BillingDetails,
    pub payment: PaymentDetails,
}

impl CheckoutForm {
    /// The billing address that applies: shipping's when `same_as_shipping`.
    #[must_use]
    pub fn resolved_billing(&self) -> &AddressFields {
        if self.billing.same_as_shipping {
            &self.shipping.address
        } else {
            &self.billing.address
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> ShippingDetails {
        ShippingDetails {
            address: AddressFields {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                address: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
            },
            email: "jane@example.com".into(),
            phone: "555-0100".into(),
            method: ShippingMethod::Standard,
        }
    }

    #[test]
    fn test_filled_form_has_nothing_missing() {
        assert!(filled().missing_required().is_empty());
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut details = filled();
        details.email = "   ".into();
        details.phone = String::new();
        assert_eq!(
            details.missing_required(),
            vec![ShippingField::Email, ShippingField::Phone]
        );
    }

    #[test]
    fn test_city_and_postal_code_are_optional() {
        let mut details = filled();
        details.address.city.clear();
        details.address.postal_code.clear();
        assert!(details.missing_required().is_empty());
    }

    #[test]
    fn test_billing_defaults_to_same_as_shipping() {
        let billing: BillingDetails = serde_json::from_str("{}").unwrap();
        assert!(billing.same_as_shipping);
    }

    #[test]
    fn test_resolved_billing() {
        let mut form = CheckoutForm {
            shipping: filled(),
            ..CheckoutForm::default()
        };
        form.billing.address.first_name = "Bill".into();
        assert_eq!(form.resolved_billing().first_name, "Jane");

        form.billing.same_as_shipping = false;
        assert_eq!(form.resolved_billing().first_name, "Bill");
    }

    #[test]
    fn test_shipping_wire_format_is_flat() {
        let details: ShippingDetails = serde_json::from_str(
            r#"{"first_name":"Jane","email":"j@x.io","method":"express"}"#,
        )
        .unwrap();
        assert_eq!(details.address.first_name, "Jane");
        assert_eq!(details.method, ShippingMethod::Express);
    }
}
