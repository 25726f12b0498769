//! The four-step checkout wizard.
//!
//! ```text
//! Shipping ──gate──▶ Billing ──▶ Payment ──bank──▶ Review ──place_order──▶ PlacedOrder
//!                                   │
//!                                   └─card──▶ processing ──delay──▶ payment_failed (method = bank)
//! ```
//!
//! Only the shipping step validates its fields. Card payments are simulated:
//! they sit in a processing state until the storefront's timer calls
//! [`CheckoutFlow::finish_card_processing`], which always fails and switches
//! the shopper to bank transfer.

pub mod form;
mod flow;
mod step;

pub use flow::{Advance, CheckoutFlow};
pub use form::{
    AddressFields, BillingDetails, CardDetails, CheckoutForm, PaymentDetails, ShippingDetails,
    ShippingField,
};
pub use step::CheckoutStep;

/// Why a checkout transition was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Please fill in all required fields: {}", list_fields(.0))]
    MissingShippingFields(Vec<ShippingField>),
    #[error("card payment is still processing")]
    PaymentInProgress,
    #[error("already at the review step")]
    AlreadyAtReview,
    #[error("already at the first step")]
    NoPreviousStep,
    #[error("orders can only be placed from the review step")]
    NotAtReview,
    #[error("cart is empty")]
    EmptyCart,
}

fn list_fields(fields: &[ShippingField]) -> String {
    fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ")
}
