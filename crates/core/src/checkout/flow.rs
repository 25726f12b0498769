//! Step sequencing and gates.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::form::{BillingDetails, CheckoutForm, PaymentDetails, ShippingDetails};
use super::{CheckoutError, CheckoutStep};
use crate::cart::CartState;
use crate::order::{CustomerContact, OrderLine, PlacedOrder, PostalAddress};
use crate::pricing::{OrderTotals, PricingRules};
use crate::types::{OrderNumber, OrderStatus, PaymentMethod};

/// Outcome of a successful [`CheckoutFlow::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "step", rename_all = "snake_case")]
pub enum Advance {
    /// The wizard moved to this step.
    Moved(CheckoutStep),
    /// A card payment began; the caller must schedule
    /// [`CheckoutFlow::finish_card_processing`].
    CardProcessingStarted,
}

/// Wizard state for one shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    form: CheckoutForm,
    processing: bool,
    payment_failed: bool,
}

impl CheckoutFlow {
    /// A flow at step 1 with an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Whether a simulated card payment is in flight.
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        self.processing
    }

    /// Whether the payment-failed modal is showing.
    #[must_use]
    pub const fn payment_failed(&self) -> bool {
        self.payment_failed
    }

    pub fn update_shipping(&mut self, details: ShippingDetails) {
        self.form.shipping = details;
    }

    pub fn update_billing(&mut self, details: BillingDetails) {
        self.form.billing = details;
    }

    /// Replace the payment details.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::PaymentInProgress`] while a card payment is processing.
    pub fn update_payment(&mut self, details: PaymentDetails) -> Result<(), CheckoutError> {
        self.ensure_idle()?;
        self.form.payment = details;
        Ok(())
    }

    /// Move forward one step, enforcing that step's gate.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::MissingShippingFields`] when leaving step 1 with blanks
    /// - [`CheckoutError::PaymentInProgress`] while a card payment is processing
    /// - [`CheckoutError::AlreadyAtReview`] on the last step
    pub fn advance(&mut self) -> Result<Advance, CheckoutError> {
        self.ensure_idle()?;
        match self.step {
            CheckoutStep::Shipping => {
                let missing = self.form.shipping.missing_required();
                if !missing.is_empty() {
                    return Err(CheckoutError::MissingShippingFields(missing));
                }
            }
            CheckoutStep::Payment if self.form.payment.method == PaymentMethod::Card => {
                self.processing = true;
                self.payment_failed = false;
                return Ok(Advance::CardProcessingStarted);
            }
            CheckoutStep::Billing | CheckoutStep::Payment => {}
            CheckoutStep::Review => return Err(CheckoutError::AlreadyAtReview),
        }

        let next = self.step.next().ok_or(CheckoutError::AlreadyAtReview)?;
        self.step = next;
        Ok(Advance::Moved(next))
    }

    /// Move back one step.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::NoPreviousStep`] on step 1, or
    /// [`CheckoutError::PaymentInProgress`] while a card payment is processing.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.ensure_idle()?;
        let previous = self.step.previous().ok_or(CheckoutError::NoPreviousStep)?;
        self.step = previous;
        Ok(previous)
    }

    /// The simulated card payment has run its course: it fails, the method
    /// falls back to bank transfer and the failure modal shows. The step
    /// does not change.
    ///
    /// Returns `false` if no card payment was processing.
    pub fn finish_card_processing(&mut self) -> bool {
        if !self.processing {
            return false;
        }
        self.processing = false;
        self.form.payment.method = PaymentMethod::Bank;
        self.payment_failed = true;
        true
    }

    /// Abandon a processing card payment without marking it failed.
    ///
    /// Returns `false` if no card payment was processing.
    pub fn cancel_card_processing(&mut self) -> bool {
        if !self.processing {
            return false;
        }
        self.processing = false;
        true
    }

    /// Hide the failure modal and settle on bank transfer.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::PaymentInProgress`] while a card payment is processing.
    pub fn dismiss_payment_failure(&mut self) -> Result<(), CheckoutError> {
        self.ensure_idle()?;
        self.payment_failed = false;
        self.form.payment.method = PaymentMethod::Bank;
        Ok(())
    }

    /// Totals for `cart` with the selected shipping method.
    #[must_use]
    pub fn totals(&self, cart: &CartState, rules: &PricingRules) -> OrderTotals {
        OrderTotals::compute(cart.items(), self.form.shipping.method, rules)
    }

    /// Build the order record for `cart`.
    ///
    /// The flow itself is unchanged; callers reset it once the order is
    /// stored.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::PaymentInProgress`] while a card payment is processing
    /// - [`CheckoutError::NotAtReview`] before step 4
    /// - [`CheckoutError::EmptyCart`] when there is nothing to buy
    pub fn place_order(
        &self,
        cart: &CartState,
        rules: &PricingRules,
        order_number: OrderNumber,
        placed_at: DateTime<Utc>,
    ) -> Result<PlacedOrder, CheckoutError> {
        self.ensure_idle()?;
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview);
        }
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping = &self.form.shipping;
        Ok(PlacedOrder {
            order_number,
            placed_at,
            status: OrderStatus::Pending,
            items: cart.items().iter().map(OrderLine::from).collect(),
            contact: CustomerContact {
                email: shipping.email.trim().to_owned(),
                phone: shipping.phone.trim().to_owned(),
            },
            shipping_address: PostalAddress::from(&shipping.address),
            billing_address: PostalAddress::from(self.form.resolved_billing()),
            shipping_method: shipping.method,
            payment_method: self.form.payment.method,
            totals: self.totals(cart, rules),
        })
    }

    /// Back to an empty step-1 form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    const fn ensure_idle(&self) -> Result<(), CheckoutError> {
        if self.processing {
            Err(CheckoutError::PaymentInProgress)
        } else {
            Ok(())
        }
    }
}
