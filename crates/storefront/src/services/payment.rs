//! Simulated card payments.
//!
//! Card payments are not integrated with any gateway. Advancing from the
//! payment step with a card puts the checkout into a processing state; after
//! a fixed delay this simulator marks the payment as failed and switches the
//! shopper to bank transfer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::Instrument;

use super::shopper::{PaymentTimer, Shopper, ShopperSession};

/// Schedules the outcome of simulated card payments.
#[derive(Debug, Clone, Copy)]
pub struct CardPaymentSimulator {
    delay: Duration,
}

impl CardPaymentSimulator {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Start the processing timer for `session`.
    ///
    /// `shopper` must be the locked state of `session`, with its checkout
    /// already in the processing state. Any earlier timer is cancelled. The
    /// timer is cancelled with the session, so ending the session or
    /// shutting down stops it.
    pub fn start(&self, session: &Arc<ShopperSession>, shopper: &mut Shopper) -> JoinHandle<()> {
        shopper.cancel_payment_timer();

        let id = shopper.next_timer_id;
        shopper.next_timer_id = shopper.next_timer_id.wrapping_add(1);
        let token = session.lifetime().child_token();
        shopper.payment_timer = Some(PaymentTimer {
            id,
            token: token.clone(),
        });

        let session = Arc::clone(session);
        let delay = self.delay;
        let span = tracing::info_span!("card_payment", shopper_id = %session.id(), timer_id = id);

        tokio::spawn(
            async move {
                tokio::select! {
                    () = token.cancelled() => {
                        let mut shopper = session.lock().await;
                        if take_if_current(&mut shopper, id) && shopper.checkout.cancel_card_processing() {
                            tracing::debug!("Card payment cancelled");
                        }
                    }
                    () = tokio::time::sleep(delay) => {
                        let mut shopper = session.lock().await;
                        if take_if_current(&mut shopper, id) && shopper.checkout.finish_card_processing() {
                            tracing::info!("Card payment failed, switched to bank transfer");
                        }
                    }
                }
            }
            .instrument(span),
        )
    }
}

/// Clear the pending timer if it is still timer `id`.
fn take_if_current(shopper: &mut Shopper, id: u64) -> bool {
    if shopper.payment_timer.as_ref().is_some_and(|timer| timer.id == id) {
        shopper.payment_timer = None;
        true
    } else {
        false
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sable_core::checkout::{AddressFields, PaymentDetails, ShippingDetails};
    use sable_core::{Advance, CheckoutStep, PaymentMethod};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::models::session::ShopperId;
    use crate::services::ShopperStore;

    const DELAY: Duration = Duration::from_secs(10);

    async fn processing_session(store: &ShopperStore) -> (Arc<ShopperSession>, JoinHandle<()>) {
        let session = store.get_or_create(ShopperId::generate()).await;
        let simulator = CardPaymentSimulator::new(DELAY);

        let handle = {
            let mut shopper = session.lock().await;
            shopper.checkout.update_shipping(ShippingDetails {
                address: AddressFields {
                    first_name: "Jane".into(),
                    last_name: "Doe".into(),
                    address: "1 Main St".into(),
                    ..AddressFields::default()
                },
                email: "jane@example.com".into(),
                phone: "555-0100".into(),
                ..ShippingDetails::default()
            });
            shopper.checkout.advance().unwrap();
            shopper.checkout.advance().unwrap();
            shopper
                .checkout
                .update_payment(PaymentDetails {
                    method: PaymentMethod::Card,
                    card: None,
                })
                .unwrap();
            assert_eq!(
                shopper.checkout.advance().unwrap(),
                Advance::CardProcessingStarted
            );
            simulator.start(&session, &mut shopper)
        };

        (session, handle)
    }

    fn store() -> ShopperStore {
        ShopperStore::new(Duration::from_secs(3600), CancellationToken::new())
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_payment_fails_over_to_bank_after_delay() {
        let store = store();
        let (session, handle) = processing_session(&store).await;

        tokio::time::sleep(DELAY / 2).await;
        assert!(session.lock().await.checkout.is_processing());

        handle.await.unwrap();

        let shopper = session.lock().await;
        assert!(!shopper.checkout.is_processing());
        assert!(shopper.checkout.payment_failed());
        assert_eq!(shopper.checkout.form().payment.method, PaymentMethod::Bank);
        assert_eq!(shopper.checkout.step(), CheckoutStep::Payment);
        assert!(!shopper.has_pending_payment());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ending_session_cancels_timer() {
        let store = store();
        let (session, handle) = processing_session(&store).await;

        assert!(store.end(session.id()).await);
        handle.await.unwrap();

        let shopper = session.lock().await;
        assert!(!shopper.checkout.is_processing());
        assert!(!shopper.checkout.payment_failed());
        assert_eq!(shopper.checkout.form().payment.method, PaymentMethod::Card);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_timer_supersedes_older() {
        let store = store();
        let (session, first) = processing_session(&store).await;

        let second = {
            let mut shopper = session.lock().await;
            CardPaymentSimulator::new(DELAY).start(&session, &mut shopper)
        };

        // The superseded timer exits without touching the checkout
        first.await.unwrap();
        assert!(session.lock().await.checkout.is_processing());

        second.await.unwrap();
        assert!(session.lock().await.checkout.payment_failed());
    }
}
