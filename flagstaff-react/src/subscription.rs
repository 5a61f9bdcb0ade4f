// Scoped store subscriptions

use flagstaff_features::{ObservableFlags, Subscription, subscription};
use std::sync::Arc;
use tracing::trace;

/// A live store subscription, released when dropped.
///
/// This is the teardown half of the external-store protocol: whatever path
/// the owning component leaves by (normal return, early return, unwinding),
/// the listener is removed exactly once.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct StoreSubscription<F: ObservableFlags + ?Sized> {
    flags: Arc<F>,
    subscription: Option<Subscription>,
}

impl<F: ObservableFlags + ?Sized> StoreSubscription<F> {
    pub(crate) fn new<L>(flags: Arc<F>, listener: L) -> Self
    where
        L: Fn() + Send + Sync + 'static,
    {
        let subscription = subscription(move |_, _| listener());
        flags.subscribe(subscription.clone());
        trace!("External store listener attached");

        Self {
            flags,
            subscription: Some(subscription),
        }
    }

    /// Unsubscribe now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.flags.unsubscribe(&subscription);
            trace!("External store listener detached");
        }
    }
}

impl<F: ObservableFlags + ?Sized> Drop for StoreSubscription<F> {
    fn drop(&mut self) {
        self.release();
    }
}
