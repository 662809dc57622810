//! RecomputePremiumHandler - Recomputes a user's derived premium state.
//!
//! Runs after every subscription write. Collapses the user's active records
//! into one summary and projects it onto the account profile.

use std::sync::Arc;

use tracing::warn;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{DispatchError, PremiumSummary};
use crate::ports::{AccountStore, PremiumUpdate, SubscriptionStore};

/// Handler that recomputes and projects a user's premium summary.
pub struct RecomputePremiumHandler {
    subscriptions: Arc<dyn SubscriptionStore>,
    accounts: Arc<dyn AccountStore>,
}

impl RecomputePremiumHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            subscriptions,
            accounts,
        }
    }

    /// Recomputes the summary from the user's active records and writes it
    /// to the account store.
    ///
    /// A missing account row is logged and tolerated; events can arrive
    /// before profile provisioning finishes, and the next recompute lands
    /// once the row exists. Store failures on either side propagate.
    pub async fn handle(&self, user_id: &UserId) -> Result<PremiumSummary, DispatchError> {
        let active = self.subscriptions.find_active_for_user(user_id).await?;
        let summary = PremiumSummary::from_records(&active);

        match self.accounts.update_premium(user_id, &summary).await? {
            PremiumUpdate::Applied => {}
            PremiumUpdate::NoMatchingAccount => {
                warn!(
                    user_id = %user_id,
                    is_premium = summary.is_premium,
                    "No account row matched while applying premium state"
                );
            }
        }

        Ok(summary)
    }
}
