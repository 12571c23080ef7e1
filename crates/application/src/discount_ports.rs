use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use promodesk_core::{AppResult, DiscountId};
use promodesk_domain::{Discount, DiscountMethod};

use super::update_payload::DiscountUpdate;

/// One error message returned by the remote service, in response order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    /// Human-readable message, surfaced verbatim.
    pub message: String,
}

/// Result of an update mutation that reached the remote service.
///
/// An empty error list is a success; a non-empty list carries the service's
/// user errors in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Ordered user errors, empty on success.
    pub user_errors: Vec<RemoteError>,
}

/// Port for the remote discount mutation endpoints.
///
/// Both operations are idempotent-unsafe; callers are responsible for not
/// issuing concurrent or repeated requests.
#[async_trait]
pub trait DiscountGateway: Send + Sync {
    /// Issues the single write request for one discount. The request is
    /// scoped by the update's discount method and by identity.
    async fn update_discount(
        &self,
        id: &DiscountId,
        update: DiscountUpdate,
    ) -> AppResult<MutationOutcome>;

    /// Issues the method-scoped delete request for one discount. Carries no
    /// body beyond headers.
    async fn delete_discount(&self, method: DiscountMethod, id: &DiscountId) -> AppResult<()>;
}

/// Port for the record-loading collaborator that feeds hydration.
#[async_trait]
pub trait DiscountLoader: Send + Sync {
    /// Loads one discount snapshot, `None` when the record does not exist.
    async fn load_discount(&self, id: &DiscountId) -> AppResult<Option<Discount>>;
}

/// Port for host-level navigation after a completed save or delete.
pub trait NavigationBridge: Send + Sync {
    /// Fire-and-forget redirect back to the discount list view.
    fn go_to_discount_list(&self);
}
