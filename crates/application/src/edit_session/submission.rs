use super::super::discount_ports::RemoteError;

/// Whether a save request is currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    /// No save in flight.
    #[default]
    Idle,
    /// A single save request has been issued and not yet answered.
    Submitting,
}

impl SubmissionState {
    /// Returns whether a save request is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// Result of the latest submit attempt that was actually issued to the
/// remote service. Local-validation failures never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    /// The service accepted the update.
    Success,
    /// The service rejected the update, or could not be reached; errors in
    /// their original response order.
    Failure(Vec<RemoteError>),
}

/// What one call to [`submit`](super::DiscountEditSession::submit) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to save, or a save was already in flight; no request issued.
    Skipped,
    /// Local validation failed; errors are attached to the offending fields
    /// and no request was issued.
    Invalid,
    /// The remote service accepted the update.
    Saved,
    /// The remote service rejected the update or was unreachable.
    Rejected(Vec<RemoteError>),
}
