/// Two-step confirmation state guarding the irreversible delete action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionState {
    /// No confirmation showing.
    #[default]
    Idle,
    /// Confirmation showing; the next confirm executes the delete.
    ConfirmPending,
}

impl DeletionState {
    fn toggled(self) -> Self {
        match self {
            Self::Idle => Self::ConfirmPending,
            Self::ConfirmPending => Self::Idle,
        }
    }

    /// Flips between showing and hiding the confirmation.
    pub fn toggle(&mut self) -> Self {
        *self = self.toggled();
        *self
    }
}

/// What one call to [`confirm_delete`](super::DiscountEditSession::confirm_delete) did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// No confirmation was pending; no request issued.
    Skipped,
    /// The discount was deleted and the host navigated away.
    Deleted,
    /// The delete request failed; the host stays on the form.
    Failed(String),
}
