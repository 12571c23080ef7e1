use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use promodesk_core::{AppError, AppResult, DiscountId, NonEmptyString, SessionId};
use promodesk_domain::{Discount, DiscountForm, FieldEdit};

use super::discount_ports::{DiscountGateway, DiscountLoader, NavigationBridge, RemoteError};
use super::update_payload::DiscountUpdate;

mod deletion;
mod submission;

pub use deletion::{DeleteOutcome, DeletionState};
pub use submission::{SubmissionResult, SubmissionState, SubmitOutcome};

/// Banner message shown when the remote service gives no readable answer.
const TRANSPORT_FAILURE_MESSAGE: &str =
    "The discount service could not be reached. Try again in a moment.";

#[derive(Debug, Default)]
struct SessionState {
    record_id: Option<DiscountId>,
    configuration_id: Option<NonEmptyString>,
    form: Option<DiscountForm>,
    submission: SubmissionState,
    deletion: DeletionState,
    last_submission: Option<SubmissionResult>,
}

/// Controller for one discount edit session.
///
/// Owns the form state for the lifetime of the edit, coordinates the save
/// and delete requests against the gateway, and triggers host navigation on
/// completion. One instance exists per record being edited and shares no
/// state with other sessions. The interior lock is never held across an
/// await; mutual exclusion of remote calls is carried by the
/// [`SubmissionState`] and [`DeletionState`] values themselves.
pub struct DiscountEditSession {
    session_id: SessionId,
    gateway: Arc<dyn DiscountGateway>,
    navigation: Arc<dyn NavigationBridge>,
    state: RwLock<SessionState>,
}

impl DiscountEditSession {
    /// Creates a session that is not yet hydrated. `discount_id` is the
    /// route-level identity when editing an existing record.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn DiscountGateway>,
        navigation: Arc<dyn NavigationBridge>,
        discount_id: Option<DiscountId>,
    ) -> Self {
        Self {
            session_id: SessionId::new(),
            gateway,
            navigation,
            state: RwLock::new(SessionState {
                record_id: discount_id,
                ..SessionState::default()
            }),
        }
    }

    /// Loads an existing discount through the loader and hydrates exactly
    /// once from the result.
    pub async fn start(
        gateway: Arc<dyn DiscountGateway>,
        navigation: Arc<dyn NavigationBridge>,
        loader: Arc<dyn DiscountLoader>,
        discount_id: DiscountId,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        let record = loader
            .load_discount(&discount_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("discount '{discount_id}' does not exist")))?;

        let session = Self::new(gateway, navigation, Some(discount_id));
        session.hydrate(Some(&record), now).await?;
        Ok(session)
    }

    /// Returns the session identifier used in log output.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Populates the form from a loaded record, or defaults when creating.
    ///
    /// Re-hydrating with the same record and clock yields an identical form;
    /// all dirty bits reset, the delete confirmation closes, and any prior
    /// submission result is discarded.
    pub async fn hydrate(&self, record: Option<&Discount>, now: DateTime<Utc>) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.submission.is_submitting() {
            return Err(AppError::Conflict(
                "cannot hydrate while a save is in flight".to_owned(),
            ));
        }

        if let Some(record) = record {
            state.record_id = Some(record.id().clone());
            state.configuration_id = record.configuration_id().cloned();
        }
        state.form = Some(DiscountForm::hydrate(record, now));
        state.deletion = DeletionState::Idle;
        state.last_submission = None;
        Ok(())
    }

    /// Returns whether the form has been hydrated and is interactive.
    pub async fn is_ready(&self) -> bool {
        self.state.read().await.form.is_some()
    }

    /// Returns the record identity this session edits, when one exists.
    pub async fn record_id(&self) -> Option<DiscountId> {
        self.state.read().await.record_id.clone()
    }

    /// Returns a snapshot of the current form state for rendering.
    pub async fn form(&self) -> Option<DiscountForm> {
        self.state.read().await.form.clone()
    }

    /// Returns whether any field diverges from its hydrated baseline. The
    /// save action is gated on this.
    pub async fn is_dirty(&self) -> bool {
        self.state
            .read()
            .await
            .form
            .as_ref()
            .is_some_and(DiscountForm::is_dirty)
    }

    /// Returns whether a save request is in flight.
    pub async fn is_submitting(&self) -> bool {
        self.state.read().await.submission.is_submitting()
    }

    /// Returns the delete confirmation state.
    pub async fn deletion_state(&self) -> DeletionState {
        self.state.read().await.deletion
    }

    /// Returns the result of the latest issued submit attempt.
    pub async fn last_submission(&self) -> Option<SubmissionResult> {
        self.state.read().await.last_submission.clone()
    }

    /// Routes one user edit to its field. Rejected while a save is in
    /// flight; the field store is locked for the duration of the request.
    pub async fn apply(&self, edit: FieldEdit) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.submission.is_submitting() {
            return Err(AppError::Conflict(
                "field edits are locked while a save is in flight".to_owned(),
            ));
        }
        let Some(form) = state.form.as_mut() else {
            return Err(AppError::Conflict("the form is not hydrated yet".to_owned()));
        };

        form.apply(edit);
        Ok(())
    }

    /// Reverts every field to its hydrated baseline, discarding edits.
    pub async fn discard_changes(&self) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.submission.is_submitting() {
            return Err(AppError::Conflict(
                "cannot discard changes while a save is in flight".to_owned(),
            ));
        }
        let Some(form) = state.form.as_mut() else {
            return Err(AppError::Conflict("the form is not hydrated yet".to_owned()));
        };

        form.reset();
        Ok(())
    }

    /// Saves the current form to the remote service.
    ///
    /// A no-op while a save is already in flight or while the form is clean.
    /// Otherwise validates locally, builds the method-scoped payload once,
    /// issues exactly one update request, and either marks the form clean
    /// and navigates to the record list (empty error list) or surfaces the
    /// service's errors in their original order while the form stays dirty
    /// and editable.
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        let (record_id, payload) = {
            let mut state = self.state.write().await;
            if state.submission.is_submitting() {
                return Ok(SubmitOutcome::Skipped);
            }

            let record_id = state.record_id.clone();
            let configuration_id = state.configuration_id.clone();
            let Some(form) = state.form.as_mut() else {
                return Err(AppError::Conflict("the form is not hydrated yet".to_owned()));
            };
            if !form.is_dirty() {
                return Ok(SubmitOutcome::Skipped);
            }

            let entries = match form.validate() {
                Ok(entries) => entries,
                Err(_) => return Ok(SubmitOutcome::Invalid),
            };
            let record_id = record_id.ok_or_else(|| {
                AppError::NotFound("the discount has no identity to save against".to_owned())
            })?;
            let payload = DiscountUpdate::from_form(form, entries, configuration_id.as_ref())?;

            state.submission = SubmissionState::Submitting;
            (record_id, payload)
        };

        let response = self.gateway.update_discount(&record_id, payload).await;

        let mut state = self.state.write().await;
        state.submission = SubmissionState::Idle;
        match response {
            Ok(outcome) if outcome.user_errors.is_empty() => {
                if let Some(form) = state.form.as_mut() {
                    form.mark_clean();
                }
                state.last_submission = Some(SubmissionResult::Success);
                drop(state);
                self.navigation.go_to_discount_list();
                Ok(SubmitOutcome::Saved)
            }
            Ok(outcome) => {
                state.last_submission =
                    Some(SubmissionResult::Failure(outcome.user_errors.clone()));
                Ok(SubmitOutcome::Rejected(outcome.user_errors))
            }
            // Transport failures surface as one generic banner entry; the
            // gateway logs the underlying cause.
            Err(_) => {
                let errors = vec![RemoteError {
                    message: TRANSPORT_FAILURE_MESSAGE.to_owned(),
                }];
                state.last_submission = Some(SubmissionResult::Failure(errors.clone()));
                Ok(SubmitOutcome::Rejected(errors))
            }
        }
    }

    /// Shows or hides the delete confirmation, returning the new state.
    /// Available regardless of form dirtiness.
    pub async fn toggle_delete_confirmation(&self) -> DeletionState {
        let mut state = self.state.write().await;
        state.deletion.toggle()
    }

    /// Executes the delete guarded by the confirmation step.
    ///
    /// A no-op unless the confirmation is pending. The confirmation closes
    /// as soon as the delete is claimed, so a concurrent confirm skips.
    /// Navigation fires only when the service accepts the delete; a failure
    /// is surfaced instead of being ignored.
    pub async fn confirm_delete(&self) -> AppResult<DeleteOutcome> {
        let (method, record_id) = {
            let mut state = self.state.write().await;
            if state.deletion != DeletionState::ConfirmPending {
                return Ok(DeleteOutcome::Skipped);
            }
            state.deletion = DeletionState::Idle;

            if state.submission.is_submitting() {
                return Err(AppError::Conflict(
                    "cannot delete while a save is in flight".to_owned(),
                ));
            }
            let Some(form) = state.form.as_ref() else {
                return Err(AppError::Conflict("the form is not hydrated yet".to_owned()));
            };
            let method = *form.method.value();
            let record_id = state.record_id.clone().ok_or_else(|| {
                AppError::NotFound("the discount has not been saved yet".to_owned())
            })?;
            (method, record_id)
        };

        match self.gateway.delete_discount(method, &record_id).await {
            Ok(()) => {
                self.navigation.go_to_discount_list();
                Ok(DeleteOutcome::Deleted)
            }
            Err(error) => Ok(DeleteOutcome::Failed(error.to_string())),
        }
    }
}
