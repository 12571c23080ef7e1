//! Application services and ports for the discount edit flow.

#![forbid(unsafe_code)]

mod discount_ports;
mod edit_session;
mod update_payload;

pub use discount_ports::{
    DiscountGateway, DiscountLoader, MutationOutcome, NavigationBridge, RemoteError,
};
pub use edit_session::{
    DeleteOutcome, DeletionState, DiscountEditSession, SubmissionResult, SubmissionState,
    SubmitOutcome,
};
pub use update_payload::{
    AutomaticDiscountUpdate, CodeDiscountUpdate, ConfigurationPayload, DiscountUpdate,
    MetafieldInput,
};
