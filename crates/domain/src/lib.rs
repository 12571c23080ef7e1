//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod discount;
mod form;

pub use discount::{
    CombinesWith, Discount, DiscountConfiguration, DiscountMethod, RequirementType,
};
pub use form::{DiscountForm, FieldEdit, FieldState, ValidatedEntries};
