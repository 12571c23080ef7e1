use chrono::{DateTime, Utc};
use promodesk_core::{AppError, AppResult};

use super::discount::{CombinesWith, Discount, DiscountMethod, RequirementType};

/// A mutable cell wrapping one editable attribute: its current value, the
/// baseline captured at hydration, and any local validation errors.
///
/// The dirty bit is not stored; a field is dirty exactly while its value
/// differs from the baseline, so writing the baseline back makes it clean
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState<T> {
    baseline: T,
    value: T,
    errors: Vec<String>,
}

impl<T: Clone + PartialEq> FieldState<T> {
    /// Creates a clean field whose value and baseline are `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            baseline: initial.clone(),
            value: initial,
            errors: Vec::new(),
        }
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Replaces the current value and discards the field's validation
    /// errors, since they described the previous value.
    pub fn write(&mut self, value: T) {
        self.value = value;
        self.errors.clear();
    }

    /// Returns whether the value diverges from the hydrated baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.value != self.baseline
    }

    /// Returns local validation errors attached to this field.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn clear_errors(&mut self) {
        self.errors.clear();
    }

    fn reset(&mut self) {
        self.value = self.baseline.clone();
        self.errors.clear();
    }

    fn mark_clean(&mut self) {
        self.baseline = self.value.clone();
        self.errors.clear();
    }
}

/// One user edit addressed to a single form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Replace the title.
    Title(String),
    /// Switch the discount method.
    Method(DiscountMethod),
    /// Replace the redemption code.
    Code(String),
    /// Replace the combination flags.
    CombinesWith(CombinesWith),
    /// Switch the minimum requirement mode.
    RequirementType(RequirementType),
    /// Replace the subtotal threshold entry.
    RequirementSubtotal(String),
    /// Replace the quantity threshold entry.
    RequirementQuantity(String),
    /// Replace the usage limit entry.
    UsageLimit(String),
    /// Toggle once-per-customer redemption.
    OncePerCustomer(bool),
    /// Replace the activation date.
    StartsAt(DateTime<Utc>),
    /// Replace or clear the expiry date.
    EndsAt(Option<DateTime<Utc>>),
    /// Replace the customer tag restriction.
    CustomerTag(String),
    /// Replace the percentage entry.
    Percentage(String),
    /// Replace the targeted collections.
    Collections(Vec<String>),
}

/// Numeric entries parsed out of the form by a successful validation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedEntries {
    /// Percentage taken off, parsed from the percentage entry.
    pub percentage: f64,
    /// Parsed usage limit; present exactly when the method is `Code`.
    pub usage_limit: Option<u32>,
}

/// The aggregate of every editable discount attribute.
///
/// Numeric attributes (usage limit, percentage, requirement thresholds) hold
/// the user's raw text and are parsed by [`DiscountForm::validate`]; every
/// other attribute holds its typed value directly.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountForm {
    /// Display title; for code discounts the outbound title is the code.
    pub title: FieldState<String>,
    /// Discount method selector.
    pub method: FieldState<DiscountMethod>,
    /// Redemption code entry.
    pub code: FieldState<String>,
    /// Combination flags.
    pub combines_with: FieldState<CombinesWith>,
    /// Minimum requirement mode.
    pub requirement_type: FieldState<RequirementType>,
    /// Subtotal threshold entry.
    pub requirement_subtotal: FieldState<String>,
    /// Quantity threshold entry.
    pub requirement_quantity: FieldState<String>,
    /// Total usage limit entry, empty when no limit is set.
    pub usage_limit: FieldState<String>,
    /// Once-per-customer redemption flag.
    pub once_per_customer: FieldState<bool>,
    /// Activation date.
    pub starts_at: FieldState<DateTime<Utc>>,
    /// Expiry date, `None` while the discount never expires.
    pub ends_at: FieldState<Option<DateTime<Utc>>>,
    /// Customer tag restriction entry.
    pub customer_tag: FieldState<String>,
    /// Percentage entry.
    pub percentage: FieldState<String>,
    /// Targeted collection identifiers.
    pub collections: FieldState<Vec<String>>,
}

impl DiscountForm {
    /// Derives form state from a loaded discount, or documented defaults
    /// when none exists yet. Every field starts clean; re-hydrating with the
    /// same record and clock yields an identical form.
    #[must_use]
    pub fn hydrate(record: Option<&Discount>, now: DateTime<Utc>) -> Self {
        Self {
            title: FieldState::new(record.map(|r| r.title().to_owned()).unwrap_or_default()),
            method: FieldState::new(record.map_or(DiscountMethod::Code, Discount::method)),
            code: FieldState::new(record.map(|r| r.code().to_owned()).unwrap_or_default()),
            combines_with: FieldState::new(record.map(Discount::combines_with).unwrap_or_default()),
            requirement_type: FieldState::new(RequirementType::None),
            requirement_subtotal: FieldState::new("0".to_owned()),
            requirement_quantity: FieldState::new("0".to_owned()),
            usage_limit: FieldState::new(
                record
                    .and_then(Discount::usage_limit)
                    .map(|limit| limit.to_string())
                    .unwrap_or_default(),
            ),
            once_per_customer: FieldState::new(
                record.is_some_and(Discount::applies_once_per_customer),
            ),
            starts_at: FieldState::new(record.map_or(now, Discount::starts_at)),
            ends_at: FieldState::new(record.and_then(Discount::ends_at)),
            customer_tag: FieldState::new(
                record
                    .map(|r| r.configuration().customer_tag.clone())
                    .unwrap_or_default(),
            ),
            percentage: FieldState::new(
                record.map_or_else(|| "0".to_owned(), |r| r.configuration().percentage.to_string()),
            ),
            collections: FieldState::new(
                record
                    .map(|r| r.configuration().collections.clone())
                    .unwrap_or_default(),
            ),
        }
    }

    /// Routes one edit to its field.
    pub fn apply(&mut self, edit: FieldEdit) {
        match edit {
            FieldEdit::Title(value) => self.title.write(value),
            FieldEdit::Method(value) => self.method.write(value),
            FieldEdit::Code(value) => self.code.write(value),
            FieldEdit::CombinesWith(value) => self.combines_with.write(value),
            FieldEdit::RequirementType(value) => self.requirement_type.write(value),
            FieldEdit::RequirementSubtotal(value) => self.requirement_subtotal.write(value),
            FieldEdit::RequirementQuantity(value) => self.requirement_quantity.write(value),
            FieldEdit::UsageLimit(value) => self.usage_limit.write(value),
            FieldEdit::OncePerCustomer(value) => self.once_per_customer.write(value),
            FieldEdit::StartsAt(value) => self.starts_at.write(value),
            FieldEdit::EndsAt(value) => self.ends_at.write(value),
            FieldEdit::CustomerTag(value) => self.customer_tag.write(value),
            FieldEdit::Percentage(value) => self.percentage.write(value),
            FieldEdit::Collections(value) => self.collections.write(value),
        }
    }

    /// Returns whether any field diverges from its hydrated baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.title.is_dirty()
            || self.method.is_dirty()
            || self.code.is_dirty()
            || self.combines_with.is_dirty()
            || self.requirement_type.is_dirty()
            || self.requirement_subtotal.is_dirty()
            || self.requirement_quantity.is_dirty()
            || self.usage_limit.is_dirty()
            || self.once_per_customer.is_dirty()
            || self.starts_at.is_dirty()
            || self.ends_at.is_dirty()
            || self.customer_tag.is_dirty()
            || self.percentage.is_dirty()
            || self.collections.is_dirty()
    }

    /// Reverts every field to its hydrated baseline and clears errors.
    pub fn reset(&mut self) {
        self.title.reset();
        self.method.reset();
        self.code.reset();
        self.combines_with.reset();
        self.requirement_type.reset();
        self.requirement_subtotal.reset();
        self.requirement_quantity.reset();
        self.usage_limit.reset();
        self.once_per_customer.reset();
        self.starts_at.reset();
        self.ends_at.reset();
        self.customer_tag.reset();
        self.percentage.reset();
        self.collections.reset();
    }

    /// Adopts every current value as the new baseline, leaving the form
    /// clean. Called after a successful submit.
    pub fn mark_clean(&mut self) {
        self.title.mark_clean();
        self.method.mark_clean();
        self.code.mark_clean();
        self.combines_with.mark_clean();
        self.requirement_type.mark_clean();
        self.requirement_subtotal.mark_clean();
        self.requirement_quantity.mark_clean();
        self.usage_limit.mark_clean();
        self.once_per_customer.mark_clean();
        self.starts_at.mark_clean();
        self.ends_at.mark_clean();
        self.customer_tag.mark_clean();
        self.percentage.mark_clean();
        self.collections.mark_clean();
    }

    /// Parses the numeric entries and checks the date range, attaching any
    /// failure to the offending field. Dirty state is untouched either way.
    pub fn validate(&mut self) -> AppResult<ValidatedEntries> {
        self.percentage.clear_errors();
        self.ends_at.clear_errors();
        self.usage_limit.clear_errors();

        let mut valid = true;

        let percentage = match self.percentage.value().trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.percentage.push_error("percentage must be a number");
                valid = false;
                0.0
            }
        };

        if let Some(ends_at) = *self.ends_at.value() {
            if ends_at < *self.starts_at.value() {
                self.ends_at
                    .push_error("end date must not precede the start date");
                valid = false;
            }
        }

        let usage_limit = match *self.method.value() {
            DiscountMethod::Automatic => None,
            DiscountMethod::Code => match self.usage_limit.value().trim().parse::<u32>() {
                Ok(limit) if limit > 0 => Some(limit),
                _ => {
                    self.usage_limit
                        .push_error("usage limit must be a positive whole number");
                    valid = false;
                    None
                }
            },
        };

        if !valid {
            return Err(AppError::Validation(
                "discount form has invalid fields".to_owned(),
            ));
        }

        Ok(ValidatedEntries {
            percentage,
            usage_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use promodesk_core::{DiscountId, NonEmptyString};
    use proptest::prelude::*;

    use super::super::discount::{
        CombinesWith, Discount, DiscountConfiguration, DiscountMethod, RequirementType,
    };
    use super::{DiscountForm, FieldEdit};

    fn clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn sample_discount() -> Discount {
        Discount::new(
            DiscountId::new("discount-7").unwrap_or_else(|_| unreachable!()),
            "SAVE10",
            DiscountMethod::Code,
            "SAVE10",
            CombinesWith {
                order_discounts: true,
                product_discounts: false,
                shipping_discounts: false,
            },
            Some(5),
            true,
            clock(),
            Some(clock() + Duration::days(30)),
            NonEmptyString::new("config-1").ok(),
            DiscountConfiguration {
                customer_tag: "vip".to_owned(),
                percentage: 10.0,
                collections: vec!["collection-1".to_owned()],
            },
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn hydrate_uses_defaults_when_record_is_absent() {
        let form = DiscountForm::hydrate(None, clock());

        assert_eq!(form.title.value(), "");
        assert_eq!(*form.method.value(), DiscountMethod::Code);
        assert_eq!(form.code.value(), "");
        assert_eq!(*form.combines_with.value(), CombinesWith::default());
        assert_eq!(*form.requirement_type.value(), RequirementType::None);
        assert_eq!(form.requirement_subtotal.value(), "0");
        assert_eq!(form.requirement_quantity.value(), "0");
        assert_eq!(form.usage_limit.value(), "");
        assert!(!form.once_per_customer.value());
        assert_eq!(*form.starts_at.value(), clock());
        assert_eq!(*form.ends_at.value(), None);
        assert_eq!(form.percentage.value(), "0");
        assert!(form.collections.value().is_empty());
        assert!(!form.is_dirty());
    }

    #[test]
    fn hydrate_reads_record_values() {
        let record = sample_discount();
        let form = DiscountForm::hydrate(Some(&record), clock());

        assert_eq!(form.title.value(), "SAVE10");
        assert_eq!(form.usage_limit.value(), "5");
        assert!(form.once_per_customer.value());
        assert_eq!(form.customer_tag.value(), "vip");
        assert_eq!(form.percentage.value(), "10");
        assert_eq!(form.collections.value().len(), 1);
        assert!(!form.is_dirty());
    }

    #[test]
    fn hydration_is_idempotent() {
        let record = sample_discount();
        let first = DiscountForm::hydrate(Some(&record), clock());
        let second = DiscountForm::hydrate(Some(&record), clock());
        assert_eq!(first, second);
    }

    #[test]
    fn writing_the_baseline_back_clears_the_dirty_bit() {
        let record = sample_discount();
        let mut form = DiscountForm::hydrate(Some(&record), clock());

        form.apply(FieldEdit::UsageLimit("10".to_owned()));
        assert!(form.usage_limit.is_dirty());
        assert!(form.is_dirty());

        form.apply(FieldEdit::UsageLimit("5".to_owned()));
        assert!(!form.usage_limit.is_dirty());
        assert!(!form.is_dirty());
    }

    #[test]
    fn reset_reverts_edits_and_errors() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Percentage("ten".to_owned()));
        assert!(form.validate().is_err());
        assert!(!form.percentage.errors().is_empty());

        form.reset();
        assert!(!form.is_dirty());
        assert!(form.percentage.errors().is_empty());
        assert_eq!(form.percentage.value(), "0");
    }

    #[test]
    fn mark_clean_adopts_current_values() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Title("Summer promo".to_owned()));
        assert!(form.is_dirty());

        form.mark_clean();
        assert!(!form.is_dirty());
        assert_eq!(form.title.value(), "Summer promo");
    }

    #[test]
    fn validate_rejects_unparsable_percentage() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Method(DiscountMethod::Automatic));
        form.apply(FieldEdit::Percentage("ten percent".to_owned()));

        assert!(form.validate().is_err());
        assert_eq!(
            form.percentage.errors(),
            ["percentage must be a number".to_owned()]
        );
    }

    #[test]
    fn validate_rejects_inverted_date_range() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Method(DiscountMethod::Automatic));
        form.apply(FieldEdit::EndsAt(Some(clock() - Duration::days(1))));

        assert!(form.validate().is_err());
        assert!(!form.ends_at.errors().is_empty());
    }

    #[test]
    fn validate_requires_positive_usage_limit_for_code_method() {
        let mut form = DiscountForm::hydrate(None, clock());
        assert!(form.validate().is_err());
        assert!(!form.usage_limit.errors().is_empty());

        form.apply(FieldEdit::UsageLimit("0".to_owned()));
        assert!(form.validate().is_err());

        form.apply(FieldEdit::UsageLimit("25".to_owned()));
        let entries = form.validate();
        assert!(entries.is_ok());
        assert_eq!(
            entries.ok().and_then(|entries| entries.usage_limit),
            Some(25)
        );
    }

    #[test]
    fn validate_ignores_usage_limit_for_automatic_method() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Method(DiscountMethod::Automatic));
        form.apply(FieldEdit::UsageLimit("not a number".to_owned()));

        let entries = form.validate();
        assert!(entries.is_ok());
        assert_eq!(entries.ok().map(|entries| entries.usage_limit), Some(None));
    }

    proptest! {
        #[test]
        fn any_edit_away_from_baseline_is_dirty_and_back_is_clean(text in ".*") {
            let mut form = DiscountForm::hydrate(None, clock());
            let baseline = form.title.value().clone();

            form.apply(FieldEdit::Title(text.clone()));
            prop_assert_eq!(form.title.is_dirty(), text != baseline);

            form.apply(FieldEdit::Title(baseline));
            prop_assert!(!form.title.is_dirty());
        }
    }
}
