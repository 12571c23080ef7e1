use chrono::{DateTime, Utc};
use serde::Serialize;

use promodesk_core::{AppError, AppResult, NonEmptyString};
use promodesk_domain::{CombinesWith, DiscountForm, DiscountMethod, ValidatedEntries};

/// Metafield entry carrying the serialized configuration blob.
///
/// The `id` key is present only when a configuration record already exists;
/// the remote service requires it for updates and rejects it on first write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetafieldInput {
    /// Identity of the pre-existing configuration record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Serialized JSON blob of the configuration payload.
    pub value: String,
}

/// Configuration blob serialized into the metafield value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationPayload {
    /// Customer tag restriction.
    pub customer_tag: String,
    /// Percentage taken off, parsed to a float before serialization.
    pub percentage: f64,
    /// Targeted collection identifiers.
    pub collections: Vec<String>,
}

/// Update body for a code-redeemed discount.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDiscountUpdate {
    /// Combination flags.
    pub combines_with: CombinesWith,
    /// Activation date.
    pub starts_at: DateTime<Utc>,
    /// Expiry date, serialized as an explicit null while unset.
    pub ends_at: Option<DateTime<Utc>>,
    /// Single metafield entry with the configuration blob.
    pub metafields: Vec<MetafieldInput>,
    /// Total usage limit.
    pub usage_limit: u32,
    /// Once-per-customer redemption flag.
    pub applies_once_per_customer: bool,
    /// Redemption code.
    pub code: String,
    /// Title; always equal to the code for code discounts.
    pub title: String,
}

/// Update body for an automatically applied discount.
///
/// The usage-limit and once-per-customer keys do not exist on this shape, so
/// their absence on the wire is distinguishable from an explicit zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticDiscountUpdate {
    /// Combination flags.
    pub combines_with: CombinesWith,
    /// Activation date.
    pub starts_at: DateTime<Utc>,
    /// Expiry date, serialized as an explicit null while unset.
    pub ends_at: Option<DateTime<Utc>>,
    /// Single metafield entry with the configuration blob.
    pub metafields: Vec<MetafieldInput>,
    /// Display title.
    pub title: String,
}

/// Outbound update payload, one distinct shape per discount method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiscountUpdate {
    /// Code-redeemed discount body.
    Code(CodeDiscountUpdate),
    /// Automatically applied discount body.
    Automatic(AutomaticDiscountUpdate),
}

impl DiscountUpdate {
    /// Builds the wire payload from the live form. Pure; called once per
    /// submit attempt after the form validated clean.
    pub fn from_form(
        form: &DiscountForm,
        entries: ValidatedEntries,
        configuration_id: Option<&NonEmptyString>,
    ) -> AppResult<Self> {
        let blob = ConfigurationPayload {
            customer_tag: form.customer_tag.value().clone(),
            percentage: entries.percentage,
            collections: form.collections.value().clone(),
        };
        let value = serde_json::to_string(&blob).map_err(|error| {
            AppError::Internal(format!("failed to serialize discount configuration: {error}"))
        })?;
        let metafields = vec![MetafieldInput {
            id: configuration_id.map(|id| id.as_str().to_owned()),
            value,
        }];

        match *form.method.value() {
            DiscountMethod::Code => {
                let usage_limit = entries.usage_limit.ok_or_else(|| {
                    AppError::Internal(
                        "validated entries carry no usage limit for a code discount".to_owned(),
                    )
                })?;

                Ok(Self::Code(CodeDiscountUpdate {
                    combines_with: *form.combines_with.value(),
                    starts_at: *form.starts_at.value(),
                    ends_at: *form.ends_at.value(),
                    metafields,
                    usage_limit,
                    applies_once_per_customer: *form.once_per_customer.value(),
                    code: form.code.value().clone(),
                    title: form.code.value().clone(),
                }))
            }
            DiscountMethod::Automatic => Ok(Self::Automatic(AutomaticDiscountUpdate {
                combines_with: *form.combines_with.value(),
                starts_at: *form.starts_at.value(),
                ends_at: *form.ends_at.value(),
                metafields,
                title: form.title.value().clone(),
            })),
        }
    }

    /// Returns the discount method this payload is scoped by.
    #[must_use]
    pub fn method(&self) -> DiscountMethod {
        match self {
            Self::Code(_) => DiscountMethod::Code,
            Self::Automatic(_) => DiscountMethod::Automatic,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use promodesk_domain::{DiscountForm, DiscountMethod, FieldEdit};
    use serde_json::Value;

    use super::DiscountUpdate;

    fn build(form: &mut DiscountForm) -> Value {
        let entries = form.validate().unwrap_or_else(|_| unreachable!());
        let update = DiscountUpdate::from_form(form, entries, None)
            .unwrap_or_else(|_| unreachable!());
        serde_json::to_value(&update).unwrap_or_default()
    }

    fn clock() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    #[test]
    fn code_payload_sets_title_from_code() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Code("SAVE10".to_owned()));
        form.apply(FieldEdit::Title("ignored".to_owned()));
        form.apply(FieldEdit::UsageLimit("5".to_owned()));

        let body = build(&mut form);
        assert_eq!(body["code"], "SAVE10");
        assert_eq!(body["title"], "SAVE10");
        assert_eq!(body["usageLimit"], 5);
        assert_eq!(body["appliesOncePerCustomer"], false);
    }

    #[test]
    fn automatic_payload_has_no_usage_keys() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Method(DiscountMethod::Automatic));
        form.apply(FieldEdit::Title("Holiday special".to_owned()));

        let body = build(&mut form);
        assert_eq!(body["title"], "Holiday special");
        assert!(body.get("usageLimit").is_none());
        assert!(body.get("appliesOncePerCustomer").is_none());
        assert!(body.get("code").is_none());
    }

    #[test]
    fn metafield_blob_carries_parsed_percentage() {
        let mut form = DiscountForm::hydrate(None, clock());
        form.apply(FieldEdit::Method(DiscountMethod::Automatic));
        form.apply(FieldEdit::Percentage("12.5".to_owned()));
        form.apply(FieldEdit::CustomerTag("vip".to_owned()));

        let body = build(&mut form);
        let value = body["metafields"][0]["value"]
            .as_str()
            .unwrap_or_default();
        let blob: Value = serde_json::from_str(value).unwrap_or_default();
        assert_eq!(blob["percentage"], 12.5);
        assert_eq!(blob["customerTag"], "vip");
        assert!(body["metafields"][0].get("id").is_none());
    }
}
