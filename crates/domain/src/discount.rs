use std::str::FromStr;

use chrono::{DateTime, Utc};
use promodesk_core::{AppError, AppResult, DiscountId, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Mode distinguishing a code-redeemed discount from an automatically
/// applied one. Determines which fields are relevant and how the remote
/// service scopes update and delete requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountMethod {
    /// Customer redeems the discount by entering a code.
    Code,
    /// Discount is applied automatically at checkout.
    Automatic,
}

impl DiscountMethod {
    /// Returns the path segment the remote service scopes requests by.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Automatic => "automatic",
        }
    }
}

impl FromStr for DiscountMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "code" => Ok(Self::Code),
            "automatic" => Ok(Self::Automatic),
            _ => Err(AppError::Validation(format!(
                "unknown discount method '{value}'"
            ))),
        }
    }
}

/// Which other discount classes this discount may combine with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinesWith {
    /// Stacks with order discounts.
    pub order_discounts: bool,
    /// Stacks with other product discounts.
    pub product_discounts: bool,
    /// Stacks with shipping discounts.
    pub shipping_discounts: bool,
}

/// Minimum purchase requirement mode presented alongside the discount form.
///
/// Requirement fields are edited in the form but never sent to the remote
/// service; the discount function evaluates requirements on its own side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    /// No minimum requirement.
    #[default]
    None,
    /// Minimum purchase subtotal.
    Subtotal,
    /// Minimum item quantity.
    Quantity,
}

impl RequirementType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Subtotal => "subtotal",
            Self::Quantity => "quantity",
        }
    }
}

impl FromStr for RequirementType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "none" => Ok(Self::None),
            "subtotal" => Ok(Self::Subtotal),
            "quantity" => Ok(Self::Quantity),
            _ => Err(AppError::Validation(format!(
                "unknown requirement type '{value}'"
            ))),
        }
    }
}

/// Free-form configuration attached to a discount through its metafield.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountConfiguration {
    /// Customer tag the discount is restricted to, empty when unrestricted.
    #[serde(default)]
    pub customer_tag: String,
    /// Percentage taken off the eligible lines.
    #[serde(default)]
    pub percentage: f64,
    /// Identifiers of the collections the discount targets.
    #[serde(default)]
    pub collections: Vec<String>,
}

/// Authoritative snapshot of a discount as last loaded from the remote
/// service. Immutable once constructed; the form tracks edits separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    id: DiscountId,
    title: String,
    method: DiscountMethod,
    code: String,
    combines_with: CombinesWith,
    usage_limit: Option<u32>,
    applies_once_per_customer: bool,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    configuration_id: Option<NonEmptyString>,
    configuration: DiscountConfiguration,
}

impl Discount {
    /// Creates a validated discount snapshot.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: DiscountId,
        title: impl Into<String>,
        method: DiscountMethod,
        code: impl Into<String>,
        combines_with: CombinesWith,
        usage_limit: Option<u32>,
        applies_once_per_customer: bool,
        starts_at: DateTime<Utc>,
        ends_at: Option<DateTime<Utc>>,
        configuration_id: Option<NonEmptyString>,
        configuration: DiscountConfiguration,
    ) -> AppResult<Self> {
        if usage_limit == Some(0) {
            return Err(AppError::Validation(
                "usage limit must be a positive number when set".to_owned(),
            ));
        }

        if let Some(ends_at) = ends_at {
            if ends_at < starts_at {
                return Err(AppError::Validation(
                    "discount end date must not precede its start date".to_owned(),
                ));
            }
        }

        Ok(Self {
            id,
            title: title.into(),
            method,
            code: code.into(),
            combines_with,
            usage_limit,
            applies_once_per_customer,
            starts_at,
            ends_at,
            configuration_id,
            configuration,
        })
    }

    /// Returns remote identity.
    #[must_use]
    pub fn id(&self) -> &DiscountId {
        &self.id
    }

    /// Returns display title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns discount method.
    #[must_use]
    pub fn method(&self) -> DiscountMethod {
        self.method
    }

    /// Returns redemption code, empty for automatic discounts.
    #[must_use]
    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    /// Returns combination flags.
    #[must_use]
    pub fn combines_with(&self) -> CombinesWith {
        self.combines_with
    }

    /// Returns total usage limit when one is set.
    #[must_use]
    pub fn usage_limit(&self) -> Option<u32> {
        self.usage_limit
    }

    /// Returns whether each customer may redeem the discount only once.
    #[must_use]
    pub fn applies_once_per_customer(&self) -> bool {
        self.applies_once_per_customer
    }

    /// Returns activation timestamp.
    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    /// Returns expiry timestamp when one is set.
    #[must_use]
    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.ends_at
    }

    /// Returns identity of the pre-existing configuration record.
    #[must_use]
    pub fn configuration_id(&self) -> Option<&NonEmptyString> {
        self.configuration_id.as_ref()
    }

    /// Returns configuration payload.
    #[must_use]
    pub fn configuration(&self) -> &DiscountConfiguration {
        &self.configuration
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{Duration, Utc};
    use promodesk_core::DiscountId;

    use super::{CombinesWith, Discount, DiscountConfiguration, DiscountMethod, RequirementType};

    fn discount_id() -> DiscountId {
        DiscountId::new("discount-1").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn method_round_trips_through_path_segment() {
        for method in [DiscountMethod::Code, DiscountMethod::Automatic] {
            let parsed = DiscountMethod::from_str(method.as_str());
            assert_eq!(parsed.ok(), Some(method));
        }
    }

    #[test]
    fn requirement_type_rejects_unknown_value() {
        assert!(RequirementType::from_str("weight").is_err());
    }

    #[test]
    fn discount_rejects_zero_usage_limit() {
        let result = Discount::new(
            discount_id(),
            "Spring promo",
            DiscountMethod::Code,
            "SPRING",
            CombinesWith::default(),
            Some(0),
            false,
            Utc::now(),
            None,
            None,
            DiscountConfiguration::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn discount_rejects_inverted_date_range() {
        let starts_at = Utc::now();
        let result = Discount::new(
            discount_id(),
            "Spring promo",
            DiscountMethod::Automatic,
            "",
            CombinesWith::default(),
            None,
            false,
            starts_at,
            Some(starts_at - Duration::days(1)),
            None,
            DiscountConfiguration::default(),
        );
        assert!(result.is_err());
    }
}
