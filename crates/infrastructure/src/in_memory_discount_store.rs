use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use promodesk_application::{
    DiscountGateway, DiscountLoader, DiscountUpdate, MutationOutcome, RemoteError,
};
use promodesk_core::{AppError, AppResult, DiscountId};
use promodesk_domain::{Discount, DiscountConfiguration, DiscountMethod};

/// In-memory discount service double.
///
/// Backs the dev console and integration-style tests: updates and deletes
/// mutate seeded records the way the real service would, including user
/// errors for missing records and method mismatches.
#[derive(Debug, Default)]
pub struct InMemoryDiscountStore {
    records: RwLock<HashMap<DiscountId, Discount>>,
}

impl InMemoryDiscountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts or replaces one record.
    pub async fn seed(&self, discount: Discount) {
        self.records
            .write()
            .await
            .insert(discount.id().clone(), discount);
    }

    fn configuration_from(update: &DiscountUpdate) -> DiscountConfiguration {
        let metafields = match update {
            DiscountUpdate::Code(body) => &body.metafields,
            DiscountUpdate::Automatic(body) => &body.metafields,
        };

        metafields
            .first()
            .and_then(|field| serde_json::from_str::<DiscountConfiguration>(&field.value).ok())
            .unwrap_or_default()
    }

    fn user_error(message: impl Into<String>) -> MutationOutcome {
        MutationOutcome {
            user_errors: vec![RemoteError {
                message: message.into(),
            }],
        }
    }
}

#[async_trait]
impl DiscountGateway for InMemoryDiscountStore {
    async fn update_discount(
        &self,
        id: &DiscountId,
        update: DiscountUpdate,
    ) -> AppResult<MutationOutcome> {
        let mut records = self.records.write().await;
        let Some(existing) = records.get(id) else {
            return Ok(Self::user_error(format!("Discount '{id}' was not found.")));
        };
        if existing.method() != update.method() {
            return Ok(Self::user_error(
                "Discount method cannot be changed after creation.",
            ));
        }

        let configuration = Self::configuration_from(&update);
        let configuration_id = existing.configuration_id().cloned();
        let updated = match update {
            DiscountUpdate::Code(body) => Discount::new(
                id.clone(),
                body.title,
                DiscountMethod::Code,
                body.code,
                body.combines_with,
                Some(body.usage_limit),
                body.applies_once_per_customer,
                body.starts_at,
                body.ends_at,
                configuration_id,
                configuration,
            ),
            DiscountUpdate::Automatic(body) => Discount::new(
                id.clone(),
                body.title,
                DiscountMethod::Automatic,
                existing.code().to_owned(),
                body.combines_with,
                existing.usage_limit(),
                existing.applies_once_per_customer(),
                body.starts_at,
                body.ends_at,
                configuration_id,
                configuration,
            ),
        };

        match updated {
            Ok(discount) => {
                records.insert(id.clone(), discount);
                Ok(MutationOutcome::default())
            }
            Err(error) => Ok(Self::user_error(error.to_string())),
        }
    }

    async fn delete_discount(&self, method: DiscountMethod, id: &DiscountId) -> AppResult<()> {
        let mut records = self.records.write().await;
        let matches_method = records
            .get(id)
            .is_some_and(|existing| existing.method() == method);
        if !matches_method {
            return Err(AppError::NotFound(format!(
                "no {} discount '{id}' to delete",
                method.as_str()
            )));
        }

        records.remove(id);
        Ok(())
    }
}

#[async_trait]
impl DiscountLoader for InMemoryDiscountStore {
    async fn load_discount(&self, id: &DiscountId) -> AppResult<Option<Discount>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use promodesk_core::{DiscountId, NonEmptyString};
    use promodesk_domain::{
        CombinesWith, Discount, DiscountConfiguration, DiscountForm, DiscountMethod, FieldEdit,
    };

    use promodesk_application::{DiscountGateway, DiscountLoader, DiscountUpdate};

    use super::InMemoryDiscountStore;

    fn discount_id() -> DiscountId {
        DiscountId::new("discount-1").unwrap_or_else(|_| unreachable!())
    }

    fn clock() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }

    fn seeded_record() -> Discount {
        Discount::new(
            discount_id(),
            "SAVE10",
            DiscountMethod::Code,
            "SAVE10",
            CombinesWith::default(),
            Some(5),
            true,
            clock(),
            None,
            NonEmptyString::new("config-1").ok(),
            DiscountConfiguration {
                customer_tag: String::new(),
                percentage: 10.0,
                collections: Vec::new(),
            },
        )
        .unwrap_or_else(|_| unreachable!())
    }

    fn code_update(record: &Discount, usage_limit: &str) -> DiscountUpdate {
        let mut form = DiscountForm::hydrate(Some(record), clock());
        form.apply(FieldEdit::UsageLimit(usage_limit.to_owned()));
        let entries = form.validate().unwrap_or_else(|_| unreachable!());
        DiscountUpdate::from_form(&form, entries, record.configuration_id())
            .unwrap_or_else(|_| unreachable!())
    }

    #[tokio::test]
    async fn update_applies_to_the_seeded_record() {
        let store = InMemoryDiscountStore::new();
        let record = seeded_record();
        store.seed(record.clone()).await;

        let outcome = store
            .update_discount(&discount_id(), code_update(&record, "25"))
            .await;
        assert!(outcome.is_ok_and(|outcome| outcome.user_errors.is_empty()));

        let loaded = store.load_discount(&discount_id()).await;
        let usage_limit = loaded
            .ok()
            .flatten()
            .and_then(|discount| discount.usage_limit());
        assert_eq!(usage_limit, Some(25));
    }

    #[tokio::test]
    async fn update_of_a_missing_record_is_a_user_error() {
        let store = InMemoryDiscountStore::new();
        let record = seeded_record();

        let outcome = store
            .update_discount(&discount_id(), code_update(&record, "25"))
            .await;

        assert!(outcome.is_ok_and(|outcome| !outcome.user_errors.is_empty()));
    }

    #[tokio::test]
    async fn delete_removes_the_record_when_the_method_matches() {
        let store = InMemoryDiscountStore::new();
        store.seed(seeded_record()).await;

        let wrong_method = store
            .delete_discount(DiscountMethod::Automatic, &discount_id())
            .await;
        assert!(wrong_method.is_err());

        let deleted = store
            .delete_discount(DiscountMethod::Code, &discount_id())
            .await;
        assert!(deleted.is_ok());

        let loaded = store.load_discount(&discount_id()).await;
        assert!(loaded.is_ok_and(|record| record.is_none()));
    }
}
