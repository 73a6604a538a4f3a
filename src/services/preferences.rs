use super::{ServiceError, ServiceResult};
use crate::database::models::{NewPreference, Preference, PreferenceField, PreferenceUpdate};
use crate::database::PreferenceStore;

/// Resolves the requested field against the closed set of clearable columns
pub fn parse_field(field: Option<&str>) -> ServiceResult<PreferenceField> {
    field
        .ok_or_else(|| ServiceError::invalid("field", "Invalid field name"))?
        .parse()
        .map_err(|e: String| ServiceError::invalid("field", e))
}

pub async fn create<S>(store: &S, preference: NewPreference) -> ServiceResult<Preference>
where
    S: PreferenceStore + ?Sized,
{
    Ok(store.create_preference(preference).await?)
}

pub async fn list<S>(store: &S, user_id: i64) -> ServiceResult<Vec<Preference>>
where
    S: PreferenceStore + ?Sized,
{
    let preferences = store.preferences_for(user_id).await?;
    if preferences.is_empty() {
        return Err(ServiceError::not_found("No preferences found for this user"));
    }
    Ok(preferences)
}

pub async fn update<S>(store: &S, id: i64, changes: PreferenceUpdate) -> ServiceResult<()>
where
    S: PreferenceStore + ?Sized,
{
    if store.update_preference(id, changes).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Preference not found"))
    }
}

/// Empties one preference column. The field name is checked before the
/// store is touched.
pub async fn clear_field<S>(store: &S, id: i64, field: Option<&str>) -> ServiceResult<PreferenceField>
where
    S: PreferenceStore + ?Sized,
{
    let field = parse_field(field)?;
    if store.clear_preference_field(id, field).await? {
        Ok(field)
    } else {
        Err(ServiceError::not_found("Preference not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts every call so tests can prove the store was never reached
    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PreferenceStore for CountingStore {
        async fn create_preference(&self, _: NewPreference) -> Result<Preference, DatabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(DatabaseError::NotFound("unused".into()))
        }

        async fn preferences_for(&self, _: i64) -> Result<Vec<Preference>, DatabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }

        async fn update_preference(&self, _: i64, _: PreferenceUpdate) -> Result<bool, DatabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }

        async fn clear_preference_field(&self, _: i64, _: PreferenceField) -> Result<bool, DatabaseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(true)
        }
    }

    #[tokio::test]
    async fn unknown_field_never_reaches_the_store() {
        let store = CountingStore::default();
        let err = clear_field(&store, 1, Some("salary")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: Some("field"), .. }));

        assert!(clear_field(&store, 1, None).await.is_err());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitelisted_field_is_cleared() {
        let store = CountingStore::default();
        assert_eq!(
            clear_field(&store, 1, Some("workplace")).await.unwrap(),
            PreferenceField::Workplace
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_list_is_not_found() {
        let store = CountingStore::default();
        assert!(matches!(list(&store, 3).await, Err(ServiceError::NotFound(_))));
    }
}
