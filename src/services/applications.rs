//! The applied-jobs list of a user: wholesale replacement, point lookup,
//! per-entry status updates and the reverse job → applicants lookup.

use serde_json::Value;
use tracing::debug;

use super::{ServiceError, ServiceResult};
use crate::database::models::{Applicant, AppliedJob, StatusChange};
use crate::database::ApplicationStore;

/// `jobIds` must be an array; each element is a full entry or a bare id.
pub fn parse_job_list(job_ids: Option<&Value>) -> ServiceResult<Vec<AppliedJob>> {
    let items = match job_ids {
        Some(Value::Array(items)) => items,
        _ => return Err(ServiceError::invalid("jobIds", "jobIds must be provided as an array")),
    };

    items
        .iter()
        .cloned()
        .map(|item| AppliedJob::from_value(item).map_err(|e| ServiceError::invalid("jobIds", e)))
        .collect()
}

pub fn find_entry<'a>(entries: &'a [AppliedJob], job_id: &str) -> Option<&'a AppliedJob> {
    entries.iter().find(|entry| entry.matches(job_id))
}

pub async fn set_all<S>(store: &S, user_id: i64, job_ids: Option<&Value>) -> ServiceResult<Vec<AppliedJob>>
where
    S: ApplicationStore + ?Sized,
{
    let entries = parse_job_list(job_ids)?;
    debug!("Replacing {} applied jobs for user {}", entries.len(), user_id);

    store
        .replace_applications(user_id, entries)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn list<S>(store: &S, user_id: i64) -> ServiceResult<Vec<AppliedJob>>
where
    S: ApplicationStore + ?Sized,
{
    store
        .applications(user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

pub async fn get_entry<S>(store: &S, user_id: i64, job_id: &str) -> ServiceResult<AppliedJob>
where
    S: ApplicationStore + ?Sized,
{
    let entries = list(store, user_id).await?;
    find_entry(&entries, job_id)
        .cloned()
        .ok_or_else(|| ServiceError::not_found("Job not found in appliedFor list"))
}

pub async fn update_status<S>(store: &S, user_id: i64, job_id: &str, status: Option<&str>) -> ServiceResult<AppliedJob>
where
    S: ApplicationStore + ?Sized,
{
    let status = status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServiceError::invalid("status", "Missing 'status' in request body."))?;

    match store.set_application_status(user_id, job_id, status).await? {
        StatusChange::Updated(entry) => {
            debug!("User {} application {} is now '{}'", user_id, job_id, status);
            Ok(entry)
        }
        StatusChange::EntryMissing => Err(ServiceError::not_found(format!(
            "Job {} not found in user's appliedFor.",
            job_id
        ))),
        StatusChange::UserMissing => Err(ServiceError::not_found("User not found.")),
    }
}

pub async fn applicants<S>(store: &S, job_id: &str) -> ServiceResult<Vec<Applicant>>
where
    S: ApplicationStore + ?Sized,
{
    let applicants = store.applicants(job_id).await?;
    if applicants.is_empty() {
        return Err(ServiceError::not_found("No users found for the given jobId."));
    }
    Ok(applicants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewUser;
    use crate::database::{MemoryStore, UserStore};
    use serde_json::json;

    async fn store_with_applications(entries: Value) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_user(NewUser {
                user_id: 5,
                full_name: "Ada".into(),
                gender: None,
                email: "ada@example.com".into(),
                phone: Some("555".into()),
                location: None,
                birth_date: None,
                pincode: None,
            })
            .await
            .unwrap();
        set_all(&store, 5, Some(&entries)).await.unwrap();
        store
    }

    #[test]
    fn job_list_must_be_an_array() {
        assert!(matches!(
            parse_job_list(Some(&json!("1,2"))),
            Err(ServiceError::Validation { field: Some("jobIds"), .. })
        ));
        assert!(parse_job_list(None).is_err());
        assert_eq!(parse_job_list(Some(&json!([1, "2"]))).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn set_all_overwrites_instead_of_merging() {
        let store = store_with_applications(json!([{ "id": 1 }, { "id": 2 }])).await;
        let replaced = set_all(&store, 5, Some(&json!([{ "id": 3 }]))).await.unwrap();
        assert_eq!(replaced.len(), 1);
        assert_eq!(list(&store, 5).await.unwrap(), replaced);
    }

    #[tokio::test]
    async fn any_array_is_accepted_verbatim() {
        let entries = json!([
            { "id": 1, "appliedOn": 1712345678000_i64, "status": "applied" },
            { "id": 1.5 },
            "job-9",
        ]);
        let store = store_with_applications(entries).await;

        let stored = serde_json::to_value(list(&store, 5).await.unwrap()).unwrap();
        assert_eq!(
            stored,
            json!([
                { "id": 1, "appliedOn": 1712345678000_i64, "status": "applied" },
                { "id": 1.5 },
                { "id": "job-9" },
            ])
        );
        assert!(get_entry(&store, 5, "1.5").await.is_ok());
    }

    #[tokio::test]
    async fn missing_entry_is_not_found_and_list_is_untouched() {
        let store = store_with_applications(json!([{ "id": 1, "status": "applied" }])).await;
        let before = list(&store, 5).await.unwrap();

        let err = update_status(&store, 5, "99", Some("hired")).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(list(&store, 5).await.unwrap(), before);
    }

    #[tokio::test]
    async fn status_update_is_scoped_and_idempotent() {
        let store = store_with_applications(json!([
            { "id": 1, "appliedOn": "2024-03-01", "status": "applied", "source": "board" },
            { "id": "2", "appliedOn": "2024-03-02", "status": "applied" }
        ]))
        .await;

        let updated = update_status(&store, 5, "1", Some("interview")).await.unwrap();
        assert_eq!(updated.status, Some(json!("interview")));
        assert_eq!(updated.applied_on, Some(json!("2024-03-01")));
        assert_eq!(updated.extra["source"], "board");

        let once = list(&store, 5).await.unwrap();
        assert_eq!(once[1].status, Some(json!("applied")));

        update_status(&store, 5, "1", Some("interview")).await.unwrap();
        assert_eq!(list(&store, 5).await.unwrap(), once);
    }

    #[tokio::test]
    async fn status_is_required() {
        let store = store_with_applications(json!([{ "id": 1 }])).await;
        for status in [None, Some(""), Some("   ")] {
            assert!(matches!(
                update_status(&store, 5, "1", status).await,
                Err(ServiceError::Validation { field: Some("status"), .. })
            ));
        }
    }

    #[tokio::test]
    async fn applicants_strip_the_full_list() {
        let store = store_with_applications(json!([{ "id": 7, "appliedOn": "2024-04-04", "status": "applied" }])).await;
        let found = applicants(&store, "7").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ada");
        assert_eq!(found[0].applied_on, Some(json!("2024-04-04")));

        assert!(matches!(applicants(&store, "8").await, Err(ServiceError::NotFound(_))));
    }
}
