use tracing::debug;

use super::{ServiceError, ServiceResult};
use crate::database::models::Notification;
use crate::database::NotificationStore;

/// Result of a dedup-create
#[derive(Debug, Clone, PartialEq)]
pub enum Created {
    New(Notification),
    Existing(Notification),
}

/// Returns the stored row instead of inserting when the same message was
/// already sent to the same receiver. Check-then-insert, not atomic.
pub async fn create<S>(store: &S, receiver_id: Option<i64>, message: Option<&str>) -> ServiceResult<Created>
where
    S: NotificationStore + ?Sized,
{
    let (receiver_id, message) = match (receiver_id, message.filter(|m| !m.is_empty())) {
        (Some(receiver_id), Some(message)) if receiver_id != 0 => (receiver_id, message),
        _ => return Err(ServiceError::validation("receiverId & message are required")),
    };

    if let Some(existing) = store.find_notification(receiver_id, message).await? {
        debug!("Notification {} already exists for receiver {}", existing.id, receiver_id);
        return Ok(Created::Existing(existing));
    }

    Ok(Created::New(store.create_notification(receiver_id, message).await?))
}

pub async fn list<S>(store: &S, receiver_id: i64) -> ServiceResult<Vec<Notification>>
where
    S: NotificationStore + ?Sized,
{
    Ok(store.notifications_for(receiver_id).await?)
}

pub async fn mark_read<S>(store: &S, id: i64, receiver_id: i64) -> ServiceResult<Notification>
where
    S: NotificationStore + ?Sized,
{
    store
        .mark_notification_read(id, receiver_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Notification not found"))
}

pub async fn mark_all_read<S>(store: &S, receiver_id: i64) -> ServiceResult<u64>
where
    S: NotificationStore + ?Sized,
{
    Ok(store.mark_all_notifications_read(receiver_id).await?)
}

pub async fn delete<S>(store: &S, id: i64, receiver_id: i64) -> ServiceResult<()>
where
    S: NotificationStore + ?Sized,
{
    if store.delete_notification(id, receiver_id).await? {
        Ok(())
    } else {
        Err(ServiceError::not_found("Notification not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    #[tokio::test]
    async fn second_create_returns_first_row() {
        let store = MemoryStore::new();
        let first = match create(&store, Some(4), Some("You have a new applicant")).await.unwrap() {
            Created::New(n) => n,
            other => panic!("expected a new row, got {:?}", other),
        };
        let second = create(&store, Some(4), Some("You have a new applicant")).await.unwrap();

        assert_eq!(second, Created::Existing(first));
        assert_eq!(list(&store, 4).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn requires_receiver_and_message() {
        let store = MemoryStore::new();
        assert!(create(&store, None, Some("hi")).await.is_err());
        assert!(create(&store, Some(4), Some("")).await.is_err());
        assert!(create(&store, Some(4), None).await.is_err());
    }

    #[tokio::test]
    async fn read_and_delete_are_scoped_to_receiver() {
        let store = MemoryStore::new();
        let Created::New(n) = create(&store, Some(4), Some("hello")).await.unwrap() else {
            panic!("expected a new row");
        };

        assert!(matches!(mark_read(&store, n.id, 5).await, Err(ServiceError::NotFound(_))));
        assert!(mark_read(&store, n.id, 4).await.unwrap().is_read);
        assert!(matches!(delete(&store, n.id, 5).await, Err(ServiceError::NotFound(_))));
        delete(&store, n.id, 4).await.unwrap();
    }

    #[tokio::test]
    async fn mark_all_counts_only_unread() {
        let store = MemoryStore::new();
        create(&store, Some(4), Some("a")).await.unwrap();
        create(&store, Some(4), Some("b")).await.unwrap();
        assert_eq!(mark_all_read(&store, 4).await.unwrap(), 2);
        assert_eq!(mark_all_read(&store, 4).await.unwrap(), 0);
    }
}
