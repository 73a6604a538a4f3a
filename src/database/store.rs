//! Record access traits. Handlers and services only ever see these; the
//! Postgres and in-memory backends implement all of them.

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Applicant, AppliedJob, Attachment, Message, NewAttachment, NewMessage, NewPreference, NewSkill,
    NewUser, Notification, PeerInfo, Portfolio, PortfolioLinks, Preference, PreferenceField,
    PreferenceUpdate, Skill, SkillChanges, StatusChange, User, UserUpdate,
};

#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn health_check(&self) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the email or user id is taken
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError>;
    async fn find_user(&self, user_id: i64) -> Result<Option<User>, DatabaseError>;
    async fn update_user(&self, user_id: i64, changes: UserUpdate) -> Result<Option<User>, DatabaseError>;
    async fn delete_user(&self, user_id: i64) -> Result<bool, DatabaseError>;
    async fn peer_info(&self, user_ids: &[i64]) -> Result<Vec<PeerInfo>, DatabaseError>;
}

/// The applied-jobs list of each user, one row per entry
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// `None` when the user does not exist
    async fn applications(&self, user_id: i64) -> Result<Option<Vec<AppliedJob>>, DatabaseError>;
    /// Overwrites the whole list; `None` when the user does not exist
    async fn replace_applications(
        &self,
        user_id: i64,
        entries: Vec<AppliedJob>,
    ) -> Result<Option<Vec<AppliedJob>>, DatabaseError>;
    /// Sets `status` on every entry whose id matches `job_id`
    async fn set_application_status(
        &self,
        user_id: i64,
        job_id: &str,
        status: &str,
    ) -> Result<StatusChange, DatabaseError>;
    async fn applicants(&self, job_id: &str) -> Result<Vec<Applicant>, DatabaseError>;
}

#[async_trait]
pub trait SkillStore: Send + Sync {
    async fn create_skills(&self, user_id: i64, skills: Vec<NewSkill>) -> Result<Vec<Skill>, DatabaseError>;
    async fn skills_for_user(&self, user_id: i64) -> Result<Vec<Skill>, DatabaseError>;
    async fn all_skills(&self) -> Result<Vec<Skill>, DatabaseError>;
    async fn update_skill(&self, id: i64, changes: SkillChanges) -> Result<Option<Skill>, DatabaseError>;
    async fn delete_skill(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn create_message(&self, message: NewMessage) -> Result<Message, DatabaseError>;
    /// Every message sent or received by `user_id`, newest first
    async fn messages_involving(&self, user_id: i64) -> Result<Vec<Message>, DatabaseError>;
    /// Messages exchanged between two users, oldest first
    async fn messages_between(&self, user_id: i64, peer_id: i64) -> Result<Vec<Message>, DatabaseError>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn find_notification(&self, receiver_id: i64, message: &str) -> Result<Option<Notification>, DatabaseError>;
    async fn create_notification(&self, receiver_id: i64, message: &str) -> Result<Notification, DatabaseError>;
    /// Newest first
    async fn notifications_for(&self, receiver_id: i64) -> Result<Vec<Notification>, DatabaseError>;
    async fn mark_notification_read(&self, id: i64, receiver_id: i64) -> Result<Option<Notification>, DatabaseError>;
    async fn mark_all_notifications_read(&self, receiver_id: i64) -> Result<u64, DatabaseError>;
    async fn delete_notification(&self, id: i64, receiver_id: i64) -> Result<bool, DatabaseError>;
}

/// Unit of work covering an attachment insert and a portfolio upsert.
/// Nothing is visible to other readers until `commit`.
#[async_trait]
pub trait ProfileTransaction: Send {
    async fn insert_attachment(&mut self, attachment: NewAttachment) -> Result<Attachment, DatabaseError>;
    async fn upsert_portfolio(&mut self, user_id: i64, links: &PortfolioLinks) -> Result<Portfolio, DatabaseError>;
    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn begin_profile_update(&self) -> Result<Box<dyn ProfileTransaction>, DatabaseError>;
    async fn attachments_for(&self, user_id: i64) -> Result<Vec<Attachment>, DatabaseError>;
    async fn find_attachment(&self, id: i64) -> Result<Option<Attachment>, DatabaseError>;
    async fn portfolio_for(&self, user_id: i64) -> Result<Option<Portfolio>, DatabaseError>;
    async fn update_portfolio(&self, id: i64, links: &PortfolioLinks) -> Result<bool, DatabaseError>;
    async fn delete_attachment(&self, id: i64) -> Result<bool, DatabaseError>;
    async fn delete_portfolio(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn create_preference(&self, preference: NewPreference) -> Result<Preference, DatabaseError>;
    async fn preferences_for(&self, user_id: i64) -> Result<Vec<Preference>, DatabaseError>;
    async fn update_preference(&self, id: i64, changes: PreferenceUpdate) -> Result<bool, DatabaseError>;
    /// Sets one whitelisted column to the empty string
    async fn clear_preference_field(&self, id: i64, field: PreferenceField) -> Result<bool, DatabaseError>;
}

/// Everything the HTTP layer needs from a backend
pub trait Store:
    StoreHealth
    + UserStore
    + ApplicationStore
    + SkillStore
    + MessageStore
    + NotificationStore
    + ProfileStore
    + PreferenceStore
{
}

impl<T> Store for T where
    T: StoreHealth
        + UserStore
        + ApplicationStore
        + SkillStore
        + MessageStore
        + NotificationStore
        + ProfileStore
        + PreferenceStore
{
}
