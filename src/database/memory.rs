//! In-memory backend for `serve --in-memory` and the test suite.
//!
//! Every table lives behind one `std::sync::Mutex`; the lock is only taken in
//! synchronous sections and never held across an await.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    apply_status, Applicant, AppliedJob, Attachment, Message, NewAttachment, NewMessage, NewPreference,
    NewSkill, NewUser, Notification, PeerInfo, Portfolio, PortfolioLinks, Preference, PreferenceField,
    PreferenceUpdate, Skill, SkillChanges, StatusChange, User, UserUpdate,
};
use crate::database::store::{
    ApplicationStore, MessageStore, NotificationStore, PreferenceStore, ProfileStore, ProfileTransaction,
    SkillStore, StoreHealth, UserStore,
};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    skills: Vec<Skill>,
    messages: Vec<Message>,
    notifications: Vec<Notification>,
    attachments: Vec<Attachment>,
    portfolios: Vec<Portfolio>,
    preferences: Vec<Preference>,
    sequences: HashMap<&'static str, i64>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    /// Strictly increasing timestamps, so insertion order is also time order
    fn now(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_timestamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_timestamp = Some(now);
        now
    }

    fn user_mut(&mut self, user_id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.user_id == user_id)
    }

    fn email_taken(&self, email: &str, except_user_id: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.user_id) != except_user_id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut state = self.state();
        if state.email_taken(&user.email, None) {
            return Err(DatabaseError::Conflict("Email already in use".to_string()));
        }
        if state.users.iter().any(|u| u.user_id == user.user_id) {
            return Err(DatabaseError::Conflict("User already exists".to_string()));
        }

        let now = state.now();
        let created = User {
            id: state.next_id("users"),
            user_id: user.user_id,
            full_name: user.full_name,
            gender: user.gender,
            email: user.email,
            phone: user.phone,
            location: user.location,
            birth_date: user.birth_date,
            pincode: user.pincode,
            applied_for: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.push(created.clone());
        Ok(created)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>, DatabaseError> {
        Ok(self.state().users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn update_user(&self, user_id: i64, changes: UserUpdate) -> Result<Option<User>, DatabaseError> {
        let mut state = self.state();
        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(user_id)) {
                return Err(DatabaseError::Conflict("Email already in use".to_string()));
            }
        }

        let now = state.now();
        let Some(user) = state.user_mut(user_id) else {
            return Ok(None);
        };

        let UserUpdate {
            full_name,
            gender,
            email,
            phone,
            location,
            birth_date,
            pincode,
        } = changes;
        if let Some(v) = full_name {
            user.full_name = v;
        }
        if let Some(v) = email {
            user.email = v;
        }
        if gender.is_some() {
            user.gender = gender;
        }
        if phone.is_some() {
            user.phone = phone;
        }
        if location.is_some() {
            user.location = location;
        }
        if birth_date.is_some() {
            user.birth_date = birth_date;
        }
        if pincode.is_some() {
            user.pincode = pincode;
        }
        user.updated_at = now;

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let before = state.users.len();
        state.users.retain(|u| u.user_id != user_id);
        Ok(state.users.len() < before)
    }

    async fn peer_info(&self, user_ids: &[i64]) -> Result<Vec<PeerInfo>, DatabaseError> {
        Ok(self
            .state()
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.user_id))
            .map(|u| PeerInfo {
                user_id: u.user_id,
                full_name: u.full_name.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn applications(&self, user_id: i64) -> Result<Option<Vec<AppliedJob>>, DatabaseError> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.user_id == user_id)
            .map(|u| u.applied_for.clone()))
    }

    async fn replace_applications(
        &self,
        user_id: i64,
        entries: Vec<AppliedJob>,
    ) -> Result<Option<Vec<AppliedJob>>, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        Ok(state.user_mut(user_id).map(|user| {
            user.applied_for = entries.clone();
            user.updated_at = now;
            entries
        }))
    }

    async fn set_application_status(
        &self,
        user_id: i64,
        job_id: &str,
        status: &str,
    ) -> Result<StatusChange, DatabaseError> {
        let mut state = self.state();
        let Some(user) = state.user_mut(user_id) else {
            return Ok(StatusChange::UserMissing);
        };

        Ok(match apply_status(&mut user.applied_for, job_id, status) {
            Some(entry) => StatusChange::Updated(entry),
            None => StatusChange::EntryMissing,
        })
    }

    async fn applicants(&self, job_id: &str) -> Result<Vec<Applicant>, DatabaseError> {
        let state = self.state();
        let mut users: Vec<&User> = state.users.iter().collect();
        users.sort_by_key(|u| u.id);

        Ok(users
            .into_iter()
            .filter_map(|u| {
                u.applied_for.iter().find(|e| e.matches(job_id)).map(|entry| Applicant {
                    id: u.id,
                    name: u.full_name.clone(),
                    phone: u.phone.clone(),
                    email: u.email.clone(),
                    applied_on: entry.applied_on.clone(),
                    status: entry.status.clone(),
                })
            })
            .collect())
    }
}

#[async_trait]
impl SkillStore for MemoryStore {
    async fn create_skills(&self, user_id: i64, skills: Vec<NewSkill>) -> Result<Vec<Skill>, DatabaseError> {
        let mut state = self.state();
        let mut created = Vec::with_capacity(skills.len());
        for skill in skills {
            let row = Skill {
                id: state.next_id("skills"),
                user_id,
                skill: skill.skill,
                level: skill.level,
                rating: skill.rating,
                created_at: state.now(),
            };
            state.skills.push(row.clone());
            created.push(row);
        }
        Ok(created)
    }

    async fn skills_for_user(&self, user_id: i64) -> Result<Vec<Skill>, DatabaseError> {
        Ok(self
            .state()
            .skills
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn all_skills(&self) -> Result<Vec<Skill>, DatabaseError> {
        Ok(self.state().skills.clone())
    }

    async fn update_skill(&self, id: i64, changes: SkillChanges) -> Result<Option<Skill>, DatabaseError> {
        let mut state = self.state();
        Ok(state.skills.iter_mut().find(|s| s.id == id).map(|skill| {
            if let Some(user_id) = changes.user_id {
                skill.user_id = user_id;
            }
            skill.skill = changes.skill;
            skill.level = changes.level;
            skill.rating = changes.rating;
            skill.clone()
        }))
    }

    async fn delete_skill(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let before = state.skills.len();
        state.skills.retain(|s| s.id != id);
        Ok(state.skills.len() < before)
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create_message(&self, message: NewMessage) -> Result<Message, DatabaseError> {
        let mut state = self.state();
        let created = Message {
            id: state.next_id("messages"),
            sender_id: message.sender_id,
            receiver_id: message.receiver_id,
            text: message.text,
            created_at: state.now(),
        };
        state.messages.push(created.clone());
        Ok(created)
    }

    async fn messages_involving(&self, user_id: i64) -> Result<Vec<Message>, DatabaseError> {
        let mut messages: Vec<Message> = self
            .state()
            .messages
            .iter()
            .filter(|m| m.sender_id == user_id || m.receiver_id == user_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(messages)
    }

    async fn messages_between(&self, user_id: i64, peer_id: i64) -> Result<Vec<Message>, DatabaseError> {
        let mut messages: Vec<Message> = self
            .state()
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == user_id && m.receiver_id == peer_id)
                    || (m.sender_id == peer_id && m.receiver_id == user_id)
            })
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn find_notification(&self, receiver_id: i64, message: &str) -> Result<Option<Notification>, DatabaseError> {
        Ok(self
            .state()
            .notifications
            .iter()
            .find(|n| n.receiver_id == receiver_id && n.message == message)
            .cloned())
    }

    async fn create_notification(&self, receiver_id: i64, message: &str) -> Result<Notification, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        let created = Notification {
            id: state.next_id("notifications"),
            receiver_id,
            message: message.to_string(),
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        state.notifications.push(created.clone());
        Ok(created)
    }

    async fn notifications_for(&self, receiver_id: i64) -> Result<Vec<Notification>, DatabaseError> {
        let mut rows: Vec<Notification> = self
            .state()
            .notifications
            .iter()
            .filter(|n| n.receiver_id == receiver_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn mark_notification_read(&self, id: i64, receiver_id: i64) -> Result<Option<Notification>, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.receiver_id == receiver_id)
            .map(|n| {
                n.is_read = true;
                n.updated_at = now;
                n.clone()
            }))
    }

    async fn mark_all_notifications_read(&self, receiver_id: i64) -> Result<u64, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        let mut count = 0;
        for n in state
            .notifications
            .iter_mut()
            .filter(|n| n.receiver_id == receiver_id && !n.is_read)
        {
            n.is_read = true;
            n.updated_at = now;
            count += 1;
        }
        Ok(count)
    }

    async fn delete_notification(&self, id: i64, receiver_id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let before = state.notifications.len();
        state
            .notifications
            .retain(|n| !(n.id == id && n.receiver_id == receiver_id));
        Ok(state.notifications.len() < before)
    }
}

/// Writes are staged locally and only reach the shared state on `commit`
pub struct MemoryProfileTransaction {
    state: Arc<Mutex<MemoryState>>,
    attachments: Vec<Attachment>,
    portfolio: Option<Portfolio>,
}

#[async_trait]
impl ProfileTransaction for MemoryProfileTransaction {
    async fn insert_attachment(&mut self, attachment: NewAttachment) -> Result<Attachment, DatabaseError> {
        let mut state = lock(&self.state);
        let created = Attachment {
            id: state.next_id("attachments"),
            user_id: attachment.user_id,
            file_name: attachment.file_name,
            file_path: attachment.file_path,
            mime_type: attachment.mime_type,
            file_size: attachment.file_size,
            created_at: state.now(),
        };
        drop(state);

        self.attachments.push(created.clone());
        Ok(created)
    }

    async fn upsert_portfolio(&mut self, user_id: i64, links: &PortfolioLinks) -> Result<Portfolio, DatabaseError> {
        let mut state = lock(&self.state);
        let now = state.now();

        let staged = self.portfolio.take().filter(|p| p.user_id == user_id);
        let existing = staged.or_else(|| state.portfolios.iter().find(|p| p.user_id == user_id).cloned());

        let portfolio = match existing {
            Some(mut portfolio) => {
                links.merge_into(&mut portfolio);
                portfolio.updated_at = now;
                portfolio
            }
            None => Portfolio {
                id: state.next_id("portfolios"),
                user_id,
                github_link: links.github_link.clone(),
                linked_in_link: links.linked_in_link.clone(),
                updated_at: now,
            },
        };
        drop(state);

        self.portfolio = Some(portfolio.clone());
        Ok(portfolio)
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryProfileTransaction {
            state,
            attachments,
            portfolio,
        } = *self;
        let mut state = lock(&state);

        state.attachments.extend(attachments);
        if let Some(portfolio) = portfolio {
            state.portfolios.retain(|p| p.user_id != portfolio.user_id);
            state.portfolios.push(portfolio);
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn begin_profile_update(&self) -> Result<Box<dyn ProfileTransaction>, DatabaseError> {
        Ok(Box::new(MemoryProfileTransaction {
            state: Arc::clone(&self.state),
            attachments: Vec::new(),
            portfolio: None,
        }))
    }

    async fn attachments_for(&self, user_id: i64) -> Result<Vec<Attachment>, DatabaseError> {
        let mut rows: Vec<Attachment> = self
            .state()
            .attachments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn find_attachment(&self, id: i64) -> Result<Option<Attachment>, DatabaseError> {
        Ok(self.state().attachments.iter().find(|a| a.id == id).cloned())
    }

    async fn portfolio_for(&self, user_id: i64) -> Result<Option<Portfolio>, DatabaseError> {
        Ok(self
            .state()
            .portfolios
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn update_portfolio(&self, id: i64, links: &PortfolioLinks) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        match state.portfolios.iter_mut().find(|p| p.id == id) {
            Some(portfolio) => {
                links.merge_into(portfolio);
                portfolio.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_attachment(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let before = state.attachments.len();
        state.attachments.retain(|a| a.id != id);
        Ok(state.attachments.len() < before)
    }

    async fn delete_portfolio(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let before = state.portfolios.len();
        state.portfolios.retain(|p| p.id != id);
        Ok(state.portfolios.len() < before)
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn create_preference(&self, preference: NewPreference) -> Result<Preference, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        let created = Preference {
            id: state.next_id("preferences"),
            user_id: preference.user_id,
            employment_type: preference.employment_type,
            location: preference.location,
            shift: preference.shift,
            workplace: preference.workplace,
            created_at: now,
            updated_at: now,
        };
        state.preferences.push(created.clone());
        Ok(created)
    }

    async fn preferences_for(&self, user_id: i64) -> Result<Vec<Preference>, DatabaseError> {
        Ok(self
            .state()
            .preferences
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_preference(&self, id: i64, changes: PreferenceUpdate) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        match state.preferences.iter_mut().find(|p| p.id == id) {
            Some(preference) => {
                changes.apply(preference);
                preference.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_preference_field(&self, id: i64, field: PreferenceField) -> Result<bool, DatabaseError> {
        let mut state = self.state();
        let now = state.now();
        match state.preferences.iter_mut().find(|p| p.id == id) {
            Some(preference) => {
                preference.clear(field);
                preference.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_user(user_id: i64, email: &str) -> NewUser {
        NewUser {
            user_id,
            full_name: format!("User {}", user_id),
            gender: None,
            email: email.to_string(),
            phone: None,
            location: None,
            birth_date: None,
            pincode: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user(1, "a@example.com")).await.unwrap();
        let err = store.create_user(new_user(2, "a@example.com")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn status_change_reports_what_was_missing() {
        let store = MemoryStore::new();
        assert_eq!(
            store.set_application_status(1, "9", "applied").await.unwrap(),
            StatusChange::UserMissing
        );

        store.create_user(new_user(1, "a@example.com")).await.unwrap();
        let entry = AppliedJob::from_value(json!({ "id": 9 })).unwrap();
        store.replace_applications(1, vec![entry]).await.unwrap();

        assert_eq!(
            store.set_application_status(1, "10", "applied").await.unwrap(),
            StatusChange::EntryMissing
        );
        assert!(matches!(
            store.set_application_status(1, "9", "hired").await.unwrap(),
            StatusChange::Updated(job) if job.status == Some(json!("hired"))
        ));
    }

    #[tokio::test]
    async fn rolled_back_profile_leaves_no_rows() {
        let store = MemoryStore::new();
        let mut tx = store.begin_profile_update().await.unwrap();
        tx.insert_attachment(NewAttachment {
            user_id: 5,
            file_name: "cv.pdf".into(),
            file_path: "x.pdf".into(),
            mime_type: "application/pdf".into(),
            file_size: 3,
        })
        .await
        .unwrap();
        tx.upsert_portfolio(
            5,
            &PortfolioLinks {
                github_link: Some("https://github.com/five".into()),
                linked_in_link: None,
            },
        )
        .await
        .unwrap();
        tx.rollback().await.unwrap();

        assert!(store.attachments_for(5).await.unwrap().is_empty());
        assert!(store.portfolio_for(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn committed_portfolio_upsert_keeps_unsupplied_links() {
        let store = MemoryStore::new();
        let links = PortfolioLinks {
            github_link: Some("https://github.com/five".into()),
            linked_in_link: Some("https://linkedin.com/in/five".into()),
        };
        let mut tx = store.begin_profile_update().await.unwrap();
        tx.upsert_portfolio(5, &links).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin_profile_update().await.unwrap();
        tx.upsert_portfolio(
            5,
            &PortfolioLinks {
                github_link: Some("https://github.com/renamed".into()),
                linked_in_link: None,
            },
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let portfolio = store.portfolio_for(5).await.unwrap().unwrap();
        assert_eq!(portfolio.github_link.as_deref(), Some("https://github.com/renamed"));
        assert_eq!(portfolio.linked_in_link, links.linked_in_link);
    }

    #[tokio::test]
    async fn messages_sorted_newest_first() {
        let store = MemoryStore::new();
        for text in ["one", "two", "three"] {
            store
                .create_message(NewMessage {
                    sender_id: 1,
                    receiver_id: 2,
                    text: text.into(),
                })
                .await
                .unwrap();
        }
        let newest_first: Vec<String> = store
            .messages_involving(2)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(newest_first, vec!["three", "two", "one"]);

        let history = store.messages_between(2, 1).await.unwrap();
        assert_eq!(history.first().map(|m| m.text.as_str()), Some("one"));
    }
}
