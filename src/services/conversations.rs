//! Direct messaging: the per-peer conversation list, thread history and send.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use super::{ServiceError, ServiceResult};
use crate::database::models::{Message, NewMessage, PeerInfo};
use crate::database::{MessageStore, UserStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub peer_id: i64,
    pub peer_info: Option<PeerInfo>,
    pub last_message: String,
    pub last_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Me,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadMessage {
    pub id: i64,
    pub sender: Side,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub sender_info: Option<PeerInfo>,
}

/// Keeps the first message seen per peer. Callers pass messages newest
/// first, so that is the latest one; ties keep the incoming order.
pub fn latest_per_peer(user_id: i64, messages: Vec<Message>) -> Vec<(i64, Message)> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter_map(|message| {
            let peer = message.peer_of(user_id);
            seen.insert(peer).then_some((peer, message))
        })
        .collect()
}

async fn peer_lookup<S>(store: &S, user_ids: &[i64]) -> ServiceResult<HashMap<i64, PeerInfo>>
where
    S: UserStore + ?Sized,
{
    Ok(store
        .peer_info(user_ids)
        .await?
        .into_iter()
        .map(|peer| (peer.user_id, peer))
        .collect())
}

pub async fn conversations<S>(store: &S, user_id: i64) -> ServiceResult<Vec<Conversation>>
where
    S: MessageStore + UserStore + ?Sized,
{
    let latest = latest_per_peer(user_id, store.messages_involving(user_id).await?);
    let peer_ids: Vec<i64> = latest.iter().map(|(peer, _)| *peer).collect();
    let mut peers = peer_lookup(store, &peer_ids).await?;

    Ok(latest
        .into_iter()
        .map(|(peer_id, message)| Conversation {
            peer_id,
            peer_info: peers.remove(&peer_id),
            last_message: message.text,
            last_timestamp: message.created_at,
        })
        .collect())
}

pub async fn history<S>(store: &S, user_id: i64, peer_id: i64) -> ServiceResult<Vec<ThreadMessage>>
where
    S: MessageStore + UserStore + ?Sized,
{
    let messages = store.messages_between(user_id, peer_id).await?;
    let peers = peer_lookup(store, &[user_id, peer_id]).await?;

    Ok(messages
        .into_iter()
        .map(|message| ThreadMessage {
            id: message.id,
            sender: if message.sender_id == user_id { Side::Me } else { Side::Other },
            sender_info: peers.get(&message.sender_id).cloned(),
            text: message.text,
            timestamp: message.created_at,
        })
        .collect())
}

pub async fn send<S>(store: &S, user_id: i64, peer_id: i64, text: Option<&str>) -> ServiceResult<ThreadMessage>
where
    S: MessageStore + UserStore + ?Sized,
{
    let text = text
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServiceError::invalid("text", "Message text cannot be empty."))?;

    let message = store
        .create_message(NewMessage {
            sender_id: user_id,
            receiver_id: peer_id,
            text: text.to_string(),
        })
        .await?;
    let mut sender = peer_lookup(store, &[user_id]).await?;

    Ok(ThreadMessage {
        id: message.id,
        sender: Side::Me,
        text: message.text,
        timestamp: message.created_at,
        sender_info: sender.remove(&user_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use chrono::TimeZone;

    fn message(id: i64, sender_id: i64, receiver_id: i64, t: i64) -> Message {
        Message {
            id,
            sender_id,
            receiver_id,
            text: format!("message {}", id),
            created_at: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    #[test]
    fn one_entry_per_peer_with_latest_message() {
        // newest first, as the store returns them
        let messages = vec![message(2, 7, 9, 2), message(1, 9, 7, 1)];
        let latest = latest_per_peer(7, messages);
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].0, 9);
        assert_eq!(latest[0].1.id, 2);
    }

    #[test]
    fn peers_keep_first_seen_order() {
        let messages = vec![
            message(5, 3, 7, 50),
            message(4, 7, 8, 40),
            message(3, 7, 3, 30),
            message(2, 8, 7, 30),
        ];
        let peers: Vec<i64> = latest_per_peer(7, messages).into_iter().map(|(p, _)| p).collect();
        assert_eq!(peers, vec![3, 8]);
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let store = MemoryStore::new();
        for text in [None, Some(""), Some("  \n ")] {
            assert!(matches!(
                send(&store, 1, 2, text).await,
                Err(ServiceError::Validation { field: Some("text"), .. })
            ));
        }
        assert!(conversations(&store, 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_marks_own_messages() {
        let store = MemoryStore::new();
        send(&store, 1, 2, Some(" hi ")).await.unwrap();
        send(&store, 2, 1, Some("hello")).await.unwrap();

        let thread = history(&store, 1, 2).await.unwrap();
        let sides: Vec<Side> = thread.iter().map(|m| m.sender).collect();
        assert_eq!(sides, vec![Side::Me, Side::Other]);
        assert_eq!(thread[0].text, "hi");
    }
}
