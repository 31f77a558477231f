use crate::models::Participant;
use hashbrown::{HashMap, HashSet};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Outbound channel feeding one connection's socket writer task.
/// Events are serialized once and pushed as text frames.
pub type EventSender = UnboundedSender<String>;

#[derive(Clone)]
pub struct ConnectionHandle {
    pub connection_id: Uuid,
    pub sender: EventSender,
}

struct RegistryEntry {
    handle: ConnectionHandle,
    room: Option<String>,
}

/// Process-wide map from authenticated participant to live transport handle,
/// plus room membership. Owned by `AppState` and injected through `Context`,
/// so tests can run isolated instances side by side.
///
/// One handle per participant: a reconnect replaces the previous registration
/// (last connection wins). Multiple simultaneous sessions per identity are a
/// known limitation of this design, not supported.
#[derive(Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<Participant, RegistryEntry>,
    rooms: HashMap<String, HashSet<Participant>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly authenticated connection, replacing any prior
    /// handle for the same participant and dropping its room membership.
    pub async fn register(&self, participant: Participant, handle: ConnectionHandle) {
        let mut inner = self.inner.write().await;
        let previous = inner.connections.insert(
            participant,
            RegistryEntry { handle, room: None },
        );
        if let Some(RegistryEntry { room: Some(room), .. }) = previous {
            remove_member(&mut inner.rooms, &room, &participant);
        }
    }

    /// Removes the participant's registration, but only if it still belongs
    /// to the given connection. A stale disconnect racing a rapid reconnect
    /// must not evict the newer registration, hence compare-and-remove on the
    /// connection id rather than the bare participant key.
    pub async fn unregister(&self, participant: Participant, connection_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let is_current = inner
            .connections
            .get(&participant)
            .is_some_and(|entry| entry.handle.connection_id == connection_id);
        if !is_current {
            return false;
        }
        if let Some(RegistryEntry { room: Some(room), .. }) =
            inner.connections.remove(&participant)
        {
            remove_member(&mut inner.rooms, &room, &participant);
        }
        true
    }

    /// Moves the participant's connection into a room. A connection occupies
    /// at most one room: joining implicitly leaves the previous one.
    /// Returns false when the participant has no live connection.
    pub async fn join_room(&self, participant: Participant, room_id: &str) -> bool {
        let mut inner = self.inner.write().await;
        let RegistryInner { connections, rooms } = &mut *inner;
        let Some(entry) = connections.get_mut(&participant) else {
            return false;
        };
        if let Some(previous) = entry.room.take() {
            remove_member(rooms, &previous, &participant);
        }
        entry.room = Some(room_id.to_string());
        rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(participant);
        true
    }

    /// Clears room membership if the connection currently occupies the room.
    /// A no-op otherwise.
    pub async fn leave_room(&self, participant: Participant, room_id: &str) {
        let mut inner = self.inner.write().await;
        let RegistryInner { connections, rooms } = &mut *inner;
        if let Some(entry) = connections.get_mut(&participant) {
            if entry.room.as_deref() == Some(room_id) {
                entry.room = None;
            }
        }
        remove_member(rooms, room_id, &participant);
    }

    pub async fn sender_for(&self, participant: Participant) -> Option<EventSender> {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&participant)
            .map(|entry| entry.handle.sender.clone())
    }

    /// Handles of everyone currently in the room, optionally excluding one
    /// participant (e.g. the author of a read receipt).
    pub async fn room_senders(
        &self,
        room_id: &str,
        except: Option<Participant>,
    ) -> Vec<EventSender> {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room_id) else {
            return Vec::new();
        };
        members
            .iter()
            .filter(|member| except != Some(**member))
            .filter_map(|member| inner.connections.get(member))
            .map(|entry| entry.handle.sender.clone())
            .collect()
    }

    pub async fn current_room(&self, participant: Participant) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&participant)
            .and_then(|entry| entry.room.clone())
    }

    pub async fn online_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }
}

fn remove_member(
    rooms: &mut HashMap<String, HashSet<Participant>>,
    room_id: &str,
    participant: &Participant,
) {
    if let Some(members) = rooms.get_mut(room_id) {
        members.remove(participant);
        if members.is_empty() {
            rooms.remove(room_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ParticipantKind;
    use tokio::sync::mpsc;

    fn handle() -> (ConnectionHandle, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            ConnectionHandle {
                connection_id: Uuid::new_v4(),
                sender: tx,
            },
            rx,
        )
    }

    fn buyer(id: i64) -> Participant {
        Participant::new(ParticipantKind::User, id)
    }

    fn merchant(id: i64) -> Participant {
        Participant::new(ParticipantKind::Merchant, id)
    }

    #[tokio::test]
    async fn register_replaces_previous_connection() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = handle();
        let (second, _rx2) = handle();

        registry.register(buyer(1), first).await;
        registry.join_room(buyer(1), "room_1_2").await;
        registry.register(buyer(1), second.clone()).await;

        assert_eq!(registry.online_count().await, 1);
        // the replaced connection's room membership does not leak over
        assert_eq!(registry.current_room(buyer(1)).await, None);
        assert!(registry.room_senders("room_1_2", None).await.is_empty());
    }

    #[tokio::test]
    async fn stale_unregister_does_not_evict_newer_registration() {
        let registry = ConnectionRegistry::new();
        let (stale, _rx1) = handle();
        let (current, _rx2) = handle();
        let stale_id = stale.connection_id;

        registry.register(merchant(7), stale).await;
        registry.register(merchant(7), current.clone()).await;

        assert!(!registry.unregister(merchant(7), stale_id).await);
        assert_eq!(registry.online_count().await, 1);
        assert!(registry.sender_for(merchant(7)).await.is_some());

        assert!(registry.unregister(merchant(7), current.connection_id).await);
        assert_eq!(registry.online_count().await, 0);
    }

    #[tokio::test]
    async fn join_room_enforces_single_membership() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = handle();
        registry.register(buyer(3), conn).await;

        assert!(registry.join_room(buyer(3), "room_3_1").await);
        assert!(registry.join_room(buyer(3), "room_3_2").await);

        assert_eq!(
            registry.current_room(buyer(3)).await.as_deref(),
            Some("room_3_2")
        );
        assert!(registry.room_senders("room_3_1", None).await.is_empty());
        assert_eq!(registry.room_senders("room_3_2", None).await.len(), 1);
    }

    #[tokio::test]
    async fn join_room_without_connection_is_rejected() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.join_room(buyer(9), "room_9_1").await);
        assert!(registry.room_senders("room_9_1", None).await.is_empty());
    }

    #[tokio::test]
    async fn leave_room_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = handle();
        registry.register(buyer(4), conn).await;
        registry.join_room(buyer(4), "room_4_1").await;

        registry.leave_room(buyer(4), "room_4_1").await;
        registry.leave_room(buyer(4), "room_4_1").await;

        assert_eq!(registry.current_room(buyer(4)).await, None);
        assert!(registry.room_senders("room_4_1", None).await.is_empty());
    }

    #[tokio::test]
    async fn room_senders_can_exclude_one_participant() {
        let registry = ConnectionRegistry::new();
        let (user_conn, _rx1) = handle();
        let (merchant_conn, _rx2) = handle();
        registry.register(buyer(5), user_conn).await;
        registry.register(merchant(6), merchant_conn).await;
        registry.join_room(buyer(5), "room_5_6").await;
        registry.join_room(merchant(6), "room_5_6").await;

        assert_eq!(registry.room_senders("room_5_6", None).await.len(), 2);
        assert_eq!(
            registry
                .room_senders("room_5_6", Some(buyer(5)))
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn disconnect_clears_room_membership() {
        let registry = ConnectionRegistry::new();
        let (conn, _rx) = handle();
        let connection_id = conn.connection_id;
        registry.register(merchant(8), conn).await;
        registry.join_room(merchant(8), "room_2_8").await;

        assert!(registry.unregister(merchant(8), connection_id).await);
        assert!(registry.room_senders("room_2_8", None).await.is_empty());
        assert!(registry.sender_for(merchant(8)).await.is_none());
    }
}
