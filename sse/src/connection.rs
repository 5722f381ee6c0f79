use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;

/// Name of the stream profile a connection was opened with.
pub type ProfileName = String;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub profile: ProfileName,
    pub opened_at: DateTime<Utc>,
}

/// Registry of open streams, kept for observability only.
///
/// Sessions never read from it; the manager registers a connection when its
/// stream opens and removes it once the session has terminated.
pub struct ConnectionRegistry {
    /// Primary storage: lookup by connection_id for registration/cleanup - O(1)
    connections: DashMap<ConnectionId, ConnectionInfo>,

    /// Secondary index: open connections per stream profile - O(1)
    profile_index: DashMap<ProfileName, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            profile_index: DashMap::new(),
        }
    }

    /// Register a new connection - O(1)
    pub fn register(&self, profile: ProfileName) -> ConnectionId {
        let connection_id = ConnectionId::new();

        self.connections.insert(
            connection_id.clone(),
            ConnectionInfo {
                profile: profile.clone(),
                opened_at: Utc::now(),
            },
        );

        self.profile_index
            .entry(profile)
            .or_default()
            .insert(connection_id.clone());

        connection_id
    }

    /// Unregister a connection - O(1). Unknown ids are ignored.
    pub fn unregister(&self, connection_id: &ConnectionId) -> Option<ConnectionInfo> {
        let (_, info) = self.connections.remove(connection_id)?;

        if let Some(mut entry) = self.profile_index.get_mut(&info.profile) {
            entry.remove(connection_id);

            if entry.is_empty() {
                drop(entry); // Release lock before removal
                self.profile_index.remove(&info.profile);
            }
        }

        Some(info)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn count_for(&self, profile: &str) -> usize {
        self.profile_index
            .get(profile)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }

    /// Open connection counts keyed by profile name.
    pub fn counts_by_profile(&self) -> Vec<(ProfileName, usize)> {
        let mut counts: Vec<_> = self
            .profile_index
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect();
        counts.sort();
        counts
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
