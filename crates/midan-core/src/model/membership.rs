use serde::{Deserialize, Serialize};

/// One event-to-team record owned by the session user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipEntry {
    pub event_id: String,
    pub team_id: u64,
}

/// Which team (if any) the session user belongs to, per event.
///
/// Entries keep join order and there is at most one entry per event. There
/// is no removal: membership is monotonic for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Memberships {
    entries: Vec<MembershipEntry>,
}

impl Memberships {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The user's team for `event_id`.
    #[must_use]
    pub fn team_for(&self, event_id: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.event_id == event_id)
            .map(|entry| entry.team_id)
    }

    /// Record membership; a second record for the same event is refused.
    pub(crate) fn record(&mut self, event_id: &str, team_id: u64) -> bool {
        if self.team_for(event_id).is_some() {
            return false;
        }
        self.entries.push(MembershipEntry {
            event_id: event_id.to_string(),
            team_id,
        });
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &MembershipEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
