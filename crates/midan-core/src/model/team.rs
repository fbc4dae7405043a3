use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total length a mock address seed is padded to (excluding the `0x` prefix).
const MOCK_ADDRESS_WIDTH: usize = 38;

/// A wallet address as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Build a deterministic mock address: `0x{seed}` right-padded with `0`s.
    #[must_use]
    pub fn mock(seed: &str) -> Self {
        let pad = MOCK_ADDRESS_WIDTH.saturating_sub(seed.chars().count());
        Self(format!("0x{seed}{}", "0".repeat(pad)))
    }

    /// Wrap an address string as-is.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: first 6 characters, an ellipsis, the last 4.
    #[must_use]
    pub fn short(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 10 {
            return self.0.clone();
        }
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }

    /// Two-letter avatar initials taken after the `0x` prefix.
    #[must_use]
    pub fn initials(&self) -> String {
        self.0.chars().skip(2).take(2).collect::<String>().to_uppercase()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a team accepts anyone or only holders of its join code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Public,
    Private,
}

impl Privacy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named group of addresses bound to one event.
///
/// Invariants held by every constructor and mutator in this crate:
/// `join_code.is_some() == is_private`, `members.len() <= max_members`, and
/// the captain is the first member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub team_id: u64,
    pub name: String,
    pub description: String,
    pub is_private: bool,
    pub max_members: u32,
    pub members: Vec<Address>,
    pub captain: Address,
    pub created_at: DateTime<Utc>,
    pub join_code: Option<String>,
}

impl Team {
    /// A public team whose only member is its captain.
    #[must_use]
    pub fn public(
        team_id: u64,
        name: impl Into<String>,
        max_members: u32,
        captain: Address,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            team_id,
            name: name.into(),
            description: String::new(),
            is_private: false,
            max_members,
            members: vec![captain.clone()],
            captain,
            created_at,
            join_code: None,
        }
    }

    /// A private team gated by `join_code`.
    #[must_use]
    pub fn private(
        team_id: u64,
        name: impl Into<String>,
        max_members: u32,
        captain: Address,
        created_at: DateTime<Utc>,
        join_code: impl Into<String>,
    ) -> Self {
        Self {
            is_private: true,
            join_code: Some(join_code.into()),
            ..Self::public(team_id, name, max_members, captain, created_at)
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Seed additional members after the captain, skipping duplicates and
    /// stopping at capacity.
    #[must_use]
    pub fn with_members(mut self, members: impl IntoIterator<Item = Address>) -> Self {
        for member in members {
            let _ = self.add_member(member);
        }
        self
    }

    #[must_use]
    pub const fn privacy(&self) -> Privacy {
        if self.is_private {
            Privacy::Private
        } else {
            Privacy::Public
        }
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_members as usize
    }

    #[must_use]
    pub fn has_member(&self, address: &Address) -> bool {
        self.members.contains(address)
    }

    /// Append a member. Returns `false` (and changes nothing) when the
    /// address is already a member or the team is full.
    pub(crate) fn add_member(&mut self, address: Address) -> bool {
        if self.is_full() || self.has_member(&address) {
            return false;
        }
        self.members.push(address);
        true
    }
}
