//! Team chat surface.
//!
//! The chat runs in isolation and learns everything it needs from its launch
//! parameters (`team`, `member`, `embed`). Messages live behind
//! [`MessageStore`]; only members may post.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::MidanError;
use crate::model::Address;
use crate::router::{QueryParams, encode_component};

/// Channel every team chat starts with.
pub const GENERAL_CHANNEL: &str = "general";

/// Parameters the chat surface is launched with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatLaunch {
    pub team_id: u64,
    pub member: bool,
    pub embed: bool,
}

impl ChatLaunch {
    /// Launch parameters for a member viewing the team page.
    #[must_use]
    pub const fn embedded_member(team_id: u64) -> Self {
        Self {
            team_id,
            member: true,
            embed: true,
        }
    }

    #[must_use]
    pub fn to_query_string(&self) -> String {
        let bit = |on: bool| if on { "1" } else { "0" };
        format!(
            "team={}&member={}&embed={}",
            encode_component(&self.team_id.to_string()),
            bit(self.member),
            bit(self.embed)
        )
    }

    /// Read launch parameters; `None` without a numeric `team`.
    #[must_use]
    pub fn from_query(query: &QueryParams) -> Option<Self> {
        let team_id = query.non_empty("team")?.parse().ok()?;
        Some(Self {
            team_id,
            member: query.flag("member"),
            embed: query.flag("embed"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub from: Address,
    pub ts: DateTime<Utc>,
    pub text: String,
}

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    Channel(String),
    Direct(Address),
}

/// Storage for channel and direct messages.
pub trait MessageStore {
    fn messages(&self, conversation: &Conversation) -> &[ChatMessage];

    /// Peers with an open direct conversation.
    fn direct_peers(&self) -> Vec<&Address>;

    fn append(&mut self, conversation: &Conversation, message: ChatMessage);
}

/// In-process store seeded with a short welcome thread.
#[derive(Debug, Clone, Default)]
pub struct MemoryMessageStore {
    channels: BTreeMap<String, Vec<ChatMessage>>,
    direct: BTreeMap<Address, Vec<ChatMessage>>,
}

impl MemoryMessageStore {
    #[must_use]
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let welcome = vec![
            ChatMessage {
                from: Address::mock("ALPHA"),
                ts: now - Duration::seconds(100),
                text: "Welcome to the team!".to_string(),
            },
            ChatMessage {
                from: Address::mock("BETA"),
                ts: now - Duration::seconds(80),
                text: "Hey all, let's sync.".to_string(),
            },
        ];
        Self {
            channels: BTreeMap::from([(GENERAL_CHANNEL.to_string(), welcome)]),
            direct: BTreeMap::new(),
        }
    }
}

impl MessageStore for MemoryMessageStore {
    fn messages(&self, conversation: &Conversation) -> &[ChatMessage] {
        match conversation {
            Conversation::Channel(name) => self.channels.get(name),
            Conversation::Direct(peer) => self.direct.get(peer),
        }
        .map_or(&[], Vec::as_slice)
    }

    fn direct_peers(&self) -> Vec<&Address> {
        self.direct.keys().collect()
    }

    fn append(&mut self, conversation: &Conversation, message: ChatMessage) {
        match conversation {
            Conversation::Channel(name) => self.channels.entry(name.clone()).or_default(),
            Conversation::Direct(peer) => self.direct.entry(peer.clone()).or_default(),
        }
        .push(message);
    }
}

/// One chat surface instance.
#[derive(Debug)]
pub struct ChatSession<S: MessageStore> {
    launch: ChatLaunch,
    user: Option<Address>,
    store: S,
}

impl<S: MessageStore> ChatSession<S> {
    #[must_use]
    pub const fn new(launch: ChatLaunch, user: Option<Address>, store: S) -> Self {
        Self {
            launch,
            user,
            store,
        }
    }

    #[must_use]
    pub const fn launch(&self) -> &ChatLaunch {
        &self.launch
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Open a direct conversation, greeting from the peer the first time.
    pub fn open_direct(&mut self, peer: &Address, now: DateTime<Utc>) -> Conversation {
        let conversation = Conversation::Direct(peer.clone());
        if self.store.messages(&conversation).is_empty() {
            self.store.append(
                &conversation,
                ChatMessage {
                    from: peer.clone(),
                    ts: now,
                    text: format!("Hi, this is {}. Let's chat!", peer.short()),
                },
            );
        }
        conversation
    }

    /// Post `text` (trimmed). Blank text is ignored and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`MidanError::NotTeamMember`] when launched for a non-member.
    pub fn post(
        &mut self,
        conversation: &Conversation,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, MidanError> {
        if !self.launch.member {
            return Err(MidanError::NotTeamMember {
                team_id: self.launch.team_id,
            });
        }
        let text = text.trim();
        if text.is_empty() {
            return Ok(false);
        }
        let from = self.user.clone().unwrap_or_else(|| Address::new("0xYOU"));
        self.store.append(
            conversation,
            ChatMessage {
                from,
                ts: now,
                text: text.to_string(),
            },
        );
        debug!(team_id = self.launch.team_id, ?conversation, "chat message posted");
        Ok(true)
    }
}
