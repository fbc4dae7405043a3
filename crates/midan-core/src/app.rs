//! The application state and every user action.
//!
//! One [`AppState`] owns the catalogue, the team lists, the session user,
//! the persisted reaction and invite blobs, and the one-shot UI state (the
//! join form and a pending join-code prefill). Actions validate fully before
//! mutating and leave the state untouched on error.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::MidanError;
use crate::filter::EventSort;
use crate::invites::{GUEST_REF, INVITES_KEY, InviteState, SeenRefs};
use crate::membership::{CreateTeamParams, Roster};
use crate::model::event::THEME_COLORS;
use crate::model::{Address, Event, EventType, Memberships};
use crate::reactions::{REACTIONS_KEY, ReactionChange, ReactionState};
use crate::router::{self, DEFAULT_PATH, Location, Route};
use crate::seed::seed;
use crate::storage::{BlobStore, load_blob, save_blob};
use crate::view::{self, Page};
use crate::wallet::WalletConnector;

/// Tags kept from the comma-separated create-event input.
const MAX_EVENT_TAGS: usize = 2;

/// Alphabet of the random event-id suffix.
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 5;

/// How many teams an event admits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamCap {
    #[default]
    Open,
    /// Clamped to at least 1.
    Fixed(i64),
}

impl TeamCap {
    fn resolve(self) -> Option<u32> {
        match self {
            Self::Open => None,
            Self::Fixed(n) => Some(u32::try_from(n.max(1)).unwrap_or(u32::MAX)),
        }
    }
}

/// Form input of the create-event action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventParams {
    pub name: String,
    pub subtitle: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Comma-separated; blanks are dropped and the first two kept.
    #[serde(default)]
    pub tags: String,
    /// Defaults to now.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Defaults to now plus seven days.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub team_cap: TeamCap,
}

/// The open join-code form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinForm {
    pub event_id: String,
    pub team_id: u64,
    /// Current content of the code box.
    pub code: String,
}

/// Session-local UI state that is not part of the location.
#[derive(Debug, Clone, Default)]
struct UiState {
    join_form: Option<JoinForm>,
    prefill_code: Option<String>,
}

/// Everything one session knows.
pub struct AppState {
    events: Vec<Event>,
    roster: Roster,
    memberships: Memberships,
    wallet: Box<dyn WalletConnector>,
    reactions: ReactionState,
    invites: InviteState,
    seen_refs: SeenRefs,
    store: Box<dyn BlobStore>,
    ui: UiState,
    default_sort: Option<EventSort>,
}

impl AppState {
    /// Seed the catalogue relative to `now` and load the persisted blobs.
    #[must_use]
    pub fn new(
        now: DateTime<Utc>,
        store: Box<dyn BlobStore>,
        wallet: Box<dyn WalletConnector>,
    ) -> Self {
        let catalog = seed(now);
        let reactions = load_blob(store.as_ref(), REACTIONS_KEY);
        let invites = load_blob(store.as_ref(), INVITES_KEY);
        debug!(events = catalog.events.len(), "session started");

        Self {
            events: catalog.events,
            roster: Roster::new(catalog.teams),
            memberships: Memberships::new(),
            wallet,
            reactions,
            invites,
            seen_refs: SeenRefs::default(),
            store,
            ui: UiState::default(),
            default_sort: None,
        }
    }

    /// Sort used by the events list when the location names none.
    #[must_use]
    pub const fn with_default_sort(mut self, sort: Option<EventSort>) -> Self {
        self.default_sort = sort;
        self
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    #[must_use]
    pub fn event(&self, event_id: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.id == event_id)
    }

    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub const fn memberships(&self) -> &Memberships {
        &self.memberships
    }

    #[must_use]
    pub const fn reactions(&self) -> &ReactionState {
        &self.reactions
    }

    #[must_use]
    pub const fn invites(&self) -> &InviteState {
        &self.invites
    }

    #[must_use]
    pub fn user(&self) -> Option<&Address> {
        self.wallet.address()
    }

    #[must_use]
    pub const fn join_form(&self) -> Option<&JoinForm> {
        self.ui.join_form.as_ref()
    }

    #[must_use]
    pub const fn default_sort(&self) -> Option<EventSort> {
        self.default_sort
    }

    /// Key other users' opens are attributed to: the short address, or
    /// `guest` before connecting.
    #[must_use]
    pub fn referral_key(&self) -> String {
        self.user()
            .map_or_else(|| GUEST_REF.to_string(), Address::short)
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Connect the wallet. Connecting again is a no-op.
    pub fn connect(&mut self) -> Address {
        let was_connected = self.wallet.is_connected();
        let address = self.wallet.connect();
        if !was_connected {
            info!(address = %address.short(), "wallet connected");
        }
        address
    }

    /// Create an event and put it at the front of the catalogue.
    ///
    /// # Errors
    ///
    /// Returns [`MidanError::NotConnected`] without a wallet and
    /// [`MidanError::InvalidInput`] for a blank name or subtitle.
    pub fn create_event<R: Rng>(
        &mut self,
        params: &CreateEventParams,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<String, MidanError> {
        if self.user().is_none() {
            return Err(MidanError::NotConnected);
        }
        let name = params.name.trim();
        let subtitle = params.subtitle.trim();
        if name.is_empty() {
            return Err(MidanError::invalid("name", "event name is required"));
        }
        if subtitle.is_empty() {
            return Err(MidanError::invalid("subtitle", "event subtitle is required"));
        }

        let tags = params
            .tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .take(MAX_EVENT_TAGS)
            .map(str::to_string)
            .collect();

        let id = loop {
            let candidate = format!("{}-{}", params.event_type.as_str(), random_suffix(rng));
            if self.event(&candidate).is_none() {
                break candidate;
            }
        };
        let [from, to] = THEME_COLORS[rng.gen_range(0..THEME_COLORS.len())];

        let event = Event {
            id: id.clone(),
            name: name.to_string(),
            subtitle: subtitle.to_string(),
            start: params.start.unwrap_or(now),
            end: params.end.unwrap_or(now + Duration::days(7)),
            event_type: params.event_type,
            tags,
            color: [from.to_string(), to.to_string()],
            team_cap: params.team_cap.resolve(),
        };
        self.events.insert(0, event);
        self.roster.add_event(&id);

        info!(event_id = %id, "event created");
        Ok(id)
    }

    /// # Errors
    ///
    /// See [`Roster::create_team`].
    pub fn create_team(
        &mut self,
        event_id: &str,
        params: &CreateTeamParams,
        now: DateTime<Utc>,
    ) -> Result<u64, MidanError> {
        let user = self.wallet.address();
        self.roster
            .create_team(&mut self.memberships, user, event_id, params, now)
    }

    /// # Errors
    ///
    /// See [`Roster::join_public`].
    pub fn join_public(&mut self, event_id: &str, team_id: u64) -> Result<(), MidanError> {
        let user = self.wallet.address();
        self.roster
            .join_public(&mut self.memberships, user, event_id, team_id)
    }

    /// Join a private team directly; the code is compared as given.
    ///
    /// # Errors
    ///
    /// See [`Roster::join_private`].
    pub fn join_private(
        &mut self,
        event_id: &str,
        team_id: u64,
        code: &str,
    ) -> Result<(), MidanError> {
        let user = self.wallet.address();
        self.roster
            .join_private(&mut self.memberships, user, event_id, team_id, code)
    }

    /// Open the join-code form for a team, optionally prefilled.
    ///
    /// # Errors
    ///
    /// Returns [`MidanError::NotConnected`] without a wallet and
    /// [`MidanError::AlreadyMember`] when the user already has a team in the event.
    pub fn open_join_form(
        &mut self,
        event_id: &str,
        team_id: u64,
        prefill: Option<&str>,
    ) -> Result<(), MidanError> {
        if self.user().is_none() {
            return Err(MidanError::NotConnected);
        }
        if let Some(existing) = self.memberships.team_for(event_id) {
            return Err(MidanError::AlreadyMember {
                event_id: event_id.to_string(),
                team_id: existing,
            });
        }
        self.ui.join_form = Some(JoinForm {
            event_id: event_id.to_string(),
            team_id,
            code: prefill.unwrap_or_default().to_string(),
        });
        debug!(event_id, team_id, prefilled = prefill.is_some(), "join form opened");
        Ok(())
    }

    /// Submit the open join form with `code` (trimmed, as typed into the
    /// box). Success or a vanished team closes the form; any other failure
    /// keeps it open with the attempted code.
    ///
    /// # Errors
    ///
    /// Returns [`MidanError::InvalidInput`] when no form is open, otherwise
    /// whatever [`Roster::join_private`] reports.
    pub fn submit_join_form(&mut self, code: &str) -> Result<(), MidanError> {
        let Some(form) = self.ui.join_form.clone() else {
            return Err(MidanError::invalid("join_form", "no join form is open"));
        };
        let code = code.trim();
        let result = self.join_private(&form.event_id, form.team_id, code);

        match &result {
            Ok(()) | Err(MidanError::TeamNotFound { .. } | MidanError::EventNotFound(_)) => {
                self.ui.join_form = None;
            }
            Err(err) => {
                debug!(error = %err, "join form kept open");
                self.ui.join_form = Some(JoinForm {
                    code: code.to_string(),
                    ..form
                });
            }
        }
        result
    }

    /// Dismiss the join form without submitting.
    pub fn close_join_form(&mut self) {
        self.ui.join_form = None;
    }

    /// Toggle the user's reaction on an event and persist the counters.
    ///
    /// # Errors
    ///
    /// Returns [`MidanError::NotConnected`], [`MidanError::EventNotFound`] or
    /// [`MidanError::InvalidInput`] for a blank emoji.
    pub fn react(&mut self, event_id: &str, emoji: &str) -> Result<ReactionChange, MidanError> {
        if self.user().is_none() {
            return Err(MidanError::NotConnected);
        }
        if self.event(event_id).is_none() {
            return Err(MidanError::EventNotFound(event_id.to_string()));
        }
        let emoji = emoji.trim();
        if emoji.is_empty() {
            return Err(MidanError::invalid("emoji", "must not be empty"));
        }

        let change = self.reactions.set_reaction(event_id, emoji);
        self.persist(REACTIONS_KEY);
        info!(event_id, emoji, ?change, "reaction toggled");
        Ok(change)
    }

    /// Route a location, run its side effects and build the page.
    ///
    /// Side effects: an overview opened through someone else's referral link
    /// records one invite open per session, and a team page consumes a
    /// pending join-code prefill.
    pub fn navigate(&mut self, location: &Location, now: DateTime<Utc>) -> Page {
        let (location, route, redirected) = match router::route(location) {
            Route::Redirect { to } => {
                debug!(from = %location.path, to, "redirecting");
                let target = Location::parse(to);
                let route = router::route(&target);
                (target, route, true)
            }
            route => (location.clone(), route, false),
        };

        match &route {
            Route::CompetitionOverview {
                event_id,
                referrer: Some(referrer),
                ..
            } if self.event(event_id).is_some() => self.attribute_invite(event_id, referrer),
            Route::TeamDetail {
                event_id,
                team_id,
                prefill_code,
            } => {
                self.ui.prefill_code.clone_from(prefill_code);
                self.consume_prefill(event_id, *team_id);
            }
            _ => {}
        }

        view::page(self, &location, &route, redirected, now)
    }

    /// Convenience: parse and navigate in one step.
    pub fn open(&mut self, raw_location: &str, now: DateTime<Utc>) -> Page {
        let location = Location::parse(raw_location);
        self.navigate(&location, now)
    }

    /// Navigate to the landing page.
    pub fn home(&mut self, now: DateTime<Utc>) -> Page {
        self.open(DEFAULT_PATH, now)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn attribute_invite(&mut self, event_id: &str, referrer: &str) {
        if referrer == self.referral_key() {
            return;
        }
        if !self.seen_refs.first_sighting(event_id, referrer) {
            return;
        }
        self.invites.record_open(event_id, referrer);
        self.persist(INVITES_KEY);
        info!(event_id, referrer, "invite open recorded");
    }

    fn consume_prefill(&mut self, event_id: &str, team_id: Option<u64>) {
        let Some(code) = self.ui.prefill_code.take() else {
            return;
        };
        let Some(team) = team_id.and_then(|id| self.roster.team(event_id, id)) else {
            return;
        };
        let mine = self.memberships.team_for(event_id);
        if !team.is_private || mine.is_some() {
            return;
        }
        let team_id = team.team_id;
        if let Err(err) = self.open_join_form(event_id, team_id, Some(&code)) {
            debug!(error = %err, "prefill not applied");
        }
    }

    fn persist(&mut self, key: &str) {
        let result = match key {
            REACTIONS_KEY => save_blob(self.store.as_mut(), key, &self.reactions),
            _ => save_blob(self.store.as_mut(), key, &self.invites),
        };
        if let Err(err) = result {
            warn!(key, code = %err.code(), error = %err, "keeping in-memory state after failed save");
        }
    }
}

fn random_suffix<R: Rng>(rng: &mut R) -> String {
    (0..ID_SUFFIX_LEN)
        .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
        .collect()
}
