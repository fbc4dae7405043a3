//! Plain data records: events, teams, addresses and memberships.

pub mod event;
pub mod membership;
pub mod team;

pub use event::{Event, EventStatus, EventType, ParseEnumError};
pub use membership::Memberships;
pub use team::{Address, Privacy, Team};
