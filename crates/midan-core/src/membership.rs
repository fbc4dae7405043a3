//! The membership state machine: create a team, join a public team, join a
//! private team with its code.
//!
//! Per (user, event) a user moves from no team to exactly one team and never
//! back. Every operation validates all of its guards before touching state,
//! so a failed call leaves the roster and the memberships untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use tracing::info;

use crate::error::MidanError;
use crate::model::{Address, Memberships, Privacy, Team};

/// First id handed out to user-created teams; seeded teams sit below it.
pub const FIRST_TEAM_ID: u64 = 101;

/// Accepted join-code lengths, in characters.
pub const JOIN_CODE_LEN: RangeInclusive<usize> = 8..=12;

/// Accepted member caps for new teams.
pub const MEMBER_CAP: RangeInclusive<u32> = 3..=50;

/// Minimum description length, in characters, after trimming.
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Form input of the create-team action. Text fields are trimmed before
/// validation and stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTeamParams {
    pub name: String,
    pub description: String,
    pub privacy: Privacy,
    /// Only read for private teams.
    #[serde(default)]
    pub join_code: String,
    pub max_members: u32,
}

impl CreateTeamParams {
    fn validate(&self) -> Result<ValidTeam, MidanError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MidanError::invalid("name", "team name must not be empty"));
        }

        let description = self.description.trim();
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(MidanError::invalid(
                "description",
                format!("must be at least {MIN_DESCRIPTION_LEN} characters"),
            ));
        }

        let join_code = match self.privacy {
            Privacy::Public => None,
            Privacy::Private => {
                let code = self.join_code.trim();
                check_code_len(code)?;
                Some(code.to_string())
            }
        };

        if !MEMBER_CAP.contains(&self.max_members) {
            return Err(MidanError::invalid(
                "max_members",
                format!(
                    "must be between {} and {}",
                    MEMBER_CAP.start(),
                    MEMBER_CAP.end()
                ),
            ));
        }

        Ok(ValidTeam {
            name: name.to_string(),
            description: description.to_string(),
            join_code,
        })
    }
}

struct ValidTeam {
    name: String,
    description: String,
    join_code: Option<String>,
}

fn check_code_len(code: &str) -> Result<(), MidanError> {
    if JOIN_CODE_LEN.contains(&code.chars().count()) {
        Ok(())
    } else {
        Err(MidanError::invalid(
            "join_code",
            format!(
                "must be {}-{} characters",
                JOIN_CODE_LEN.start(),
                JOIN_CODE_LEN.end()
            ),
        ))
    }
}

/// Every event's team list plus the team-id counter.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    teams: BTreeMap<String, Vec<Team>>,
    next_team_id: u64,
}

impl Roster {
    #[must_use]
    pub fn new(teams: BTreeMap<String, Vec<Team>>) -> Self {
        Self {
            teams,
            next_team_id: FIRST_TEAM_ID,
        }
    }

    /// Register an event with an empty team list. An existing list is kept.
    pub fn add_event(&mut self, event_id: &str) {
        self.teams.entry(event_id.to_string()).or_default();
    }

    #[must_use]
    pub fn has_event(&self, event_id: &str) -> bool {
        self.teams.contains_key(event_id)
    }

    /// Teams of an event, newest creations first. Unknown events have none.
    #[must_use]
    pub fn teams(&self, event_id: &str) -> &[Team] {
        self.teams.get(event_id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn team(&self, event_id: &str, team_id: u64) -> Option<&Team> {
        self.teams(event_id).iter().find(|t| t.team_id == team_id)
    }

    /// Members across all teams of an event.
    #[must_use]
    pub fn total_members(&self, event_id: &str) -> usize {
        self.teams(event_id).iter().map(Team::member_count).sum()
    }

    #[must_use]
    pub const fn next_team_id(&self) -> u64 {
        self.next_team_id
    }

    fn guard(
        &self,
        memberships: &Memberships,
        user: Option<&Address>,
        event_id: &str,
    ) -> Result<Address, MidanError> {
        let user = user.ok_or(MidanError::NotConnected)?;
        if !self.has_event(event_id) {
            return Err(MidanError::EventNotFound(event_id.to_string()));
        }
        if let Some(team_id) = memberships.team_for(event_id) {
            return Err(MidanError::AlreadyMember {
                event_id: event_id.to_string(),
                team_id,
            });
        }
        Ok(user.clone())
    }

    fn team_mut(&mut self, event_id: &str, team_id: u64) -> Result<&mut Team, MidanError> {
        self.teams
            .get_mut(event_id)
            .and_then(|teams| teams.iter_mut().find(|t| t.team_id == team_id))
            .ok_or_else(|| MidanError::TeamNotFound {
                event_id: event_id.to_string(),
                team_id,
            })
    }

    /// Create a team captained by `user` and make them its first member.
    ///
    /// The new team is prepended to the event's list and gets the next id
    /// from the roster's counter.
    ///
    /// # Errors
    ///
    /// Fails when the user is not connected, the event is unknown, the user
    /// already has a team in the event, or the params do not validate.
    pub fn create_team(
        &mut self,
        memberships: &mut Memberships,
        user: Option<&Address>,
        event_id: &str,
        params: &CreateTeamParams,
        now: DateTime<Utc>,
    ) -> Result<u64, MidanError> {
        let captain = self.guard(memberships, user, event_id)?;
        let valid = params.validate()?;

        let team_id = self.next_team_id;
        self.next_team_id += 1;

        let team = match valid.join_code {
            Some(code) => Team::private(team_id, valid.name, params.max_members, captain, now, code),
            None => Team::public(team_id, valid.name, params.max_members, captain, now),
        }
        .with_description(valid.description);

        self.teams
            .entry(event_id.to_string())
            .or_default()
            .insert(0, team);
        memberships.record(event_id, team_id);

        info!(event_id, team_id, privacy = %params.privacy, "team created");
        Ok(team_id)
    }

    /// Join an open public team.
    ///
    /// # Errors
    ///
    /// Fails on the shared guards, then with [`MidanError::TeamNotFound`],
    /// [`MidanError::WrongTeamKind`] for a private team or [`MidanError::TeamFull`].
    pub fn join_public(
        &mut self,
        memberships: &mut Memberships,
        user: Option<&Address>,
        event_id: &str,
        team_id: u64,
    ) -> Result<(), MidanError> {
        let user = self.guard(memberships, user, event_id)?;
        let team = self.team_mut(event_id, team_id)?;
        check_not_listed(team, &user, event_id)?;
        if team.is_private {
            return Err(MidanError::WrongTeamKind {
                team_id,
                actual: Privacy::Private,
            });
        }
        if !team.add_member(user) {
            return Err(MidanError::TeamFull { team_id });
        }
        memberships.record(event_id, team_id);

        info!(event_id, team_id, "joined public team");
        Ok(())
    }

    /// Join a private team. The code length is checked before anything is
    /// compared; the comparison itself is exact and case-sensitive.
    ///
    /// # Errors
    ///
    /// Fails on the shared guards, a code outside [`JOIN_CODE_LEN`], then
    /// [`MidanError::TeamNotFound`], [`MidanError::WrongTeamKind`],
    /// [`MidanError::TeamFull`] or [`MidanError::WrongJoinCode`].
    pub fn join_private(
        &mut self,
        memberships: &mut Memberships,
        user: Option<&Address>,
        event_id: &str,
        team_id: u64,
        code: &str,
    ) -> Result<(), MidanError> {
        let user = self.guard(memberships, user, event_id)?;
        check_code_len(code)?;
        let team = self.team_mut(event_id, team_id)?;
        check_not_listed(team, &user, event_id)?;
        if !team.is_private {
            return Err(MidanError::WrongTeamKind {
                team_id,
                actual: Privacy::Public,
            });
        }
        if team.is_full() {
            return Err(MidanError::TeamFull { team_id });
        }
        if team.join_code.as_deref() != Some(code) {
            return Err(MidanError::WrongJoinCode);
        }
        if !team.add_member(user) {
            return Err(MidanError::TeamFull { team_id });
        }
        memberships.record(event_id, team_id);

        info!(event_id, team_id, "joined private team");
        Ok(())
    }
}

/// An address already on the roster (seeded or joined elsewhere) belongs to
/// the team even without a session membership record.
fn check_not_listed(team: &Team, user: &Address, event_id: &str) -> Result<(), MidanError> {
    if team.has_member(user) {
        return Err(MidanError::AlreadyMember {
            event_id: event_id.to_string(),
            team_id: team.team_id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::seed;

    struct Fixture {
        roster: Roster,
        memberships: Memberships,
        me: Address,
    }

    fn fixture() -> Fixture {
        Fixture {
            roster: Roster::new(seed(Utc::now()).teams),
            memberships: Memberships::new(),
            me: Address::mock("YOU"),
        }
    }

    fn params(privacy: Privacy) -> CreateTeamParams {
        CreateTeamParams {
            name: "  Night Owls ".into(),
            description: "Late-session scalpers".into(),
            privacy,
            join_code: " OWLS2024 ".into(),
            max_members: 5,
        }
    }

    #[test]
    fn create_prepends_with_counter_id_and_records_membership() {
        let mut f = fixture();
        let id = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-trade", &params(Privacy::Private), Utc::now())
            .unwrap();
        assert_eq!(id, FIRST_TEAM_ID);
        assert_eq!(f.roster.next_team_id(), FIRST_TEAM_ID + 1);

        let first = &f.roster.teams("sonic-trade")[0];
        assert_eq!(first.team_id, id);
        assert_eq!(first.name, "Night Owls");
        assert_eq!(first.join_code.as_deref(), Some("OWLS2024"));
        assert_eq!(first.members, vec![f.me.clone()]);
        assert_eq!(first.captain, f.me);
        assert_eq!(f.memberships.team_for("sonic-trade"), Some(id));
    }

    #[test]
    fn create_public_ignores_code() {
        let mut f = fixture();
        let id = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-hack", &params(Privacy::Public), Utc::now())
            .unwrap();
        let team = f.roster.team("sonic-hack", id).unwrap();
        assert!(!team.is_private);
        assert_eq!(team.join_code, None);
    }

    #[test]
    fn create_requires_connection_and_no_team() {
        let mut f = fixture();
        let err = f
            .roster
            .create_team(&mut f.memberships, None, "sonic-trade", &params(Privacy::Public), Utc::now())
            .unwrap_err();
        assert_eq!(err, MidanError::NotConnected);

        f.roster
            .join_public(&mut f.memberships, Some(&f.me), "sonic-trade", 1)
            .unwrap();
        let err = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-trade", &params(Privacy::Public), Utc::now())
            .unwrap_err();
        assert!(matches!(err, MidanError::AlreadyMember { team_id: 1, .. }));
        assert_eq!(f.roster.teams("sonic-trade").len(), 4);
    }

    #[test]
    fn description_boundary_is_ten_characters() {
        let mut f = fixture();
        let mut p = params(Privacy::Public);
        p.description = "123456789".into();
        let err = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-hack", &p, Utc::now())
            .unwrap_err();
        assert!(matches!(err, MidanError::InvalidInput { field: "description", .. }));
        assert_eq!(f.roster.next_team_id(), FIRST_TEAM_ID);

        p.description = "1234567890".into();
        assert!(
            f.roster
                .create_team(&mut f.memberships, Some(&f.me), "sonic-hack", &p, Utc::now())
                .is_ok()
        );
    }

    #[test]
    fn create_validates_in_order() {
        let mut f = fixture();
        let mut p = params(Privacy::Private);
        p.name = "   ".into();
        p.description = "short".into();
        let err = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-hack", &p, Utc::now())
            .unwrap_err();
        assert!(matches!(err, MidanError::InvalidInput { field: "name", .. }));

        let mut p = params(Privacy::Private);
        p.join_code = "SHORT".into();
        p.max_members = 99;
        let err = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-hack", &p, Utc::now())
            .unwrap_err();
        assert!(matches!(err, MidanError::InvalidInput { field: "join_code", .. }));

        let mut p = params(Privacy::Public);
        p.max_members = 2;
        let err = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "sonic-hack", &p, Utc::now())
            .unwrap_err();
        assert!(matches!(err, MidanError::InvalidInput { field: "max_members", .. }));
        assert!(f.memberships.is_empty());
    }

    #[test]
    fn create_on_unknown_event_is_not_found() {
        let mut f = fixture();
        let err = f
            .roster
            .create_team(&mut f.memberships, Some(&f.me), "nope", &params(Privacy::Public), Utc::now())
            .unwrap_err();
        assert_eq!(err, MidanError::EventNotFound("nope".into()));
    }

    #[test]
    fn join_public_guards() {
        let mut f = fixture();
        let err = f
            .roster
            .join_public(&mut f.memberships, Some(&f.me), "sonic-trade", 2)
            .unwrap_err();
        assert!(matches!(err, MidanError::WrongTeamKind { actual: Privacy::Private, .. }));

        let err = f
            .roster
            .join_public(&mut f.memberships, Some(&f.me), "sonic-trade", 3)
            .unwrap_err();
        assert_eq!(err, MidanError::TeamFull { team_id: 3 });

        let err = f
            .roster
            .join_public(&mut f.memberships, Some(&f.me), "sonic-trade", 77)
            .unwrap_err();
        assert!(matches!(err, MidanError::TeamNotFound { team_id: 77, .. }));
        assert!(f.memberships.is_empty());
    }

    #[test]
    fn join_public_appends_member() {
        let mut f = fixture();
        f.roster
            .join_public(&mut f.memberships, Some(&f.me), "sonic-trade", 1)
            .unwrap();
        let alpha = f.roster.team("sonic-trade", 1).unwrap();
        assert_eq!(alpha.member_count(), 4);
        assert_eq!(alpha.members.last(), Some(&f.me));
        assert_eq!(f.memberships.team_for("sonic-trade"), Some(1));
    }

    #[test]
    fn join_private_with_exact_code() {
        let mut f = fixture();
        f.roster
            .join_private(&mut f.memberships, Some(&f.me), "sonic-trade", 2, "BETA1234")
            .unwrap();
        assert!(f.roster.team("sonic-trade", 2).unwrap().has_member(&f.me));
    }

    #[test]
    fn join_private_length_gate_runs_before_comparison() {
        let mut f = fixture();
        let err = f
            .roster
            .join_private(&mut f.memberships, Some(&f.me), "sonic-trade", 2, "BETA123")
            .unwrap_err();
        assert!(matches!(err, MidanError::InvalidInput { field: "join_code", .. }));
    }

    #[test]
    fn join_private_rejects_near_misses() {
        let mut f = fixture();
        for code in ["beta1234", "BETA1235", "BETA12345", " BETA1234"] {
            let err = f
                .roster
                .join_private(&mut f.memberships, Some(&f.me), "sonic-trade", 2, code)
                .unwrap_err();
            assert_eq!(err, MidanError::WrongJoinCode, "code {code:?}");
        }
        assert_eq!(f.roster.team("sonic-trade", 2).unwrap().member_count(), 2);
    }

    #[test]
    fn join_private_on_public_team_is_wrong_kind() {
        let mut f = fixture();
        let err = f
            .roster
            .join_private(&mut f.memberships, Some(&f.me), "sonic-trade", 1, "WHATEVER1")
            .unwrap_err();
        assert!(matches!(err, MidanError::WrongTeamKind { actual: Privacy::Public, .. }));
    }

    #[test]
    fn seeded_member_joining_again_is_already_member() {
        let mut f = fixture();
        let seeded = Address::mock("A2");
        let err = f
            .roster
            .join_public(&mut f.memberships, Some(&seeded), "sonic-trade", 1)
            .unwrap_err();
        assert!(matches!(err, MidanError::AlreadyMember { team_id: 1, .. }));
        assert_eq!(f.roster.team("sonic-trade", 1).unwrap().member_count(), 3);
        assert_eq!(f.memberships.team_for("sonic-trade"), None);

        let captain = Address::mock("B1");
        let err = f
            .roster
            .join_private(&mut f.memberships, Some(&captain), "sonic-trade", 2, "BETA1234")
            .unwrap_err();
        assert!(matches!(err, MidanError::AlreadyMember { team_id: 2, .. }));
    }
}
