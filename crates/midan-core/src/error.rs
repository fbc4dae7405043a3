use std::fmt;
use std::time::Duration;

use crate::model::team::Privacy;

/// Machine-readable error codes for scripted callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotConnected,
    ConfigParseError,
    EventNotFound,
    TeamNotFound,
    AlreadyMember,
    InvalidInput,
    TeamFull,
    WrongTeamKind,
    WrongJoinCode,
    NotTeamMember,
    BlobWriteFailed,
    LockContention,
    CorruptBlob,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotConnected => "E1001",
            Self::ConfigParseError => "E1002",
            Self::EventNotFound => "E2001",
            Self::TeamNotFound => "E2002",
            Self::AlreadyMember => "E2003",
            Self::InvalidInput => "E2004",
            Self::TeamFull => "E2005",
            Self::WrongTeamKind => "E2006",
            Self::WrongJoinCode => "E2007",
            Self::NotTeamMember => "E2008",
            Self::BlobWriteFailed => "E5001",
            Self::LockContention => "E5002",
            Self::CorruptBlob => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotConnected => "Wallet not connected",
            Self::ConfigParseError => "Config file parse error",
            Self::EventNotFound => "Event not found",
            Self::TeamNotFound => "Team not found",
            Self::AlreadyMember => "Already in a team for this event",
            Self::InvalidInput => "Invalid input",
            Self::TeamFull => "Team is full",
            Self::WrongTeamKind => "Wrong team kind for this action",
            Self::WrongJoinCode => "Incorrect join code",
            Self::NotTeamMember => "Not a member of this team",
            Self::BlobWriteFailed => "Blob store write failed",
            Self::LockContention => "Lock contention",
            Self::CorruptBlob => "Stored blob is corrupt",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotConnected => Some("Connect the wallet (`--connect` or a `connect` action) and retry."),
            Self::ConfigParseError => Some("Fix syntax in .midan/config.toml and retry."),
            Self::EventNotFound => Some("Run `midan events` to list known event ids."),
            Self::TeamNotFound => Some("Run `midan teams <event>` to list team ids."),
            Self::AlreadyMember => Some("A user can belong to one team per event."),
            Self::InvalidInput => None,
            Self::TeamFull => Some("Pick a team with open spots (`--joinable`)."),
            Self::WrongTeamKind => {
                Some("Join public teams directly and private teams with their join code.")
            }
            Self::WrongJoinCode => Some("Check the code with the team captain and retry."),
            Self::NotTeamMember => Some("Join the team to chat."),
            Self::BlobWriteFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `midan` process finishes."),
            Self::CorruptBlob => Some("Delete the blob file to reset it; it will be recreated."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failures of user actions.
///
/// None of these are fatal: the host shows them as a transient notice and the
/// state is left exactly as it was before the action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MidanError {
    #[error("connect a wallet to continue")]
    NotConnected,

    #[error("already in team #{team_id} for event '{event_id}'")]
    AlreadyMember { event_id: String, team_id: u64 },

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("team #{team_id} is full")]
    TeamFull { team_id: u64 },

    #[error("team #{team_id} is a {actual} team")]
    WrongTeamKind { team_id: u64, actual: Privacy },

    #[error("the join code is incorrect")]
    WrongJoinCode,

    #[error("only members of team #{team_id} can post")]
    NotTeamMember { team_id: u64 },

    #[error("event '{0}' not found")]
    EventNotFound(String),

    #[error("team #{team_id} not found in event '{event_id}'")]
    TeamNotFound { event_id: String, team_id: u64 },
}

impl MidanError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotConnected => ErrorCode::NotConnected,
            Self::AlreadyMember { .. } => ErrorCode::AlreadyMember,
            Self::InvalidInput { .. } => ErrorCode::InvalidInput,
            Self::TeamFull { .. } => ErrorCode::TeamFull,
            Self::WrongTeamKind { .. } => ErrorCode::WrongTeamKind,
            Self::WrongJoinCode => ErrorCode::WrongJoinCode,
            Self::NotTeamMember { .. } => ErrorCode::NotTeamMember,
            Self::EventNotFound(_) => ErrorCode::EventNotFound,
            Self::TeamNotFound { .. } => ErrorCode::TeamNotFound,
        }
    }

    /// Suggestion text for terminal and JSON error output.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.code()
            .hint()
            .map_or_else(|| self.code().message().to_string(), str::to_string)
    }
}

/// Failures of the persisted blob store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access blob store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("blob '{key}' is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("lock timed out after {waited:?} at {path}")]
    LockTimeout { path: String, waited: Duration },
}

impl StorageError {
    /// Machine-readable code associated with this storage error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::BlobWriteFailed,
            Self::Json { .. } => ErrorCode::CorruptBlob,
            Self::LockTimeout { .. } => ErrorCode::LockContention,
        }
    }
}
