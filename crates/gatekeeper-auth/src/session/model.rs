//! Decoded session identity and group memberships.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use gatekeeper_core::error::AppError;

/// Group name to the set of sub-group names the principal holds in it.
///
/// A group key with an empty set still counts as membership in the group.
pub type Memberships = BTreeMap<String, BTreeSet<String>>;

/// An authenticated principal as carried in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    login: String,
    #[serde(default)]
    memberships: Memberships,
}

impl Session {
    /// Creates a session with no memberships.
    ///
    /// Rejects an empty login: "no session" is [`SessionState::Absent`],
    /// never a session with a blank identity.
    pub fn new(login: impl Into<String>) -> Result<Self, AppError> {
        let login = login.into();
        if login.trim().is_empty() {
            return Err(AppError::validation("session login must not be empty"));
        }
        Ok(Self {
            login,
            memberships: Memberships::new(),
        })
    }

    /// Creates a session from `group` / `group/subgroup` specs.
    pub fn from_specs<S: AsRef<str>>(
        login: impl Into<String>,
        specs: &[S],
    ) -> Result<Self, AppError> {
        let mut session = Self::new(login)?;
        for spec in specs {
            let spec = spec.as_ref();
            match spec.split_once('/') {
                Some((group, subgroup)) if !group.is_empty() && !subgroup.is_empty() => {
                    session.add_subgroup(group, subgroup);
                }
                None if !spec.is_empty() => session.add_group(spec),
                _ => {
                    return Err(AppError::validation(format!(
                        "invalid membership '{spec}', expected group or group/subgroup"
                    )));
                }
            }
        }
        Ok(session)
    }

    /// Adds membership in `group` without any sub-group.
    pub fn add_group(&mut self, group: impl Into<String>) {
        self.memberships.entry(group.into()).or_default();
    }

    /// Adds membership in `subgroup` of `group`.
    pub fn add_subgroup(&mut self, group: impl Into<String>, subgroup: impl Into<String>) {
        self.memberships
            .entry(group.into())
            .or_default()
            .insert(subgroup.into());
    }

    /// Builder form of [`Session::add_subgroup`].
    pub fn with_subgroup(mut self, group: impl Into<String>, subgroup: impl Into<String>) -> Self {
        self.add_subgroup(group, subgroup);
        self
    }

    /// Builder form of [`Session::add_group`].
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.add_group(group);
        self
    }

    /// The principal identifier.
    pub fn login(&self) -> &str {
        &self.login
    }

    /// All memberships.
    pub fn memberships(&self) -> &Memberships {
        &self.memberships
    }

    /// Whether the principal holds any membership in `group`.
    pub fn is_member_of(&self, group: &str) -> bool {
        self.memberships.contains_key(group)
    }

    /// Whether the principal holds `subgroup` within `group`.
    pub fn has_subgroup(&self, group: &str, subgroup: &str) -> bool {
        self.memberships
            .get(group)
            .is_some_and(|subgroups| subgroups.contains(subgroup))
    }

    pub(crate) fn from_parts(login: String, memberships: Memberships) -> Self {
        Self { login, memberships }
    }
}

/// Outcome of reading a session from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// A verified, unexpired session.
    Active(Session),
    /// No token, or a token that failed verification for any reason.
    Absent,
}

impl SessionState {
    /// The session, when active.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Active(session) => Some(session),
            Self::Absent => None,
        }
    }

    /// The login, when active.
    pub fn login(&self) -> Option<&str> {
        self.session().map(Session::login)
    }

    /// Whether a verified session is present.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl From<Option<Session>> for SessionState {
    fn from(session: Option<Session>) -> Self {
        session.map_or(Self::Absent, Self::Active)
    }
}
