use std::fmt;
use std::str::FromStr;

use diesel::prelude::*;
use jiff::{SignedDuration, Timestamp};
use jiff_diesel::ToDiesel;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Length of the hyphenated `8-4-4-4-12` form.
const CANONICAL_LEN: usize = 36;

/// Store-assigned identifier of a user record.
///
/// Both storage backends hand out UUIDs, so a path segment that does not
/// parse as one can be rejected before any storage lookup happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a fresh random identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a raw identifier, failing with a validation error on a malformed value.
    ///
    /// Only the canonical hyphenated form is accepted, untrimmed: the simple,
    /// braced and URN spellings of a UUID are malformed here.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let malformed = || AppError::Validation {
            field: "id".to_string(),
            reason: format!("'{}' is not a valid user identifier", raw),
        };

        if raw.len() != CANONICAL_LEN {
            return Err(malformed());
        }
        Uuid::try_parse(raw).map(Self).map_err(|_| malformed())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Canonical user record as owned by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl User {
    /// Builds a freshly created record with a new identifier.
    pub fn create(new_user: NewUser, now: Timestamp) -> Self {
        Self {
            id: UserId::new_random(),
            name: new_user.name,
            email: new_user.email,
            created_at: now,
            updated_at: None,
        }
    }

    /// Replaces name and email and stamps the update time.
    ///
    /// The update timestamp never lands on or before the creation timestamp,
    /// even when both are taken within the same clock tick.
    pub fn apply(&mut self, changes: UserChanges, now: Timestamp) {
        self.name = changes.name;
        self.email = changes.email;
        self.updated_at = Some(update_timestamp(self.created_at, now));
    }
}

/// Returns `now` truncated to microseconds, or one microsecond after
/// `created_at` if that is not strictly later.
///
/// PostgreSQL keeps microseconds, so a sub-microsecond lead over
/// `created_at` would not survive a round trip through the store.
pub(crate) fn update_timestamp(created_at: Timestamp, now: Timestamp) -> Timestamp {
    let now = Timestamp::from_microsecond(now.as_microsecond()).unwrap_or(now);
    if now > created_at {
        return now;
    }
    created_at
        .checked_add(SignedDuration::from_micros(1))
        .unwrap_or(created_at)
}

/// Input for creating a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Full replacement of the mutable user fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub name: String,
    pub email: String,
}

/// Row read from the `users` table.
#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: jiff_diesel::Timestamp,
    pub updated_at: Option<jiff_diesel::Timestamp>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: UserId::from(record.id),
            name: record.name,
            email: record.email,
            created_at: record.created_at.to_jiff(),
            updated_at: record.updated_at.map(|ts| ts.to_jiff()),
        }
    }
}

/// Row inserted into the `users` table; the id is generated by the database.
#[derive(Debug, Insertable, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub created_at: jiff_diesel::Timestamp,
}

impl NewUserRecord {
    pub fn new(new_user: NewUser, now: Timestamp) -> Self {
        Self {
            name: new_user.name,
            email: new_user.email,
            created_at: now.to_diesel(),
        }
    }
}

/// Changeset applied by an update.
#[derive(Debug, AsChangeset, Clone)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChangeset {
    pub name: String,
    pub email: String,
    pub updated_at: jiff_diesel::Timestamp,
}

impl UserChangeset {
    pub fn new(changes: UserChanges, now: Timestamp) -> Self {
        Self {
            name: changes.name,
            email: changes.email,
            updated_at: now.to_diesel(),
        }
    }
}
