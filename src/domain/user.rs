//! Users, roles and bearer-token sessions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::document::{self, Document};
use super::query::FieldValue;
use crate::error::AppError;

/// Marketplace role. Every gated route requires exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Posts tuition requests and pays tutors.
    Student,
    /// Applies to tuition requests.
    Tutor,
    /// Reviews tuitions, applications and users.
    Admin,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Self; 3] = [Self::Student, Self::Tutor, Self::Admin];

    /// Stored / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Tutor => "Tutor",
            Self::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::InvalidRequest(format!("unknown role: {s}")))
    }
}

impl From<Role> for FieldValue {
    fn from(role: Role) -> Self {
        Self::Text(role.as_str().to_string())
    }
}

/// A registered marketplace user, identified by email.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct User {
    /// Unique login email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Marketplace role.
    pub role: Role,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Profile photo URL.
    pub photo_url: Option<String>,
    /// Argon2 PHC string. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    /// Registration time. Only recorded for tutors.
    pub created_at: Option<DateTime<Utc>>,
}

/// Addressable fields of [`User`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    /// `email`
    Email,
    /// `name`
    Name,
    /// `role`
    Role,
    /// `phone`
    Phone,
    /// `photo_url`
    PhotoUrl,
    /// `password_hash`
    PasswordHash,
    /// `created_at`
    CreatedAt,
}

impl Document for User {
    type Field = UserField;

    const COLLECTION: &'static str = "users";

    fn key(&self) -> String {
        self.email.clone()
    }

    fn field(&self, field: UserField) -> FieldValue {
        match field {
            UserField::Email => self.email.as_str().into(),
            UserField::Name => self.name.as_str().into(),
            UserField::Role => self.role.into(),
            UserField::Phone => self.phone.clone().into(),
            UserField::PhotoUrl => self.photo_url.clone().into(),
            UserField::PasswordHash => self.password_hash.as_str().into(),
            UserField::CreatedAt => self.created_at.into(),
        }
    }

    fn set(&mut self, field: UserField, value: FieldValue) -> Result<(), AppError> {
        match field {
            UserField::Name => self.name = document::text("name", value)?,
            UserField::Role => self.role = document::text("role", value)?.parse()?,
            UserField::Phone => self.phone = document::optional_text("phone", value)?,
            UserField::PhotoUrl => self.photo_url = document::optional_text("photo_url", value)?,
            UserField::PasswordHash => {
                self.password_hash = document::text("password_hash", value)?;
            }
            UserField::CreatedAt => {
                self.created_at = document::optional_time("created_at", value)?;
            }
            UserField::Email => return document::immutable(Self::COLLECTION, field),
        }
        Ok(())
    }
}

/// An issued bearer token bound to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    /// Opaque bearer token.
    pub token: String,
    /// Owner's email.
    pub email: String,
    /// Issue time.
    pub issued_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Returns `true` once `now` is past the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Addressable fields of [`AuthSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    /// `token`
    Token,
    /// `email`
    Email,
    /// `issued_at`
    IssuedAt,
    /// `expires_at`
    ExpiresAt,
}

impl Document for AuthSession {
    type Field = SessionField;

    const COLLECTION: &'static str = "sessions";

    fn key(&self) -> String {
        self.token.clone()
    }

    fn field(&self, field: SessionField) -> FieldValue {
        match field {
            SessionField::Token => self.token.as_str().into(),
            SessionField::Email => self.email.as_str().into(),
            SessionField::IssuedAt => self.issued_at.into(),
            SessionField::ExpiresAt => self.expires_at.into(),
        }
    }

    fn set(&mut self, field: SessionField, _value: FieldValue) -> Result<(), AppError> {
        document::immutable(Self::COLLECTION, field)
    }
}
