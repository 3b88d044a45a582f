//! Account service: registration, password login, bearer sessions and
//! admin user management.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthSession, Direction, FieldValue, Filter, ListQuery, Page, PageRequest, Role, SessionField,
    Update, User, UserField,
};
use crate::error::AppError;
use crate::persistence::{InsertOutcome, Store};

const MIN_PASSWORD_LEN: usize = 6;

/// Registration input.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name.
    pub name: String,
    /// Login email; normalized to lowercase.
    pub email: String,
    /// Plain-text password, hashed before storage.
    pub password: String,
    /// Requested role. Only Student and Tutor may self-register.
    pub role: Role,
    /// Contact phone.
    pub phone: Option<String>,
    /// Profile photo URL.
    pub photo_url: Option<String>,
}

/// Admin-side profile changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New display name.
    pub name: Option<String>,
    /// New role.
    pub role: Option<Role>,
    /// New phone.
    pub phone: Option<String>,
    /// New photo URL.
    pub photo_url: Option<String>,
}

/// Users and their sessions.
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Store,
    session_ttl: Duration,
}

/// Lowercases and trims an email, rejecting obviously malformed input.
///
/// # Errors
///
/// Returns [`AppError::InvalidRequest`] if the address has no local part or
/// domain.
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::InvalidRequest(format!(
            "invalid email address: {email}"
        ))),
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("invalid email or password".to_string())
}

impl AccountService {
    /// Creates the service with the given session lifetime.
    #[must_use]
    pub fn new(store: Store, session_ttl: Duration) -> Self {
        Self { store, session_ttl }
    }

    async fn issue_session(&self, email: &str) -> Result<AuthSession, AppError> {
        let issued_at = Utc::now();
        let session = AuthSession {
            token: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            issued_at,
            expires_at: issued_at + self.session_ttl,
        };
        match self.store.sessions.insert_one(session.clone()).await? {
            InsertOutcome::Inserted => Ok(session),
            InsertOutcome::Duplicate => Err(AppError::Internal(
                "session token collision".to_string(),
            )),
        }
    }

    async fn prune_expired_sessions(&self) -> Result<(), AppError> {
        let expired = [Filter::range(
            SessionField::ExpiresAt,
            None,
            Some(FieldValue::from(Utc::now())),
        )];
        let pruned = self.store.sessions.delete_many(&expired).await?;
        if pruned > 0 {
            tracing::debug!(pruned, "expired sessions removed");
        }
        Ok(())
    }

    /// Registers a Student or Tutor and opens a session for them.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] on malformed input or a request
    /// for the Admin role, and [`AppError::Conflict`] if the email is taken.
    pub async fn signup(&self, input: NewAccount) -> Result<(User, AuthSession), AppError> {
        if input.role == Role::Admin {
            return Err(AppError::InvalidRequest(
                "admin accounts cannot be self-registered".to_string(),
            ));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidRequest(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let user = User {
            email: normalize_email(&input.email)?,
            name: required("name", &input.name)?,
            role: input.role,
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            photo_url: input.photo_url.filter(|p| !p.trim().is_empty()),
            password_hash: hash_password(&input.password)?,
            created_at: (input.role == Role::Tutor).then(Utc::now),
        };

        if self.store.users.insert_one(user.clone()).await? == InsertOutcome::Duplicate {
            return Err(AppError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        let session = self.issue_session(&user.email).await?;

        tracing::info!(email = %user.email, role = %user.role, "user registered");
        Ok((user, session))
    }

    /// Verifies a password and opens a new session.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for an unknown email or a wrong
    /// password.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, AuthSession), AppError> {
        let email = normalize_email(email).map_err(|_| invalid_credentials())?;
        let Some(user) = self
            .store
            .users
            .find_one(&[Filter::eq(UserField::Email, email.as_str())])
            .await?
        else {
            return Err(invalid_credentials());
        };
        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(%email, "rejected login");
            return Err(invalid_credentials());
        }
        self.prune_expired_sessions().await?;
        let session = self.issue_session(&user.email).await?;
        tracing::info!(email = %user.email, "user logged in");
        Ok((user, session))
    }

    /// Revokes one bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.store
            .sessions
            .delete_one(&[Filter::eq(SessionField::Token, token)])
            .await?;
        Ok(())
    }

    /// Resolves a bearer token to its user.
    ///
    /// Expired sessions are deleted on sight.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] if the token is unknown or
    /// expired, or if the user no longer exists.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let by_token = [Filter::eq(SessionField::Token, token)];
        let Some(session) = self.store.sessions.find_one(&by_token).await? else {
            return Err(AppError::Unauthorized("unknown session".to_string()));
        };
        if session.is_expired(Utc::now()) {
            self.store.sessions.delete_one(&by_token).await?;
            return Err(AppError::Unauthorized("session expired".to_string()));
        }
        self.store
            .users
            .find_one(&[Filter::eq(UserField::Email, session.email.as_str())])
            .await?
            .ok_or_else(|| AppError::Unauthorized("account no longer exists".to_string()))
    }

    /// Looks up a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no such user exists.
    pub async fn get_user(&self, email: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        self.store
            .users
            .find_one(&[Filter::eq(UserField::Email, email.as_str())])
            .await?
            .ok_or_else(|| AppError::not_found("user", email))
    }

    /// Lists users, optionally by role, searching name and email.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_users(
        &self,
        role: Option<Role>,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, AppError> {
        let query = ListQuery::new()
            .eq_opt(UserField::Role, role)
            .search(vec![UserField::Name, UserField::Email], search)
            .sort_by(UserField::Email, Direction::Asc)
            .page(page);
        self.store.users.find(&query).await
    }

    /// Public tutor directory, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on store failure.
    pub async fn list_tutors(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Page<User>, AppError> {
        let query = ListQuery::new()
            .eq(UserField::Role, Role::Tutor)
            .search(vec![UserField::Name, UserField::Email], search)
            .sort_by(UserField::CreatedAt, Direction::Desc)
            .page(page);
        self.store.users.find(&query).await
    }

    /// Applies admin changes to a user and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] for an empty change set or a
    /// blank name, and [`AppError::NotFound`] for an unknown email.
    pub async fn update_user(&self, email: &str, changes: UserChanges) -> Result<User, AppError> {
        let name = changes.name.as_deref().map(|n| required("name", n)).transpose()?;
        let mut update = Update::new()
            .set_opt(UserField::Name, name)
            .set_opt(UserField::Role, changes.role)
            .set_opt(UserField::Phone, changes.phone)
            .set_opt(UserField::PhotoUrl, changes.photo_url);
        if update.is_empty() {
            return Err(AppError::InvalidRequest("no changes supplied".to_string()));
        }

        let email = email.trim().to_lowercase();
        if let Some(role) = changes.role {
            // created_at is the tutor registration time; it follows the role.
            let current = self.get_user(&email).await?;
            if current.role != role {
                update = update.set(UserField::CreatedAt, (role == Role::Tutor).then(Utc::now));
            }
        }
        let outcome = self
            .store
            .users
            .update_one(&[Filter::eq(UserField::Email, email.as_str())], &update)
            .await?;
        if outcome.matched == 0 {
            return Err(AppError::not_found("user", email));
        }
        tracing::info!(%email, modified = outcome.modified, "user updated");
        self.get_user(&email).await
    }

    /// Deletes a user together with their sessions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown email.
    pub async fn delete_user(&self, email: &str) -> Result<(), AppError> {
        let email = email.trim().to_lowercase();
        let deleted = self
            .store
            .users
            .delete_one(&[Filter::eq(UserField::Email, email.as_str())])
            .await?;
        if !deleted {
            return Err(AppError::not_found("user", email));
        }
        let sessions = self
            .store
            .sessions
            .delete_many(&[Filter::eq(SessionField::Email, email.as_str())])
            .await?;
        tracing::info!(%email, sessions, "user deleted");
        Ok(())
    }

    /// Creates the bootstrap admin unless the email is already registered.
    /// Returns whether an account was created.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidRequest`] on a malformed email or short
    /// password.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AppError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidRequest(format!(
                "admin password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let admin = User {
            email: normalize_email(email)?,
            name: "Administrator".to_string(),
            role: Role::Admin,
            phone: None,
            photo_url: None,
            password_hash: hash_password(password)?,
            created_at: None,
        };
        let created = self.store.users.insert_one(admin).await? == InsertOutcome::Inserted;
        if created {
            tracing::info!(email, "bootstrap admin created");
        }
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn service() -> AccountService {
        AccountService::new(Store::in_memory(), Duration::hours(1))
    }

    fn account(email: &str, role: Role) -> NewAccount {
        NewAccount {
            name: "Rahim".to_string(),
            email: email.to_string(),
            password: "secret-pass".to_string(),
            role,
            phone: None,
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn signup_then_authenticate() {
        let svc = service();
        let Ok((user, session)) = svc.signup(account(" Rahim@Example.com ", Role::Tutor)).await
        else {
            panic!("signup should succeed");
        };
        assert_eq!(user.email, "rahim@example.com");
        assert!(user.created_at.is_some());
        assert_ne!(user.password_hash, "secret-pass");

        let Ok(resolved) = svc.authenticate(&session.token).await else {
            panic!("fresh token should authenticate");
        };
        assert_eq!(resolved.email, user.email);
    }

    #[tokio::test]
    async fn students_have_no_created_at() {
        let Ok((user, _)) = service().signup(account("s@example.com", Role::Student)).await else {
            panic!("signup should succeed");
        };
        assert!(user.created_at.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = service();
        assert!(svc.signup(account("a@example.com", Role::Student)).await.is_ok());
        let result = svc.signup(account("A@example.com", Role::Tutor)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn admin_cannot_self_register() {
        let result = service().signup(account("boss@example.com", Role::Admin)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn login_checks_password() {
        let svc = service();
        assert!(svc.signup(account("s@example.com", Role::Student)).await.is_ok());

        let wrong = svc.login("s@example.com", "not-it").await;
        assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
        let unknown = svc.login("nobody@example.com", "secret-pass").await;
        assert!(matches!(unknown, Err(AppError::Unauthorized(_))));
        assert!(svc.login("S@example.com", "secret-pass").await.is_ok());
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let svc = service();
        let Ok((_, session)) = svc.signup(account("s@example.com", Role::Student)).await else {
            panic!("signup should succeed");
        };
        assert!(svc.logout(&session.token).await.is_ok());
        assert!(matches!(
            svc.authenticate(&session.token).await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn expired_session_is_removed() {
        let svc = AccountService::new(Store::in_memory(), Duration::seconds(-1));
        let Ok((_, session)) = svc.signup(account("s@example.com", Role::Student)).await else {
            panic!("signup should succeed");
        };
        assert!(svc.authenticate(&session.token).await.is_err());
        let Ok(remaining) = svc.store.sessions.count(&[]).await else {
            panic!("count should succeed");
        };
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn login_prunes_expired_sessions() {
        let store = Store::in_memory();
        let stale = AccountService::new(store.clone(), Duration::seconds(-1));
        assert!(stale.signup(account("a@example.com", Role::Student)).await.is_ok());
        assert!(stale.signup(account("b@example.com", Role::Tutor)).await.is_ok());

        let svc = AccountService::new(store.clone(), Duration::hours(1));
        let Ok((_, fresh)) = svc.login("a@example.com", "secret-pass").await else {
            panic!("login should succeed");
        };
        let Ok(remaining) = store.sessions.count(&[]).await else {
            panic!("count should succeed");
        };
        assert_eq!(remaining, 1);
        assert!(svc.authenticate(&fresh.token).await.is_ok());
    }

    #[tokio::test]
    async fn deleted_user_token_stops_working() {
        let svc = service();
        let Ok((user, session)) = svc.signup(account("t@example.com", Role::Tutor)).await else {
            panic!("signup should succeed");
        };
        assert!(svc.login("t@example.com", "secret-pass").await.is_ok());
        assert!(svc.delete_user(&user.email).await.is_ok());
        assert!(svc.authenticate(&session.token).await.is_err());
        let Ok(left) = svc
            .store
            .sessions
            .count(&[Filter::eq(SessionField::Email, user.email.as_str())])
            .await
        else {
            panic!("count should succeed");
        };
        assert_eq!(left, 0);
        assert!(matches!(
            svc.delete_user(&user.email).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_user_changes_role() {
        let svc = service();
        assert!(svc.signup(account("t@example.com", Role::Tutor)).await.is_ok());
        let changes = UserChanges {
            role: Some(Role::Student),
            ..UserChanges::default()
        };
        let Ok(user) = svc.update_user("t@example.com", changes).await else {
            panic!("update should succeed");
        };
        assert_eq!(user.role, Role::Student);
        assert!(user.created_at.is_none());

        let promote = UserChanges {
            role: Some(Role::Tutor),
            ..UserChanges::default()
        };
        let Ok(promoted) = svc.update_user("t@example.com", promote.clone()).await else {
            panic!("promotion should succeed");
        };
        assert!(promoted.created_at.is_some());
        let Ok(again) = svc.update_user("t@example.com", promote).await else {
            panic!("same-role update should succeed");
        };
        assert_eq!(again.created_at, promoted.created_at);

        let empty = svc.update_user("t@example.com", UserChanges::default()).await;
        assert!(matches!(empty, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let svc = service();
        assert!(matches!(svc.ensure_admin("root@example.com", "adminpass").await, Ok(true)));
        assert!(matches!(svc.ensure_admin("root@example.com", "adminpass").await, Ok(false)));
        let Ok((admin, _)) = svc.login("root@example.com", "adminpass").await else {
            panic!("admin should log in");
        };
        assert_eq!(admin.role, Role::Admin);
    }

    #[tokio::test]
    async fn tutor_directory_only_lists_tutors() {
        let svc = service();
        assert!(svc.signup(account("t1@example.com", Role::Tutor)).await.is_ok());
        assert!(svc.signup(account("s1@example.com", Role::Student)).await.is_ok());
        let Ok(page) = svc.list_tutors(None, PageRequest::default()).await else {
            panic!("listing should succeed");
        };
        assert_eq!(page.pagination.total, 1);
        assert!(page.data.iter().all(|u| u.role == Role::Tutor));
    }

    #[test]
    fn email_normalization() {
        assert!(matches!(normalize_email(" A@B.io "), Ok(e) if e == "a@b.io"));
        assert!(normalize_email("no-at-sign").is_err());
        assert!(normalize_email("@b.io").is_err());
    }
}
