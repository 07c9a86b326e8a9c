//! Accounts, logins and the session context.
//!
//! There is no global "current user". A [`SessionContext`] is created at startup by
//! [`SessionContext::restore`] (which rehydrates the token persisted by the previous
//! run), filled by [`SessionContext::login`] or [`SessionContext::register`], and
//! emptied by [`SessionContext::logout`]. Operations that stamp `created_by` take
//! the [`Session`] it holds.

use crate::{
    core::{new_document_id, require_text},
    entities::{
        Account, User, account,
        session::{self, Entity as SessionEntity},
        user::{self, UserStatus, UserType},
    },
    errors::{Error, Result},
};
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// A logged-in account together with its profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token, also the `sessions` row id
    pub token: String,
    /// Account id, stamped into `created_by`
    pub account_id: String,
    /// Profile document
    pub user: user::Model,
}

/// Registration form
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Name for the profile
    pub full_name: String,
    /// Role of the new user
    pub user_type: UserType,
}

/// Profile fields a user may change. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
#[allow(missing_docs)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub employee_id: Option<String>,
    pub avatar: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn invalid_credentials() -> Error {
    Error::Authentication {
        message: "Invalid email or password".to_string(),
    }
}

async fn open_session<C>(db: &C, account_id: &str) -> Result<session::Model>
where
    C: ConnectionTrait,
{
    let row = session::ActiveModel {
        id: Set(new_document_id()),
        account_id: Set(account_id.to_string()),
        created_at: Set(Utc::now()),
    };
    row.insert(db).await.map_err(Into::into)
}

async fn find_profile<C>(db: &C, account_id: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::UserId.eq(account_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Looks up a persisted token and rebuilds its session.
///
/// Returns `None` if the token is unknown. A session whose account has no profile
/// is deleted and also yields `None`.
pub async fn resume_session<C>(db: &C, token: &str) -> Result<Option<Session>>
where
    C: ConnectionTrait,
{
    let Some(row) = SessionEntity::find_by_id(token).one(db).await? else {
        return Ok(None);
    };

    match find_profile(db, &row.account_id).await? {
        Some(user) => Ok(Some(Session {
            token: row.id,
            account_id: row.account_id,
            user,
        })),
        None => {
            warn!("Session {token} has no user profile, deleting it");
            SessionEntity::delete_by_id(token).exec(db).await?;
            Ok(None)
        }
    }
}

async fn read_token(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => {
            let token = contents.trim();
            Ok((!token.is_empty()).then(|| token.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Who is logged in, plus where that fact is persisted between runs.
#[derive(Debug, Default)]
pub struct SessionContext {
    token_file: Option<PathBuf>,
    current: Option<Session>,
}

impl SessionContext {
    /// An empty context. With a `token_file`, logins are persisted there.
    #[must_use]
    pub const fn new(token_file: Option<PathBuf>) -> Self {
        Self {
            token_file,
            current: None,
        }
    }

    /// Rehydrates the session persisted in `token_file`, if it is still valid.
    ///
    /// Never fails: any error while reading the file or the store leaves the
    /// context logged out.
    #[instrument(skip(db))]
    pub async fn restore<C>(db: &C, token_file: PathBuf) -> Self
    where
        C: ConnectionTrait,
    {
        let mut context = Self::new(Some(token_file.clone()));
        let restored = match read_token(&token_file).await {
            Ok(Some(token)) => resume_session(db, &token).await,
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match restored {
            Ok(Some(session)) => {
                info!("Restored session for {}", session.user.email);
                context.current = Some(session);
            }
            Ok(None) => {
                debug!("No session to restore");
                context.forget_token().await;
            }
            Err(e) => {
                warn!("Could not restore session: {e}");
                context.forget_token().await;
            }
        }
        context
    }

    #[cfg(test)]
    pub(crate) const fn with_session(session: Session) -> Self {
        Self {
            token_file: None,
            current: Some(session),
        }
    }

    /// The logged-in session, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Whether someone is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// The logged-in session, or [`Error::NotAuthenticated`].
    pub fn require(&self) -> Result<&Session> {
        self.current.as_ref().ok_or(Error::NotAuthenticated)
    }

    async fn remember_token(&self, token: &str) {
        if let Some(path) = &self.token_file {
            if let Some(parent) = path.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    warn!("Could not create {}: {e}", parent.display());
                }
            }
            if let Err(e) = tokio::fs::write(path, token).await {
                warn!("Could not persist session token: {e}");
            }
        }
    }

    async fn forget_token(&self) {
        if let Some(path) = &self.token_file {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove session token: {e}"),
            }
        }
    }

    /// Ends any current session before a new login. Failures are ignored.
    async fn discard_current<C>(&mut self, db: &C)
    where
        C: ConnectionTrait,
    {
        if let Some(previous) = self.current.take() {
            if let Err(e) = SessionEntity::delete_by_id(previous.token.as_str())
                .exec(db)
                .await
            {
                debug!("Previous session could not be deleted: {e}");
            }
        }
    }

    async fn activate(&mut self, session: Session) -> Result<&Session> {
        self.remember_token(&session.token).await;
        Ok(self.current.insert(session))
    }

    /// Logs in with email and password.
    ///
    /// Any existing session is ended first. The account must have a profile; its
    /// `last_login` is stamped on success.
    #[instrument(skip(self, db, password))]
    pub async fn login<C>(&mut self, db: &C, email: &str, password: &str) -> Result<&Session>
    where
        C: ConnectionTrait,
    {
        self.discard_current(db).await;

        let account = Account::find()
            .filter(account::Column::Email.eq(normalize_email(email)))
            .one(db)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &account.password_hash)? {
            return Err(invalid_credentials());
        }

        let profile = find_profile(db, &account.id)
            .await?
            .ok_or_else(|| Error::ProfileNotFound {
                account_id: account.id.clone(),
            })?;
        let row = open_session(db, &account.id).await?;

        let mut active: user::ActiveModel = profile.into();
        active.last_login = Set(Some(Utc::now()));
        let user = active.update(db).await?;

        info!("Logged in {}", user.email);
        self.activate(Session {
            token: row.id,
            account_id: account.id,
            user,
        })
        .await
    }

    /// Creates an account with its profile and logs it in.
    ///
    /// The account, profile and session are separate writes. If the profile insert
    /// fails the account row remains and every login to it fails with
    /// [`Error::ProfileNotFound`]; registering the same email again is refused.
    #[instrument(skip(self, db, data), fields(email = %data.email))]
    pub async fn register<C>(&mut self, db: &C, data: NewAccount) -> Result<&Session>
    where
        C: ConnectionTrait,
    {
        self.discard_current(db).await;

        let email = normalize_email(&data.email);
        require_text("full name", &data.full_name)?;
        if !email.contains('@') {
            return Err(Error::Validation {
                message: format!("Invalid email address: {}", data.email),
            });
        }
        if data.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation {
                message: format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }

        let existing = Account::find()
            .filter(account::Column::Email.eq(email.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(Error::Authentication {
                message: "An account with this email already exists".to_string(),
            });
        }

        let now = Utc::now();
        let account = account::ActiveModel {
            id: Set(new_document_id()),
            email: Set(email.clone()),
            name: Set(data.full_name.trim().to_string()),
            password_hash: Set(hash_password(&data.password)?),
            created_at: Set(now),
        }
        .insert(db)
        .await?;

        let user = user::ActiveModel {
            id: Set(new_document_id()),
            user_id: Set(account.id.clone()),
            email: Set(email),
            full_name: Set(data.full_name.trim().to_string()),
            user_type: Set(data.user_type),
            phone_number: Set(None),
            status: Set(UserStatus::Active),
            avatar: Set(None),
            employee_id: Set(None),
            date_joined: Set(now),
            last_login: Set(Some(now)),
        }
        .insert(db)
        .await?;

        let row = open_session(db, &account.id).await?;

        info!("Registered {} as {:?}", user.email, user.user_type);
        self.activate(Session {
            token: row.id,
            account_id: account.id,
            user,
        })
        .await
    }

    /// Ends the current session.
    ///
    /// Local state and the persisted token are cleared even when the store cannot
    /// delete the session row; that error is still returned.
    #[instrument(skip(self, db))]
    pub async fn logout<C>(&mut self, db: &C) -> Result<()>
    where
        C: ConnectionTrait,
    {
        let Some(session) = self.current.take() else {
            return Ok(());
        };
        self.forget_token().await;

        SessionEntity::delete_by_id(session.token.as_str())
            .exec(db)
            .await?;
        info!("Logged out {}", session.user.email);
        Ok(())
    }

    /// Updates the logged-in user's profile and refreshes the held copy.
    pub async fn update_profile<C>(&mut self, db: &C, changes: ProfileUpdate) -> Result<&user::Model>
    where
        C: ConnectionTrait,
    {
        let session = self.require()?;
        let account_id = session.account_id.clone();
        let profile = User::find_by_id(session.user.id.as_str())
            .one(db)
            .await?
            .ok_or(Error::ProfileNotFound { account_id })?;

        let mut active: user::ActiveModel = profile.into();
        if let Some(full_name) = changes.full_name {
            require_text("full name", &full_name)?;
            active.full_name = Set(full_name.trim().to_string());
        }
        if let Some(phone_number) = changes.phone_number {
            active.phone_number = Set(Some(phone_number));
        }
        if let Some(employee_id) = changes.employee_id {
            active.employee_id = Set(Some(employee_id));
        }
        if let Some(avatar) = changes.avatar {
            active.avatar = Set(Some(avatar));
        }
        let updated = active.update(db).await?;

        let session = self.current.as_mut().ok_or(Error::NotAuthenticated)?;
        session.user = updated;
        Ok(&session.user)
    }
}
