use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::contract::model::{NewUserAccount, Principal, UserAccount, UserAccountPatch};
use crate::domain::clock::Clock;
use crate::domain::error::DomainError;
use crate::domain::repo::UsersRepository;

/// User account administration and login sessions. Account mutations require
/// elevated privilege; login and token resolution are open.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UsersRepository>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UsersRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { users, clock }
    }

    /// Verify credentials and issue a bearer token for the session.
    #[instrument(name = "reservations.accounts.login", skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Uuid, UserAccount), DomainError> {
        let found = self
            .users
            .find_by_username(username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let (user, stored_digest) = found.ok_or(DomainError::InvalidCredentials)?;
        if digest_password(password) != stored_digest {
            return Err(DomainError::InvalidCredentials);
        }

        let token = Uuid::new_v4();
        self.users
            .insert_session(token, user.id, self.clock.now())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Issued session token for user id={}", user.id);
        Ok((token, user))
    }

    /// Resolve a bearer token into the acting principal, if the session is live.
    #[instrument(name = "reservations.accounts.principal_for_token", skip_all)]
    pub async fn principal_for_token(
        &self,
        token: Uuid,
    ) -> Result<Option<Principal>, DomainError> {
        let user = self
            .users
            .find_session_user(token)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        Ok(user.map(|u| Principal {
            user_id: u.id,
            is_admin: u.is_admin,
        }))
    }

    #[instrument(name = "reservations.accounts.get", skip(self), fields(user_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<UserAccount, DomainError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    #[instrument(name = "reservations.accounts.list", skip(self))]
    pub async fn list(&self, principal: &Principal) -> Result<Vec<UserAccount>, DomainError> {
        require_admin(principal)?;
        debug!("Listing user accounts");
        self.users
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(
        name = "reservations.accounts.create",
        skip(self, new_user),
        fields(username = %new_user.username)
    )]
    pub async fn create(
        &self,
        new_user: NewUserAccount,
        principal: &Principal,
    ) -> Result<UserAccount, DomainError> {
        info!("Creating user account");
        require_admin(principal)?;
        validate_username(&new_user.username)?;
        validate_password(&new_user.password)?;

        if self
            .users
            .username_exists(&new_user.username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            return Err(DomainError::username_taken(new_user.username));
        }

        let user = UserAccount {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            is_admin: new_user.is_admin,
            created_at: self.clock.now(),
        };

        self.users
            .insert(user.clone(), digest_password(&new_user.password))
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully created user with id={}", user.id);
        Ok(user)
    }

    #[instrument(name = "reservations.accounts.update", skip(self, patch), fields(user_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: UserAccountPatch,
        principal: &Principal,
    ) -> Result<UserAccount, DomainError> {
        info!("Updating user account");
        require_admin(principal)?;

        let mut current = self.get(id).await?;

        if let Some(ref username) = patch.username {
            validate_username(username)?;
            if username != &current.username
                && self
                    .users
                    .username_exists(username)
                    .await
                    .map_err(|e| DomainError::database(e.to_string()))?
            {
                return Err(DomainError::username_taken(username.clone()));
            }
            current.username = username.clone();
        }
        if let Some(email) = patch.email {
            current.email = email;
        }
        if let Some(is_admin) = patch.is_admin {
            current.is_admin = is_admin;
        }

        let new_digest = match patch.password {
            Some(ref password) => {
                validate_password(password)?;
                Some(digest_password(password))
            }
            None => None,
        };

        self.users
            .update(current.clone(), new_digest)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Successfully updated user");
        Ok(current)
    }

    /// Deletes the account and, by cascade, its sessions and reservations.
    #[instrument(name = "reservations.accounts.delete", skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: Uuid, principal: &Principal) -> Result<(), DomainError> {
        info!("Deleting user account");
        require_admin(principal)?;

        let deleted = self
            .users
            .delete(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            return Err(DomainError::user_not_found(id));
        }

        info!("Successfully deleted user");
        Ok(())
    }

    /// Create the configured administrator account when it does not exist
    /// yet. Called once at startup; a live deployment needs at least one
    /// elevated account to manage rooms and users.
    #[instrument(name = "reservations.accounts.ensure_admin", skip(self, password))]
    pub async fn ensure_admin(&self, username: &str, password: &str) -> Result<(), DomainError> {
        validate_username(username)?;
        validate_password(password)?;

        if self
            .users
            .username_exists(username)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
        {
            debug!("Admin account already present");
            return Ok(());
        }

        let user = UserAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: String::new(),
            is_admin: true,
            created_at: self.clock.now(),
        };
        self.users
            .insert(user, digest_password(password))
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Created bootstrap admin account '{}'", username);
        Ok(())
    }
}

fn require_admin(principal: &Principal) -> Result<(), DomainError> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

fn validate_username(username: &str) -> Result<(), DomainError> {
    if username.trim().is_empty() {
        return Err(DomainError::validation("username", "cannot be empty"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.is_empty() {
        return Err(DomainError::validation("password", "cannot be empty"));
    }
    Ok(())
}

/// SHA-256 hex digest of a password.
pub fn digest_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}
