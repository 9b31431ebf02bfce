//! Account registration and credential verification.
//!
//! Passwords are hashed with Argon2id at registration; verification parses
//! the stored digest and checks the submitted plaintext against it. Unknown
//! usernames and wrong passwords produce the same unauthorised error so the
//! response does not reveal which accounts exist.

use std::sync::Arc;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};

use super::error::Error;
use super::ports::{UserPersistenceError, UserRepository};
use super::user::{LoginCredentials, SignupDraft, User};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        UserPersistenceError::Query { message } => Error::internal(message),
        UserPersistenceError::DuplicateUsername { username } => {
            Error::conflict(format!("username was registered concurrently: {username}"))
        }
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| Error::internal(format!("password hashing failed: {error}")))
}

fn password_matches(password: &str, stored_digest: &str) -> bool {
    PasswordHash::new(stored_digest)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Account service over the user repository.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
}

impl AccountService {
    /// Create a new service over the given repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account, storing only the password digest.
    ///
    /// A username that is already taken fails validation up front; losing an
    /// insert race against a concurrent registration surfaces the unique
    /// violation as a conflict instead.
    pub async fn register(&self, draft: &SignupDraft) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_username(draft.username().as_str())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(Error::invalid_request("username already registered"));
        }

        let digest = hash_password(draft.password())?;
        self.users
            .insert(draft.username(), &digest)
            .await
            .map_err(map_user_error)
    }

    /// Verify submitted credentials and return the matching user.
    pub async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_credentials)?;

        if password_matches(credentials.password(), &stored.hashed_password) {
            Ok(stored.user)
        } else {
            Err(invalid_credentials())
        }
    }

    /// Look up a user by username, e.g. to validate a token subject.
    pub async fn find_user(&self, username: &str) -> Result<Option<User>, Error> {
        Ok(self
            .users
            .find_by_username(username)
            .await
            .map_err(map_user_error)?
            .map(|stored| stored.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::UserRepository as _;
    use crate::outbound::memory::MemoryStore;

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryStore::new()))
    }

    fn signup(username: &str, password: &str) -> SignupDraft {
        SignupDraft::try_from_parts(username, password).expect("valid signup draft")
    }

    fn login(username: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(username, password).expect("valid credentials")
    }

    #[tokio::test]
    async fn registered_users_can_authenticate() {
        let service = service();
        let registered = service
            .register(&signup("reader42", "hunter22"))
            .await
            .expect("registration should succeed");

        let authenticated = service
            .authenticate(&login("reader42", "hunter22"))
            .await
            .expect("authentication should succeed");
        assert_eq!(authenticated, registered);
    }

    #[tokio::test]
    async fn wrong_passwords_are_unauthorised() {
        let service = service();
        service
            .register(&signup("reader42", "hunter22"))
            .await
            .expect("registration");

        let err = service
            .authenticate(&login("reader42", "wrong-password"))
            .await
            .expect_err("wrong password should fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn unknown_usernames_are_unauthorised() {
        let err = service()
            .authenticate(&login("ghost", "whatever-pass"))
            .await
            .expect_err("unknown user should fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn duplicate_registration_fails_validation() {
        let service = service();
        service
            .register(&signup("reader42", "hunter22"))
            .await
            .expect("first registration");

        let err = service
            .register(&signup("reader42", "other-pass"))
            .await
            .expect_err("duplicate registration should fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn stored_digest_is_not_the_plaintext() {
        let store = MemoryStore::new();
        let service = AccountService::new(Arc::new(store.clone()));
        service
            .register(&signup("reader42", "hunter22"))
            .await
            .expect("registration");

        let stored = store
            .find_by_username("reader42")
            .await
            .expect("lookup")
            .expect("stored user");
        assert_ne!(stored.hashed_password, "hunter22");
        assert!(stored.hashed_password.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn find_user_returns_the_public_identity() {
        let service = service();
        let registered = service
            .register(&signup("reader42", "hunter22"))
            .await
            .expect("registration");

        let found = service
            .find_user("reader42")
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(found, registered);
        assert!(service.find_user("ghost").await.expect("lookup").is_none());
    }
}
