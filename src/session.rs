//! Session provider - turns stored or freshly bootstrapped credentials into
//! an authenticated session.
//!
//! Policy: when no credentials exist, a random username/password pair is
//! generated and registered. Any register/login failure is terminal and
//! propagates as [`AuthError`] - there is no retry and no credential
//! guessing beyond the randomized bootstrap account.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::usdb::{UsdbClient, UsdbError};

/// An authenticated session: the cookie header plus the user it was
/// issued for.
#[derive(Debug, Clone)]
pub struct Session {
    pub cookie: String,
    pub user: String,
}

/// A stored login pair. Opaque to the rest of the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

/// Where credentials live between runs.
///
/// The core only depends on this trait; the CLI wires in the file-backed
/// implementation from [`crate::storage`].
pub trait CredentialStore: Send + Sync {
    /// Load stored credentials. Missing or unreadable data is `None`,
    /// which triggers the bootstrap path.
    fn load(&self) -> std::io::Result<Option<Credentials>>;

    /// Persist credentials for future sessions.
    fn save(&self, credentials: &Credentials) -> std::io::Result<()>;
}

/// Session establishment errors. All terminal - surfaced to the caller
/// without retry.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("registration failed: {0}")]
    Register(#[source] UsdbError),

    #[error("login failed: {0}")]
    Login(#[source] UsdbError),

    #[error("credential storage failed: {0}")]
    Store(#[from] std::io::Error),
}

/// Obtain an authenticated session, bootstrapping an account if needed.
pub async fn ensure_session(
    client: &UsdbClient,
    store: &dyn CredentialStore,
) -> Result<Session, AuthError> {
    let credentials = match store.load()? {
        Some(credentials) => credentials,
        None => {
            let credentials = Credentials {
                user: generate_username(),
                pass: generate_password(),
            };
            let email = format!("bounce+{}@gmail.com", credentials.user);

            tracing::info!(user = %credentials.user, "no stored credentials, registering a new account");
            client
                .register(&credentials.user, &credentials.pass, &email)
                .await
                .map_err(AuthError::Register)?;
            store.save(&credentials)?;
            credentials
        }
    };

    let cookie = client
        .login(&credentials.user, &credentials.pass)
        .await
        .map_err(AuthError::Login)?;

    Ok(Session {
        cookie,
        user: credentials.user,
    })
}

/// `user-{6 lowercase alphanumerics}-{4 digits}`
pub fn generate_username() -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();

    let random: String = (0..6)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect();
    let suffix: u32 = rng.random_range(0..10_000);

    format!("user-{random}-{suffix:04}")
}

/// 14 characters from a fixed alphabet that avoids ambiguous glyphs.
pub fn generate_password() -> String {
    const CHARS: &[u8] =
        b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz0123456789!@#$%^&*()_+-=";
    let mut rng = rand::rng();

    (0..14)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_has_expected_shape() {
        let user = generate_username();
        let parts: Vec<&str> = user.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "user");
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 4);
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn password_is_fourteen_chars_from_the_alphabet() {
        let pass = generate_password();
        assert_eq!(pass.chars().count(), 14);
        for c in pass.chars() {
            assert!(
                "ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz0123456789!@#$%^&*()_+-="
                    .contains(c)
            );
        }
    }

    #[test]
    fn usernames_are_not_repeated() {
        // Collisions are astronomically unlikely; two draws differing is
        // enough to catch a broken RNG hookup.
        assert_ne!(generate_username(), generate_username());
    }
}
