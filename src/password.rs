//! Password strength checking and hashing.
//!
//! A raw password has to pass through [ValidatedPassword] (strength check)
//! before it can become a stored [PasswordHash] (bcrypt).

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that passed the strength check but has not been hashed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password` and wrap it if it is strong
    /// enough.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] for guessable passwords. The message carries
    /// the analyzer's suggestions for picking something stronger.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password, &[]);

        match analysis.score() {
            Score::Zero | Score::One | Score::Two => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
            _ => Ok(Self(raw_password.to_owned())),
        }
    }

    /// Wrap `raw_password` without checking its strength.
    ///
    /// Not `unsafe` despite the name: a weak password causes no memory
    /// unsafety, it just defeats the point of the check.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for ValidatedPassword {
    // Never print the actual password.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "********")
    }
}

/// A bcrypt password hash as stored in the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The recommended bcrypt cost. Tests use a lower cost to stay fast.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given bcrypt `cost`.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the hashing library fails.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap an existing hash string, e.g. one read back from the database.
    ///
    /// The caller is responsible for `raw_hash` actually being a bcrypt hash.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_owned())
    }

    /// Strength-check and hash a raw password in one step.
    ///
    /// Named instead of `FromStr` so it cannot be mistaken for parsing an
    /// existing hash.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        PasswordHash::new(ValidatedPassword::new(raw_password)?, cost)
    }

    /// Check whether `raw_password` matches this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}


#[cfg(test)]
mod password_hash_tests {
    use crate::password::{PasswordHash, ValidatedPassword};

    // Cost 4 is the bcrypt minimum, used here to keep the tests quick.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_verifies_its_own_password_and_rejects_others() {
        let hash = PasswordHash::new(
            ValidatedPassword::new_unchecked("pocketmoney"),
            TEST_COST,
        )
        .unwrap();

        assert!(hash.verify("pocketmoney").unwrap());
        assert!(!hash.verify("allowance").unwrap());
    }

    #[test]
    fn hashing_the_same_password_twice_gives_different_hashes() {
        let password = ValidatedPassword::new_unchecked("rainydayfund");

        let first = PasswordHash::new(password.clone(), TEST_COST).unwrap();
        let second = PasswordHash::new(password, TEST_COST).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn from_raw_password_applies_the_strength_check() {
        assert!(PasswordHash::from_raw_password("cash", TEST_COST).is_err());
        assert!(PasswordHash::from_raw_password("acouchfullofloosechange", TEST_COST).is_ok());
    }

    #[test]
    fn round_trips_through_the_stored_string() {
        let hash = PasswordHash::from_raw_password("acouchfullofloosechange", TEST_COST).unwrap();

        let restored = PasswordHash::new_unchecked(hash.as_ref());

        assert_eq!(restored, hash);
        assert!(restored.verify("acouchfullofloosechange").unwrap());
    }
}
