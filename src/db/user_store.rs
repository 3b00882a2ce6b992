//! Flat-text store of user accounts, one record per line in `users.txt`.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::codec;
use crate::auth;
use crate::models::{ActivityLevel, Gender, User};

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("I/O error for {0}: {1}")]
    Io(PathBuf, #[source] io::Error),
    #[error("user already exists: {0}")]
    UserExists(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("invalid username: must be 3-20 letters, digits or underscores")]
    InvalidUsername,
    #[error("weak password: need 8+ characters with upper, lower, digit and special")]
    WeakPassword,
    #[error("invalid username or password")]
    BadCredentials,
}

pub struct UserStore {
    path: PathBuf,
    users: BTreeMap<String, User>,
}

impl UserStore {
    /// Opens the store; a missing file starts with no users.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, UserStoreError> {
        let path = path.into();
        let mut users = BTreeMap::new();

        match fs::read_to_string(&path) {
            Ok(contents) => {
                for (i, line) in contents.lines().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    match codec::decode_user(line, i + 1) {
                        Ok(user) => {
                            users.insert(user.username.clone(), user);
                        }
                        Err(e) => {
                            tracing::warn!(
                                "{}: skipping malformed user record: {}",
                                path.display(),
                                e
                            );
                        }
                    }
                }
                tracing::debug!("loaded {} user(s)", users.len());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no users file at {}, starting fresh", path.display());
            }
            Err(e) => return Err(UserStoreError::Io(path, e)),
        }

        Ok(Self { path, users })
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    /// Validates credentials, hashes the password and persists the new user.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        username: &str,
        password: &str,
        gender: Gender,
        height: f64,
        age: u32,
        weight: f64,
        activity_level: ActivityLevel,
    ) -> Result<&User, UserStoreError> {
        if !auth::is_valid_username(username) {
            return Err(UserStoreError::InvalidUsername);
        }
        if !auth::is_valid_password(password) {
            return Err(UserStoreError::WeakPassword);
        }
        if self.users.contains_key(username) {
            return Err(UserStoreError::UserExists(username.to_string()));
        }

        let user = User {
            username: username.to_string(),
            password_hash: auth::hash_password(password),
            gender,
            height,
            age,
            weight,
            activity_level,
        };
        self.users.insert(username.to_string(), user);
        self.save()?;
        Ok(&self.users[username])
    }

    /// Verifies a password against the stored hash.
    pub fn login(&self, username: &str, password: &str) -> Result<&User, UserStoreError> {
        self.users
            .get(username)
            .filter(|user| auth::verify_password(password, &user.password_hash))
            .ok_or(UserStoreError::BadCredentials)
    }

    pub fn update_profile(
        &mut self,
        username: &str,
        height: f64,
        age: u32,
        weight: f64,
        activity_level: ActivityLevel,
    ) -> Result<(), UserStoreError> {
        let user = self
            .users
            .get_mut(username)
            .ok_or_else(|| UserStoreError::UserNotFound(username.to_string()))?;
        user.update_profile(height, age, weight, activity_level);
        self.save()
    }

    /// Writes all users, sorted by username.
    pub fn save(&self) -> Result<(), UserStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| UserStoreError::Io(parent.to_path_buf(), e))?;
        }
        let mut contents = String::new();
        for user in self.users.values() {
            let _ = writeln!(contents, "{}", codec::encode_user(user));
        }
        fs::write(&self.path, contents).map_err(|e| UserStoreError::Io(self.path.clone(), e))
    }
}
