//! Admin credential - the single shared admin login

use serde::{Deserialize, Serialize};

/// The single stored admin credential
///
/// The password is stored and compared in plaintext; see DESIGN.md for why
/// this is flagged rather than changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

impl AdminCredential {
    /// Compare a submitted username/password pair against the stored credential
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}
