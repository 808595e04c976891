pub mod session;

pub use session::{cleared_session_cookie, session_cookie, SessionToken, SESSION_COOKIE, SESSION_MAX_AGE_SECS};

use serde::{Deserialize, Serialize};

/// User-type code assigned by the healthcare API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Role::Patient),
            2 => Some(Role::Doctor),
            3 => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Role::Patient => 1,
            Role::Doctor => 2,
            Role::Admin => 3,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        };
        f.write_str(name)
    }
}

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Check a new password against the strength policy.
/// Returns the message for the first rule that fails.
pub fn validate_password_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        return Err("Password must contain at least one special character (!@#$%^&*)");
    }
    Ok(())
}
