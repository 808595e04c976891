// handlers/auth/mod.rs - session and account endpoints
//
// Login and logout are the only handlers that touch the session cookie.
// Login, logout, register and the password-reset pair run without a session;
// everything else requires one.

pub mod account;  // GET /api/auth/user, GET /api/auth/session, /api/auth/update-profile, POST /api/auth/register
pub mod login;    // POST /api/auth/login
pub mod logout;   // POST /api/auth/logout
pub mod password; // change-password, reset-password/request, reset-password/confirm

pub use account::{register, session_status, update_profile, user};
pub use login::login;
pub use logout::logout;
pub use password::{change_password, reset_password_confirm, reset_password_request};

// Upstream endpoints, relative to the configured base URL
pub const LOGIN_PATH: &str = "auth/login/";
pub const LOGOUT_PATH: &str = "auth/logout/";
pub const REGISTER_PATH: &str = "auth/register/";
pub const USER_PATH: &str = crate::upstream::CURRENT_USER_PATH;
pub const UPDATE_PROFILE_PATH: &str = "auth/update-profile/";
pub const CHANGE_PASSWORD_PATH: &str = "auth/change-password/";
pub const RESET_REQUEST_PATH: &str = "auth/reset-password/request/";
pub const RESET_CONFIRM_PATH: &str = "auth/reset-password/confirm/";
