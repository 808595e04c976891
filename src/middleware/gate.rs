//! Edge auth gate evaluated before any route resolves.
//!
//! Every request ends in one of three outcomes: it passes through, it is redirected
//! to `/login` (with the original path in `from`), or it is redirected to
//! `/unauthorized`. Failures never surface as an error body.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use url::form_urlencoded;

use crate::auth::{Role, SessionToken};
use crate::upstream::UpstreamClient;
use crate::AppState;

/// Pages reachable without a session (exact match or any sub-path)
pub const PUBLIC_ROUTES: &[&str] = &["/", "/about", "/login", "/register", "/contact", "/unauthorized"];

/// Endpoints that validate their own preconditions (exact match)
pub const BYPASS_ROUTES: &[&str] = &["/api/auth/login", "/api/auth/logout"];

/// API handlers check the session token themselves
pub const API_PREFIX: &str = "/api";

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleScope {
    pub prefix: &'static str,
    pub required: Role,
}

/// Role-scoped page prefixes, evaluated in order
pub const ROLE_SCOPES: &[RoleScope] = &[
    RoleScope { prefix: "/admin", required: Role::Admin },
    RoleScope { prefix: "/doctor", required: Role::Doctor },
    RoleScope { prefix: "/patient", required: Role::Patient },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Bypass,
    Api,
    Protected(Option<RoleScope>),
}

/// Per-request auth context handed to whatever runs behind the gate
#[derive(Debug, Clone, Default)]
pub struct GateContext {
    pub token: Option<SessionToken>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone)]
pub enum GateDecision {
    Allow(GateContext),
    RedirectToLogin { from: Option<String> },
    RedirectToUnauthorized,
}

fn matches_route(path: &str, route: &str) -> bool {
    if path == route {
        return true;
    }
    // "/" is only ever an exact match
    route != "/"
        && path
            .strip_prefix(route)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_ROUTES.iter().any(|route| matches_route(path, route)) {
        return RouteClass::Public;
    }
    if BYPASS_ROUTES.contains(&path) {
        return RouteClass::Bypass;
    }
    if matches_route(path, API_PREFIX) {
        return RouteClass::Api;
    }

    let scope = ROLE_SCOPES
        .iter()
        .find(|scope| matches_route(path, scope.prefix))
        .copied();
    RouteClass::Protected(scope)
}

pub async fn evaluate(upstream: &UpstreamClient, path: &str, token: Option<SessionToken>) -> GateDecision {
    let scope = match classify(path) {
        RouteClass::Public | RouteClass::Bypass | RouteClass::Api => {
            return GateDecision::Allow(GateContext { token, role: None });
        }
        RouteClass::Protected(scope) => scope,
    };

    let Some(token) = token else {
        return GateDecision::RedirectToLogin { from: Some(path.to_string()) };
    };

    let Some(scope) = scope else {
        return GateDecision::Allow(GateContext { token: Some(token), role: None });
    };

    match upstream.current_user(token.as_str()).await {
        Ok(user) if user.role == Some(scope.required) => GateDecision::Allow(GateContext {
            token: Some(token),
            role: user.role,
        }),
        Ok(user) => {
            tracing::info!(
                path,
                required = %scope.required,
                actual = ?user.role,
                "role mismatch, redirecting to unauthorized"
            );
            GateDecision::RedirectToUnauthorized
        }
        Err(e) => {
            tracing::warn!(path, "role check failed, redirecting to login: {}", e);
            GateDecision::RedirectToLogin { from: None }
        }
    }
}

pub fn login_redirect_target(from: Option<&str>) -> String {
    match from {
        Some(from) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("from", from)
                .finish();
            format!("{}?{}", LOGIN_PATH, query)
        }
        None => LOGIN_PATH.to_string(),
    }
}

/// Middleware wrapping the whole router (fallback included)
pub async fn edge_gate(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    match evaluate(&state.upstream, &path, SessionToken::from_jar(&jar)).await {
        GateDecision::Allow(context) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        GateDecision::RedirectToLogin { from } => {
            Redirect::temporary(&login_redirect_target(from.as_deref())).into_response()
        }
        GateDecision::RedirectToUnauthorized => Redirect::temporary(UNAUTHORIZED_PATH).into_response(),
    }
}
