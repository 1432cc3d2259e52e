//! Role-based visibility: a resolved role snapshot and the bookkeeping a
//! provider needs to drop answers that arrive too late.

use futures::future::{self, LocalBoxFuture};
use std::cell::Cell;
use std::rc::Rc;
use thiserror::Error;

/// One role or a set of roles a piece of UI is visible to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedRoles {
    One(String),
    Any(Vec<String>),
}

impl AllowedRoles {
    pub fn contains(&self, role: &str) -> bool {
        match self {
            AllowedRoles::One(allowed) => allowed == role,
            AllowedRoles::Any(allowed) => allowed.iter().any(|allowed| allowed == role),
        }
    }
}

impl From<&str> for AllowedRoles {
    fn from(value: &str) -> Self {
        AllowedRoles::One(value.to_owned())
    }
}

impl From<String> for AllowedRoles {
    fn from(value: String) -> Self {
        AllowedRoles::One(value)
    }
}

impl<const N: usize> From<[&str; N]> for AllowedRoles {
    fn from(value: [&str; N]) -> Self {
        AllowedRoles::Any(value.iter().map(|role| role.to_string()).collect())
    }
}

impl From<Vec<String>> for AllowedRoles {
    fn from(value: Vec<String>) -> Self {
        AllowedRoles::Any(value)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthorizationError {
    #[error("use_authorization must be used within an AuthorizationProvider")]
    MissingProvider,
}

/// The role snapshot every check under one provider reads from.
///
/// `roles` is `None` until resolution finishes; nothing is granted before that.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Authorization {
    roles: Option<Rc<[String]>>,
}

impl Authorization {
    pub fn pending() -> Self {
        Self { roles: None }
    }

    pub fn resolved<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: Some(roles.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.roles.is_none()
    }

    pub fn roles(&self) -> &[String] {
        self.roles.as_deref().unwrap_or_default()
    }

    pub fn has_role(&self, allowed: &AllowedRoles) -> bool {
        self.roles
            .as_deref()
            .is_some_and(|roles| roles.iter().any(|role| allowed.contains(role)))
    }

    /// Turns an optional context lookup into an authorization, failing when
    /// there is no provider above the caller.
    pub fn from_context(context: Option<Self>) -> Result<Self, AuthorizationError> {
        context.ok_or(AuthorizationError::MissingProvider)
    }
}

pub type RoleFuture = LocalBoxFuture<'static, anyhow::Result<Vec<String>>>;

/// A role source that is already known.
pub fn roles_ready(roles: Vec<String>) -> RoleFuture {
    Box::pin(future::ready(Ok(roles)))
}

/// Awaits a role source. A failed lookup denies everything instead of surfacing.
pub async fn resolve_roles(source: RoleFuture) -> Authorization {
    match source.await {
        Ok(roles) => Authorization::resolved(roles),
        Err(err) => {
            tracing::warn!("role lookup failed, denying access: {err:#}");
            Authorization::resolved(Vec::<String>::new())
        }
    }
}

/// Hands out a ticket per role lookup. Only the latest ticket is accepted, and
/// none once the owner is torn down.
#[derive(Debug, Default)]
pub struct RoleGate {
    generation: Cell<u64>,
    torn_down: Cell<bool>,
}

impl RoleGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        let ticket = self.generation.get() + 1;
        self.generation.set(ticket);
        ticket
    }

    pub fn accepts(&self, ticket: u64) -> bool {
        !self.torn_down.get() && self.generation.get() == ticket
    }

    pub fn teardown(&self) {
        self.torn_down.set(true);
    }
}
