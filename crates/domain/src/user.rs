use crate::{
    shared::entity::{Entity, ID},
    timezone::TimezoneRegistry,
};

/// The parts of a user profile this service cares about
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub email: String,
    pub name: String,
    /// IANA identifier chosen by the user, e.g. `Europe/Oslo`
    pub timezone: Option<String>,
}

impl User {
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            id: Default::default(),
            email: email.to_string(),
            name: name.to_string(),
            timezone: None,
        }
    }

    pub fn with_timezone(mut self, timezone: &str) -> Self {
        self.timezone = Some(timezone.to_string());
        self
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Timezone a user's records are presented in. Derived per request from the
/// profile and never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct UserTimeContext {
    pub user_id: ID,
    pub timezone: String,
}

impl UserTimeContext {
    /// Falls back to the default timezone when the profile has none or an
    /// invalid one
    pub fn for_user(user: &User, registry: &TimezoneRegistry) -> Self {
        let (timezone, _) = registry.resolve_or_default(user.timezone.as_deref());
        Self {
            user_id: user.id.clone(),
            timezone,
        }
    }
}
