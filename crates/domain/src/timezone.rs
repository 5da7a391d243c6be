use chrono_tz::Tz;
use std::{collections::HashMap, sync::RwLock};
use thiserror::Error;

/// Identifier used when a user has no timezone or an unusable one
pub const DEFAULT_TIMEZONE: &str = "UTC";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimezoneError {
    #[error("Invalid timezone: `{0}`. Please use a valid IANA timezone identifier.")]
    InvalidTimezone(String),
}

/// Resolves IANA identifiers to `Tz` handles and remembers them.
///
/// Entries are never evicted. The cache can hold at most one entry per
/// IANA name so it stays small. Two callers resolving the same identifier
/// concurrently both insert the same value, which is harmless.
#[derive(Debug)]
pub struct TimezoneRegistry {
    cache: RwLock<HashMap<String, Tz>>,
    /// Used for users without a usable timezone
    default: (String, Tz),
}

impl TimezoneRegistry {
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            default: (DEFAULT_TIMEZONE.to_string(), Tz::UTC),
        }
    }

    /// A registry falling back to `identifier` instead of `DEFAULT_TIMEZONE`
    pub fn with_default(identifier: &str) -> Result<Self, TimezoneError> {
        let tz = identifier
            .parse::<Tz>()
            .map_err(|_| TimezoneError::InvalidTimezone(identifier.to_string()))?;
        Ok(Self {
            default: (identifier.to_string(), tz),
            ..Self::new()
        })
    }

    pub fn default_timezone(&self) -> &str {
        &self.default.0
    }

    pub fn resolve(&self, identifier: &str) -> Result<Tz, TimezoneError> {
        if let Some(tz) = self.cached(identifier) {
            return Ok(tz);
        }

        let tz = identifier
            .parse::<Tz>()
            .map_err(|_| TimezoneError::InvalidTimezone(identifier.to_string()))?;

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(identifier.to_string(), tz);
        }
        Ok(tz)
    }

    /// Resolves `identifier` and falls back to the registry's default
    /// timezone when it is absent or invalid
    pub fn resolve_or_default(&self, identifier: Option<&str>) -> (String, Tz) {
        match identifier.map(|id| (id, self.resolve(id))) {
            Some((id, Ok(tz))) => (id.to_string(), tz),
            _ => self.default.clone(),
        }
    }

    pub fn is_valid(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_ok()
    }

    pub fn len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cached(&self, identifier: &str) -> Option<Tz> {
        self.cache
            .read()
            .ok()
            .and_then(|cache| cache.get(identifier).copied())
    }
}

impl Default for TimezoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Every identifier accepted by `TimezoneRegistry::resolve`
pub fn valid_timezones() -> Vec<&'static str> {
    chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect()
}
