//! Profile set type definitions

use indexmap::IndexMap;
use tracing::info;

use crate::error::{CredsError, Result};

/// Name of the profile that tools pick up when none is specified
pub const DEFAULT_PROFILE: &str = "default";

/// Attributes of a single profile, in file order
pub type ProfileAttributes = IndexMap<String, String>;

/// All profiles of a credentials file, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileSet {
    profiles: IndexMap<String, ProfileAttributes>,
}

impl ProfileSet {
    /// Create an empty profile set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a profile's attributes by name
    pub fn get(&self, name: &str) -> Option<&ProfileAttributes> {
        self.profiles.get(name)
    }

    /// Get a profile's attributes mutably, creating an empty profile if absent
    pub fn entry(&mut self, name: &str) -> &mut ProfileAttributes {
        self.profiles.entry(name.to_string()).or_default()
    }

    /// Insert or replace a profile, returning the previous attributes.
    ///
    /// A replaced profile keeps its position in the set.
    pub fn insert(&mut self, name: impl Into<String>, attributes: ProfileAttributes) -> Option<ProfileAttributes> {
        self.profiles.insert(name.into(), attributes)
    }

    /// Remove a profile, preserving the order of the remaining ones
    pub fn remove(&mut self, name: &str) -> Option<ProfileAttributes> {
        self.profiles.shift_remove(name)
    }

    /// Check whether a profile exists
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Profile names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Profiles that can be promoted to the default profile
    pub fn selectable(&self) -> Vec<String> {
        self.names()
            .filter(|name| *name != DEFAULT_PROFILE)
            .map(str::to_string)
            .collect()
    }

    /// Iterate over profiles in file order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileAttributes)> {
        self.profiles.iter().map(|(name, attrs)| (name.as_str(), attrs))
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the set has no profiles
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Copy a profile's attributes into the default profile.
    ///
    /// The set is left untouched when `name` is unknown or is the default
    /// profile itself.
    pub fn set_active(&mut self, name: &str) -> Result<()> {
        let attributes = match self.profiles.get(name) {
            Some(attrs) if name != DEFAULT_PROFILE => attrs.clone(),
            _ => {
                return Err(CredsError::ProfileNotFound {
                    name: name.to_string(),
                    available: self.selectable(),
                })
            }
        };

        self.profiles.insert(DEFAULT_PROFILE.to_string(), attributes);
        info!("Profile {} is now the default", name);
        Ok(())
    }
}

impl FromIterator<(String, ProfileAttributes)> for ProfileSet {
    fn from_iter<I: IntoIterator<Item = (String, ProfileAttributes)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}
