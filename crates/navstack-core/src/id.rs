#![forbid(unsafe_code)]

//! Stable identifiers for panels, templates, and routing keys.

use std::borrow::Borrow;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Arena identifier for a panel node.
///
/// `0` is reserved so identifiers are always non-zero. Ids are never reused
/// within one navigator, which keeps a destroyed use-once instance from
/// aliasing a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct PanelId(u64);

impl PanelId {
    /// Lowest valid panel id.
    pub const MIN: Self = Self(1);

    /// Wrap a raw value, rejecting 0.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// The following id, or `None` on overflow.
    #[must_use]
    pub const fn checked_next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(next) => Some(Self(next)),
            None => None,
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panel#{}", self.0)
    }
}

/// Opaque identity of a panel template.
///
/// Every registered panel is its own template. Use-once instances carry the
/// template id of the panel they were instantiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct TemplateId(u64);

impl TemplateId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template#{}", self.0)
    }
}

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
        pub struct $name(String);

        impl $name {
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_key!(
    /// Routing key naming a navigation root on the command bus.
    RootKey
);

string_key!(
    /// Routing key naming a panel registered under a navigation root.
    PanelKey
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn zero_is_rejected() {
        assert_eq!(PanelId::from_raw(0), None);
        assert_eq!(PanelId::from_raw(7).map(PanelId::get), Some(7));
    }

    #[test]
    fn checked_next_stops_at_overflow() {
        assert_eq!(PanelId::MIN.checked_next(), PanelId::from_raw(2));
        let last = PanelId::from_raw(u64::MAX).unwrap();
        assert_eq!(last.checked_next(), None);
    }

    #[test]
    fn keys_look_up_by_str() {
        let mut map = HashMap::new();
        map.insert(PanelKey::new("settings"), 3u32);
        assert_eq!(map.get("settings"), Some(&3));
        assert_eq!(RootKey::from("hud").to_string(), "hud");
    }

    #[test]
    fn display_is_prefixed() {
        assert_eq!(PanelId::MIN.to_string(), "panel#1");
        assert_eq!(TemplateId::new(4).to_string(), "template#4");
    }
}
