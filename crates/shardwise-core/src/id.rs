//! Strongly-typed identifiers.
//!
//! Caches are addressed by `CollectionId`, never by raw strings or integers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::hash::hash_str;

macro_rules! new_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(v: u64) -> Self {
                Self(v)
            }
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

new_id!(CollectionId);

impl CollectionId {
    /// Stable id derived from the collection name. The same name maps to the
    /// same id across catalogs, designs and runs.
    pub fn for_name(name: &str) -> Self {
        Self(hash_str(name).prefix_u64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_derived_from_name() {
        assert_eq!(CollectionId::for_name("users"), CollectionId::for_name("users"));
        assert_ne!(CollectionId::for_name("users"), CollectionId::for_name("posts"));
    }
}
