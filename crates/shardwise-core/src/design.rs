//! Candidate physical designs.
//!
//! A `Design` maps collection names to a `Placement`. It is treated as an
//! immutable value once handed to the cost model: the model keeps its own copy
//! of the last evaluated design and diffs new candidates against it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{DesignError, Result};
use crate::hash::{hash_serde, Hash256};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    #[serde(default)]
    pub shard_key: Vec<String>,
    #[serde(default)]
    pub indexes: BTreeSet<Vec<String>>,
    #[serde(default)]
    pub denormalization_parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Design {
    placements: BTreeMap<String, Placement>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collection with an empty placement (unsharded, no indexes).
    pub fn add_collection(&mut self, name: impl Into<String>) {
        self.placements.entry(name.into()).or_default();
    }

    pub fn remove_collection(&mut self, name: &str) -> Option<Placement> {
        self.placements.remove(name)
    }

    pub fn add_shard_key<I, S>(&mut self, name: &str, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let placement = self.placements.entry(name.to_string()).or_default();
        placement.shard_key = fields.into_iter().map(Into::into).collect();
    }

    pub fn add_index<I, S>(&mut self, name: &str, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let placement = self.placements.entry(name.to_string()).or_default();
        placement
            .indexes
            .insert(fields.into_iter().map(Into::into).collect());
    }

    pub fn set_denormalization_parent(&mut self, name: &str, parent: Option<&str>) {
        let placement = self.placements.entry(name.to_string()).or_default();
        placement.denormalization_parent = parent.map(str::to_string);
    }

    pub fn placement(&self, name: &str) -> Option<&Placement> {
        self.placements.get(name)
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.placements.contains_key(name)
    }

    /// Collection names in name order.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.placements.keys().map(String::as_str)
    }

    pub fn shard_key(&self, name: &str) -> &[String] {
        self.placements
            .get(name)
            .map(|p| p.shard_key.as_slice())
            .unwrap_or(&[])
    }

    pub fn indexes(&self, name: &str) -> Option<&BTreeSet<Vec<String>>> {
        self.placements.get(name).map(|p| &p.indexes)
    }

    pub fn denormalization_parent(&self, name: &str) -> Option<&str> {
        self.placements
            .get(name)
            .and_then(|p| p.denormalization_parent.as_deref())
    }

    pub fn is_denormalized(&self, name: &str) -> bool {
        self.denormalization_parent(name).is_some()
    }

    /// Top-most ancestor of a denormalized collection, `None` if `name` is
    /// not denormalized or the chain loops.
    pub fn denormalization_root(&self, name: &str) -> Option<&str> {
        let mut current = self.denormalization_parent(name)?;
        let mut hops = 0;
        while let Some(next) = self.denormalization_parent(current) {
            hops += 1;
            if hops > self.placements.len() {
                return None;
            }
            current = next;
        }
        Some(current)
    }

    /// `child -> parent` for every denormalized collection.
    pub fn denormalization_map(&self) -> BTreeMap<String, String> {
        self.placements
            .iter()
            .filter_map(|(name, p)| {
                p.denormalization_parent
                    .as_ref()
                    .map(|parent| (name.clone(), parent.clone()))
            })
            .collect()
    }

    /// Collections whose placement differs from `previous`, including ones
    /// present in only one of the two designs. With no previous design every
    /// collection is in the delta.
    pub fn delta_collections(&self, previous: Option<&Design>) -> BTreeSet<String> {
        let Some(previous) = previous else {
            return self.placements.keys().cloned().collect();
        };
        let mut delta: BTreeSet<String> = self
            .placements
            .iter()
            .filter(|(name, p)| previous.placements.get(*name) != Some(*p))
            .map(|(name, _)| name.clone())
            .collect();
        delta.extend(
            previous
                .placements
                .keys()
                .filter(|name| !self.placements.contains_key(*name))
                .cloned(),
        );
        delta
    }

    /// Check the design against the catalog: every collection, shard-key field,
    /// index field and parent must exist, every parent must itself be part of
    /// the design, and denormalization must be acyclic.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        for (name, placement) in &self.placements {
            let collection = catalog
                .get(name)
                .ok_or_else(|| DesignError::UnknownCollection(name.clone()))?;

            for field in &placement.shard_key {
                if !collection.has_field(field) {
                    return Err(DesignError::UnknownField {
                        collection: name.clone(),
                        field: field.clone(),
                        role: "shard key",
                    }
                    .into());
                }
            }
            for field in placement.indexes.iter().flatten() {
                if !collection.has_field(field) {
                    return Err(DesignError::UnknownField {
                        collection: name.clone(),
                        field: field.clone(),
                        role: "index",
                    }
                    .into());
                }
            }

            if let Some(parent) = &placement.denormalization_parent {
                if parent == name {
                    return Err(DesignError::SelfParent(name.clone()).into());
                }
                if !catalog.contains(parent) {
                    return Err(DesignError::UnknownParent {
                        collection: name.clone(),
                        parent: parent.clone(),
                    }
                    .into());
                }
                // Embedded operations are scored on the parent, so it must be placed too.
                if !self.placements.contains_key(parent) {
                    return Err(DesignError::ParentNotInDesign {
                        collection: name.clone(),
                        parent: parent.clone(),
                    }
                    .into());
                }
            }
        }

        for name in self.placements.keys() {
            let mut seen = BTreeSet::new();
            seen.insert(name.as_str());
            let mut current = name.as_str();
            while let Some(parent) = self.denormalization_parent(current) {
                if !seen.insert(parent) {
                    return Err(DesignError::DenormalizationCycle(name.clone()).into());
                }
                current = parent;
            }
        }
        Ok(())
    }

    /// Stable digest of the whole design (for logs and dedup).
    pub fn fingerprint(&self) -> Result<Hash256> {
        hash_serde(&self.placements)
    }
}

impl std::fmt::Display for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, p) in &self.placements {
            write!(f, "{name}: shard_key={:?}", p.shard_key)?;
            if !p.indexes.is_empty() {
                write!(f, " indexes={:?}", p.indexes)?;
            }
            if let Some(parent) = &p.denormalization_parent {
                write!(f, " embedded_in={parent}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
