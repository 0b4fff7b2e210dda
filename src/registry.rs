//! Client identity resolution.
//!
//! The client registry itself lives in the wider practice-management system;
//! the engine only needs to map whatever name was typed onto the canonical
//! client name so that double-booking detection compares like with like.

use std::collections::HashMap;

pub trait ClientRegistry: Send + Sync {
    fn canonical_name(&self, raw: &str) -> String;
}

/// Uses names as typed, trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughRegistry;

impl ClientRegistry for PassthroughRegistry {
    fn canonical_name(&self, raw: &str) -> String {
        raw.trim().to_string()
    }
}

/// Resolves known aliases (case-insensitive) to a canonical name.
#[derive(Debug, Clone, Default)]
pub struct AliasRegistry {
    aliases: HashMap<String, String>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(aliases: &HashMap<String, String>) -> Self {
        let mut registry = Self::new();
        for (alias, canonical) in aliases {
            registry.insert(alias, canonical);
        }
        registry
    }

    pub fn insert(&mut self, alias: &str, canonical: &str) {
        self.aliases
            .insert(alias.trim().to_lowercase(), canonical.trim().to_string());
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl ClientRegistry for AliasRegistry {
    fn canonical_name(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        self.aliases
            .get(&trimmed.to_lowercase())
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }
}
