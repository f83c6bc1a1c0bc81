//! Company alias dictionary and exact alias resolution
//!
//! The dictionary maps a canonical company name to the variants that should
//! be folded into it. It is a versioned, hand-curated TOML file:
//!
//! ```toml
//! version = "1.0.0"
//!
//! [[company]]
//! canonical = "bcg"
//! aliases = ["boston consulting group", "the boston consulting group"]
//! ```
//!
//! Resolution is exact after normalization. Fuzzy matching of names the
//! dictionary does not cover is left to the cluster builder.

use crate::config::ConfigError;
use crate::org_normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Path to the alias dictionary relative to working directory
pub const ALIASES_PATH: &str = "./config/company_aliases.toml";

/// Dictionary compiled into the binary
pub const BUILTIN_ALIASES: &str = include_str!("../config/company_aliases.toml");

fn default_version() -> String {
    "0.0.0".to_string()
}

/// One canonical name and its known variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasEntry {
    pub canonical: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl AliasEntry {
    pub fn new<I, S>(canonical: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            canonical: canonical.into(),
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

/// Alias dictionary in declaration order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasTable {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, rename = "company")]
    pub entries: Vec<AliasEntry>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            version: default_version(),
            entries: Vec::new(),
        }
    }
}

impl AliasTable {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    /// Append an entry; later entries lose conflicts to earlier ones.
    pub fn with_entry<I, S>(mut self, canonical: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.push(AliasEntry::new(canonical, aliases));
        self
    }

    /// The dictionary shipped with the crate
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(BUILTIN_ALIASES, Path::new("<built-in>"))
    }

    /// Load a dictionary file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let table = Self::parse(&content, path)?;
        info!(
            "Loaded {} alias entries from {} (version {})",
            table.len(),
            path.display(),
            table.version
        );
        Ok(table)
    }

    /// Parse dictionary text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<string>"))
    }

    fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let table: AliasTable =
            toml::from_str(content).map_err(|e| ConfigError::InvalidAliasFile {
                path: origin.to_path_buf(),
                error: e.to_string(),
            })?;
        table.validate(origin)?;
        Ok(table)
    }

    fn validate(&self, origin: &Path) -> Result<(), ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.canonical.trim().is_empty() {
                return Err(ConfigError::InvalidAliasFile {
                    path: PathBuf::from(origin),
                    error: format!("company[{}] has an empty canonical name", i),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }
}

/// Exact-match resolver over an [`AliasTable`].
///
/// Every canonical name and alias is normalized once at construction. The
/// lookup index keeps the first canonical seen for each normalized key, so
/// a variant accidentally listed under two entries resolves to the one
/// declared first.
#[derive(Debug, Clone)]
pub struct AliasResolver {
    table: AliasTable,
    /// normalized key -> index into `table.entries`
    index: HashMap<String, usize>,
}

impl AliasResolver {
    pub fn new(table: AliasTable) -> Self {
        let mut index: HashMap<String, usize> = HashMap::new();

        for (entry_idx, entry) in table.entries.iter().enumerate() {
            let variants = std::iter::once(&entry.canonical).chain(entry.aliases.iter());
            for variant in variants {
                let key = normalize(variant);
                if key.is_empty() {
                    debug!(
                        "Alias '{}' of '{}' normalizes to nothing, skipped",
                        variant, entry.canonical
                    );
                    continue;
                }
                match index.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(entry_idx);
                    }
                    Entry::Occupied(slot) => {
                        let owner = &table.entries[*slot.get()].canonical;
                        if *slot.get() != entry_idx {
                            warn!(
                                "Alias '{}' of '{}' collides with '{}' (key '{}'); keeping '{}'",
                                variant,
                                entry.canonical,
                                owner,
                                slot.key(),
                                owner
                            );
                        }
                    }
                }
            }
        }

        debug!("Alias resolver built: {} entries, {} keys", table.len(), index.len());
        Self { table, index }
    }

    /// Canonical name for `name`, or `None` when no variant matches exactly
    /// after normalization.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let key = normalize(name);
        if key.is_empty() {
            return None;
        }
        self.index
            .get(&key)
            .map(|&idx| self.table.entries[idx].canonical.as_str())
    }

    pub fn table(&self) -> &AliasTable {
        &self.table
    }

    /// Number of distinct normalized keys
    pub fn key_count(&self) -> usize {
        self.index.len()
    }
}

impl From<AliasTable> for AliasResolver {
    fn from(table: AliasTable) -> Self {
        Self::new(table)
    }
}
