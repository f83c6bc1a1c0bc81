//! Entry point tying extraction, alias resolution and clustering together.
//!
//! A [`CompanyResolver`] owns its rule set, alias dictionary and thresholds,
//! so several resolvers with different dictionaries can coexist.

use crate::alias_table::{AliasResolver, AliasTable};
use crate::cluster::{ClusterBuilder, ClusterSet};
use crate::config::{AppConfig, ConfigError};
use crate::extractor::CompanyExtractor;
use crate::org_normalizer::{strip_punctuation, NameForm};
use crate::similarity::{compare, MatchKind, MatchThresholds};
use std::collections::HashMap;
use tracing::debug;

/// Extracted names shorter than this are treated as noise.
pub const DEFAULT_MIN_NAME_LENGTH: usize = 3;

#[derive(Debug, Clone)]
pub struct CompanyResolver {
    extractor: CompanyExtractor,
    aliases: AliasResolver,
    thresholds: MatchThresholds,
    min_name_length: usize,
}

impl CompanyResolver {
    pub fn new(
        extractor: CompanyExtractor,
        aliases: AliasResolver,
        thresholds: MatchThresholds,
    ) -> Self {
        Self {
            extractor,
            aliases,
            thresholds,
            min_name_length: DEFAULT_MIN_NAME_LENGTH,
        }
    }

    pub fn with_min_name_length(mut self, min_name_length: usize) -> Self {
        self.min_name_length = min_name_length;
        self
    }

    /// Built-in rules, built-in dictionary, default thresholds.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self::new(
            CompanyExtractor::default(),
            AliasResolver::new(AliasTable::builtin()?),
            MatchThresholds::default(),
        ))
    }

    /// Build everything the configuration describes, loading the alias
    /// dictionary from disk when a path is set.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let extractor = config.extractor()?;
        let aliases = AliasResolver::new(config.alias_table()?);
        Ok(Self::new(extractor, aliases, config.matching.thresholds())
            .with_min_name_length(config.extraction.min_name_length))
    }

    /// Company for a job title: extracted, tidied, canonicalized.
    ///
    /// Returns an empty string when nothing usable was found.
    pub fn extract_company(&self, title: &str) -> String {
        let raw = self.extractor.extract(title);
        let cleaned = strip_punctuation(&raw);

        if cleaned.chars().count() < self.min_name_length {
            if !cleaned.is_empty() {
                debug!("Dropping short company '{}' from '{}'", cleaned, title);
            }
            return String::new();
        }

        match self.aliases.resolve(&cleaned) {
            Some(canonical) => canonical.to_string(),
            None => cleaned,
        }
    }

    /// Canonical dictionary name for `name`, if any.
    pub fn resolve_alias(&self, name: &str) -> Option<&str> {
        self.aliases.resolve(name)
    }

    pub fn compare(&self, a: &str, b: &str) -> MatchKind {
        compare(&NameForm::new(a), &NameForm::new(b))
    }

    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        self.compare(a, b).score()
    }

    /// Similarity predicate under this resolver's thresholds.
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        self.thresholds.is_similar(a, b)
    }

    pub fn build_clusters<S: AsRef<str>>(
        &self,
        names: &[S],
        counts: &HashMap<String, u64>,
    ) -> ClusterSet {
        ClusterBuilder::new(self.thresholds).build(names, counts)
    }

    pub fn extractor(&self) -> &CompanyExtractor {
        &self.extractor
    }

    pub fn aliases(&self) -> &AliasResolver {
        &self.aliases
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    pub fn min_name_length(&self) -> usize {
        self.min_name_length
    }
}
