//! Company extraction from free-text job titles
//!
//! A title such as `"Software Engineer at Google Brazil | Ex-Nubank"` carries
//! the employer somewhere in the text. Extraction runs an ordered list of
//! regex rules against the lower-cased title; the first rule that matches
//! wins and its capture group, trimmed, is the raw company string.
//!
//! The built-in rules mix English and Portuguese connectors:
//! - `at <company>` up to the next `|` or `,`
//! - `@ <company>` up to the next `|` or `,`
//! - text after the last `|`
//! - `em <company>` up to the next `|` or `,`
//! - `na <company>` up to the next `|` or `,`
//!
//! Rules can be replaced from configuration to support other locales.

use crate::config::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

fn default_group() -> usize {
    1
}

/// One extraction pattern as it appears in configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractionRule {
    /// Short label used in logs and error messages
    pub name: String,
    /// Regex applied to the lower-cased title
    pub pattern: String,
    /// Lower values are tried first
    pub priority: u32,
    /// Capture group holding the company
    #[serde(default = "default_group")]
    pub group: usize,
}

impl ExtractionRule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, priority: u32) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            priority,
            group: default_group(),
        }
    }

    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    /// The built-in rule set, in priority order.
    pub fn defaults() -> Vec<ExtractionRule> {
        vec![
            Self::new("at", r"\bat\s+([^|,]+)", 10),
            Self::new("at-sign", r"@\s*([^|,]+)", 20),
            Self::new("last-pipe", r"\|\s*([^|]+)$", 30),
            Self::new("em", r"\bem\s+([^|,]+)", 40),
            Self::new("na", r"\bna\s+([^|,]+)", 50),
        ]
    }

    /// Compile the pattern and check that the capture group exists.
    fn compile(&self) -> Result<CompiledRule, ConfigError> {
        let regex = Regex::new(&self.pattern).map_err(|e| ConfigError::InvalidRegex {
            pattern_name: format!("extraction.rules.{}", self.name),
            pattern: self.pattern.clone(),
            error: e.to_string(),
        })?;

        // captures_len() counts the implicit group 0
        let available = regex.captures_len() - 1;
        if self.group == 0 || self.group > available {
            return Err(ConfigError::InvalidCaptureGroup {
                rule: self.name.clone(),
                group: self.group,
                available,
            });
        }

        Ok(CompiledRule {
            name: self.name.clone(),
            regex,
            group: self.group,
        })
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    name: String,
    regex: Regex,
    group: usize,
}

/// Applies extraction rules in priority order.
#[derive(Debug, Clone)]
pub struct CompanyExtractor {
    rules: Vec<CompiledRule>,
}

impl Default for CompanyExtractor {
    fn default() -> Self {
        Self::new(&ExtractionRule::defaults()).expect("built-in extraction rules must compile")
    }
}

impl CompanyExtractor {
    /// Compile `rules`. Ties in priority keep their given order.
    pub fn new(rules: &[ExtractionRule]) -> Result<Self, ConfigError> {
        let mut ordered: Vec<&ExtractionRule> = rules.iter().collect();
        ordered.sort_by_key(|rule| rule.priority);

        let rules = ordered
            .into_iter()
            .map(ExtractionRule::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Rule names in the order they are tried.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    /// Extract the raw company string from a title.
    ///
    /// Returns an empty string when the title is empty or no rule matches.
    pub fn extract(&self, title: &str) -> String {
        self.extract_with_rule(title)
            .map(|(_, company)| company)
            .unwrap_or_default()
    }

    /// Like [`extract`](Self::extract), also naming the rule that fired.
    ///
    /// The first matching rule wins even if its capture trims to nothing.
    pub fn extract_with_rule(&self, title: &str) -> Option<(&str, String)> {
        if title.trim().is_empty() {
            return None;
        }

        let lower = title.to_lowercase();
        for rule in &self.rules {
            if let Some(captures) = rule.regex.captures(&lower) {
                let company = captures
                    .get(rule.group)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default();
                debug!("Extracted '{}' from '{}' via rule '{}'", company, title, rule.name);
                return Some((rule.name.as_str(), company));
            }
        }

        None
    }
}
