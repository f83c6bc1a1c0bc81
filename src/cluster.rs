//! Fuzzy clustering of company names
//!
//! Groups distinct company names that likely denote the same organization.
//! The similarity graph is never materialized: an inverted token index
//! restricts each name's candidates to names sharing at least one token, and
//! connected components are walked with an explicit stack.
//!
//! Known limitation: two names with no token in common are never compared,
//! even when one is a substring of the other (e.g. "tech" and "fintech").
//! This keeps the work near-linear on real contact lists.

use crate::org_normalizer::{NameForm, TokenSet};
use crate::similarity::MatchThresholds;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// A group of names judged to be the same organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    /// Member with the highest occurrence count
    pub canonical_name: String,
    /// Sum of member occurrence counts
    pub total_count: u64,
    /// Every member, in discovery order, starting with the seed
    pub aliases: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.aliases.iter().any(|alias| alias == name)
    }
}

/// Result of one clustering run.
#[derive(Debug, Clone, Default)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
    /// canonical name -> index into `clusters`
    by_canonical: HashMap<String, usize>,
    /// member name -> canonical name
    canonical_by_alias: HashMap<String, String>,
}

impl ClusterSet {
    fn push(&mut self, cluster: Cluster) {
        let idx = self.clusters.len();
        for alias in &cluster.aliases {
            self.canonical_by_alias
                .insert(alias.clone(), cluster.canonical_name.clone());
        }
        self.by_canonical.insert(cluster.canonical_name.clone(), idx);
        self.clusters.push(cluster);
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Clusters in the order their seeds appeared in the input.
    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    /// Cluster whose canonical name is `canonical`.
    pub fn get(&self, canonical: &str) -> Option<&Cluster> {
        self.by_canonical.get(canonical).map(|&idx| &self.clusters[idx])
    }

    /// Canonical name of the cluster containing `alias`.
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.canonical_by_alias.get(alias).map(String::as_str)
    }

    /// Cluster containing `alias`.
    pub fn cluster_of(&self, alias: &str) -> Option<&Cluster> {
        self.canonical_for(alias).and_then(|canonical| self.get(canonical))
    }

    pub fn canonical_by_alias(&self) -> &HashMap<String, String> {
        &self.canonical_by_alias
    }

    /// Clusters by descending total count, canonical name breaking ties.
    pub fn ranked(&self) -> Vec<&Cluster> {
        let mut ranked: Vec<&Cluster> = self.clusters.iter().collect();
        ranked.sort_by(|a, b| {
            b.total_count
                .cmp(&a.total_count)
                .then_with(|| a.canonical_name.cmp(&b.canonical_name))
        });
        ranked
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }
}

/// token -> indices of names containing it, ascending
struct TokenIndex<'a> {
    postings: HashMap<&'a str, Vec<usize>>,
}

impl<'a> TokenIndex<'a> {
    fn build(forms: &'a [NameForm]) -> Self {
        let mut postings: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (idx, form) in forms.iter().enumerate() {
            for token in &form.tokens {
                postings.entry(token.as_str()).or_default().push(idx);
            }
        }
        Self { postings }
    }

    /// Every name sharing at least one token with `tokens`, in input order.
    fn candidates(&self, tokens: &TokenSet) -> BTreeSet<usize> {
        tokens
            .iter()
            .filter_map(|token| self.postings.get(token.as_str()))
            .flatten()
            .copied()
            .collect()
    }
}

/// Partitions names into clusters of the same organization.
#[derive(Debug, Clone, Default)]
pub struct ClusterBuilder {
    thresholds: MatchThresholds,
}

impl ClusterBuilder {
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// Cluster `names` using `counts` for canonical selection.
    ///
    /// Duplicate names are folded to their first occurrence and a name
    /// missing from `counts` counts as zero. Every distinct input name ends up
    /// in exactly one cluster. The canonical name is the member with the
    /// strictly highest count; on ties the earlier choice (starting with the
    /// seed) is kept.
    pub fn build<S: AsRef<str>>(&self, names: &[S], counts: &HashMap<String, u64>) -> ClusterSet {
        let mut seen: HashSet<&str> = HashSet::new();
        let names: Vec<&str> = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(*name))
            .collect();

        let mut result = ClusterSet::default();
        if names.is_empty() {
            return result;
        }

        let count_of = |idx: usize| counts.get(names[idx]).copied().unwrap_or(0);

        let forms: Vec<NameForm> = names.iter().map(|&name| NameForm::new(name)).collect();
        let index = TokenIndex::build(&forms);
        let mut visited = vec![false; names.len()];
        let mut comparisons = 0usize;

        for seed in 0..names.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;

            let mut canonical = seed;
            let mut canonical_count = count_of(seed);
            let mut members: Vec<usize> = Vec::new();
            let mut stack = vec![seed];

            while let Some(cur) = stack.pop() {
                members.push(cur);

                for candidate in index.candidates(&forms[cur].tokens) {
                    if visited[candidate] || candidate == cur {
                        continue;
                    }
                    comparisons += 1;
                    if !self.thresholds.matches(&forms[cur], &forms[candidate]) {
                        continue;
                    }

                    debug!("'{}' joins cluster seeded by '{}'", names[candidate], names[seed]);
                    visited[candidate] = true;
                    stack.push(candidate);

                    let candidate_count = count_of(candidate);
                    if candidate_count > canonical_count {
                        canonical = candidate;
                        canonical_count = candidate_count;
                    }
                }
            }

            let total_count = members.iter().map(|&idx| count_of(idx)).sum();
            result.push(Cluster {
                canonical_name: names[canonical].to_string(),
                total_count,
                aliases: members.iter().map(|&idx| names[idx].to_string()).collect(),
            });
        }

        info!(
            "Clustered {} names into {} clusters ({} comparisons)",
            names.len(),
            result.len(),
            comparisons
        );
        result
    }
}

/// Cluster names with the default thresholds.
pub fn build_clusters<S: AsRef<str>>(names: &[S], counts: &HashMap<String, u64>) -> ClusterSet {
    ClusterBuilder::default().build(names, counts)
}
