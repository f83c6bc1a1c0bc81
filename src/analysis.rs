//! Company breakdown of a set of contact titles
//!
//! Each title is resolved to a company once; the distinct names are
//! counted and clustered, and the result answers:
//! - which companies are most represented (ranked by cluster total)
//! - which records belong to a given company

use crate::cluster::{Cluster, ClusterSet};
use crate::resolver::CompanyResolver;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct CompanyAnalysis {
    /// Resolved company per record, empty when none
    companies: Vec<String>,
    /// Distinct non-empty companies in first-seen order
    names: Vec<String>,
    counts: HashMap<String, u64>,
    clusters: ClusterSet,
}

impl CompanyAnalysis {
    /// Resolve every title and cluster the resulting names.
    pub fn from_titles<I>(resolver: &CompanyResolver, titles: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut companies = Vec::new();
        let mut names = Vec::new();
        let mut counts: HashMap<String, u64> = HashMap::new();

        for title in titles {
            let company = resolver.extract_company(title.as_ref());
            if !company.is_empty() {
                let count = counts.entry(company.clone()).or_insert(0);
                if *count == 0 {
                    names.push(company.clone());
                }
                *count += 1;
            }
            companies.push(company);
        }

        let clusters = resolver.build_clusters(&names, &counts);
        info!(
            "Analyzed {} records: {} with a company, {} distinct names, {} clusters",
            companies.len(),
            companies.iter().filter(|c| !c.is_empty()).count(),
            names.len(),
            clusters.len()
        );

        Self {
            companies,
            names,
            counts,
            clusters,
        }
    }

    pub fn total_records(&self) -> usize {
        self.companies.len()
    }

    pub fn records_with_company(&self) -> usize {
        self.companies.iter().filter(|c| !c.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Distinct resolved names, first-seen order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    pub fn clusters(&self) -> &ClusterSet {
        &self.clusters
    }

    /// Resolved company of record `idx`, before clustering.
    pub fn company_of(&self, idx: usize) -> Option<&str> {
        self.companies
            .get(idx)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    /// Cluster canonical name of record `idx`.
    pub fn canonical_of(&self, idx: usize) -> Option<&str> {
        self.company_of(idx)
            .and_then(|company| self.clusters.canonical_for(company))
    }

    /// Up to `n` clusters, largest first.
    pub fn top_companies(&self, n: usize) -> Vec<&Cluster> {
        let mut ranked = self.clusters.ranked();
        ranked.truncate(n);
        ranked
    }

    pub fn most_represented(&self) -> Option<&Cluster> {
        self.clusters.ranked().into_iter().next()
    }

    /// Indices of the records whose company falls in the cluster named
    /// `canonical`, in record order.
    pub fn members_of(&self, canonical: &str) -> Vec<usize> {
        (0..self.companies.len())
            .filter(|&idx| self.canonical_of(idx) == Some(canonical))
            .collect()
    }
}
