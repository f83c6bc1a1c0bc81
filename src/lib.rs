//! Company-name entity resolution for professional-network contact exports.
//!
//! Job titles are mined for a company, normalized, folded through a curated
//! alias dictionary, and the remaining variants are clustered by token
//! similarity.

pub mod alias_table;
pub mod analysis;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod contacts;
pub mod export;
pub mod extractor;
pub mod logger;
pub mod org_normalizer;
pub mod resolver;
pub mod roles;
pub mod similarity;

pub use alias_table::{AliasEntry, AliasResolver, AliasTable};
pub use analysis::CompanyAnalysis;
pub use cluster::{build_clusters, Cluster, ClusterBuilder, ClusterSet};
pub use config::{AppConfig, ConfigError};
pub use extractor::{CompanyExtractor, ExtractionRule};
pub use org_normalizer::{normalize, tokenize, TokenSet};
pub use resolver::CompanyResolver;
pub use roles::{classify_area, classify_seniority, RoleArea, RoleBreakdown, Seniority};
pub use similarity::{is_similar, similarity, MatchKind, MatchThresholds};
