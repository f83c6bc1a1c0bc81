//! Role area and seniority classification of job titles
//!
//! Both classifiers are ordered keyword rule sets run against the
//! lower-cased title; the first rule that matches decides, so a title that
//! mentions several areas lands in the earliest one:
//! - "Sales Engineer" is Technology (Technology is tried before Sales)
//! - "Senior Engineering Manager" is Manager (Manager is tried before Senior)
//!
//! Titles matching no rule are left unclassified.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Functional area of a role, in the order the rules are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RoleArea {
    Technology,
    Sales,
    Marketing,
    Product,
    #[serde(rename = "HR/People")]
    HrPeople,
    Finance,
    Operations,
    Design,
    Legal,
}

impl RoleArea {
    pub const ALL: [RoleArea; 9] = [
        RoleArea::Technology,
        RoleArea::Sales,
        RoleArea::Marketing,
        RoleArea::Product,
        RoleArea::HrPeople,
        RoleArea::Finance,
        RoleArea::Operations,
        RoleArea::Design,
        RoleArea::Legal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoleArea::Technology => "Technology",
            RoleArea::Sales => "Sales",
            RoleArea::Marketing => "Marketing",
            RoleArea::Product => "Product",
            RoleArea::HrPeople => "HR/People",
            RoleArea::Finance => "Finance",
            RoleArea::Operations => "Operations",
            RoleArea::Design => "Design",
            RoleArea::Legal => "Legal",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            RoleArea::Technology => &[
                "developer",
                "engineer",
                "tech",
                "software",
                "data",
                "ai",
                "machine learning",
                "devops",
                "frontend",
                "backend",
            ],
            RoleArea::Sales => &["sales", "vendas", "business development", "bd"],
            RoleArea::Marketing => &["marketing", "growth", "digital marketing"],
            RoleArea::Product => &["product", "produto"],
            RoleArea::HrPeople => &[
                "hr",
                "people",
                "human resources",
                "recursos humanos",
                "talent",
            ],
            RoleArea::Finance => &["finance", "financial", "accounting", "controller"],
            RoleArea::Operations => &["operations", "ops", "operational"],
            RoleArea::Design => &["design", "ux", "ui", "designer"],
            RoleArea::Legal => &["legal", "lawyer", "advogado"],
        }
    }
}

impl fmt::Display for RoleArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Seniority level, from most to least senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Seniority {
    #[serde(rename = "C-Level")]
    CLevel,
    #[serde(rename = "Director/VP")]
    DirectorVp,
    Manager,
    Lead,
    Senior,
    Junior,
    Intern,
}

impl Seniority {
    pub const ALL: [Seniority; 7] = [
        Seniority::CLevel,
        Seniority::DirectorVp,
        Seniority::Manager,
        Seniority::Lead,
        Seniority::Senior,
        Seniority::Junior,
        Seniority::Intern,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Seniority::CLevel => "C-Level",
            Seniority::DirectorVp => "Director/VP",
            Seniority::Manager => "Manager",
            Seniority::Lead => "Lead",
            Seniority::Senior => "Senior",
            Seniority::Junior => "Junior",
            Seniority::Intern => "Intern",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Seniority::CLevel => &["ceo", "cto", "cfo", "coo", "cmo", "cpo", "chro", "ciso"],
            Seniority::DirectorVp => &["director", "vice president", "vp"],
            Seniority::Manager => &["manager", "gerente", "head"],
            Seniority::Lead => &["lead"],
            Seniority::Senior => &["senior", "sênior", "sr"],
            Seniority::Junior => &["junior", "jr"],
            Seniority::Intern => &["intern", "estagiário", "trainee"],
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn keyword_regex(words: &[&str]) -> Regex {
    let alternation = words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{})\b", alternation)).unwrap()
}

static AREA_RULES: Lazy<Vec<(RoleArea, Regex)>> = Lazy::new(|| {
    RoleArea::ALL
        .iter()
        .map(|area| (*area, keyword_regex(area.keywords())))
        .collect()
});

static SENIORITY_RULES: Lazy<Vec<(Seniority, Regex)>> = Lazy::new(|| {
    Seniority::ALL
        .iter()
        .map(|level| (*level, keyword_regex(level.keywords())))
        .collect()
});

fn first_match<T: Copy>(rules: &[(T, Regex)], title: &str) -> Option<T> {
    if title.trim().is_empty() {
        return None;
    }
    let lower = title.to_lowercase();
    rules
        .iter()
        .find(|(_, regex)| regex.is_match(&lower))
        .map(|(label, _)| *label)
}

/// Functional area of a title, if any rule matches.
pub fn classify_area(title: &str) -> Option<RoleArea> {
    first_match(AREA_RULES.as_slice(), title)
}

/// Seniority of a title, if any rule matches.
pub fn classify_seniority(title: &str) -> Option<Seniority> {
    first_match(SENIORITY_RULES.as_slice(), title)
}

/// Area and seniority of every record in a contact set.
#[derive(Debug, Clone, Default)]
pub struct RoleBreakdown {
    areas: Vec<Option<RoleArea>>,
    seniorities: Vec<Option<Seniority>>,
}

impl RoleBreakdown {
    pub fn from_titles<I>(titles: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut areas = Vec::new();
        let mut seniorities = Vec::new();
        for title in titles {
            let title = title.as_ref();
            areas.push(classify_area(title));
            seniorities.push(classify_seniority(title));
        }

        debug!(
            "Classified {} titles: {} with an area, {} with a seniority",
            areas.len(),
            areas.iter().flatten().count(),
            seniorities.iter().flatten().count()
        );
        Self { areas, seniorities }
    }

    pub fn total_records(&self) -> usize {
        self.areas.len()
    }

    pub fn area_of(&self, idx: usize) -> Option<RoleArea> {
        self.areas.get(idx).copied().flatten()
    }

    pub fn seniority_of(&self, idx: usize) -> Option<Seniority> {
        self.seniorities.get(idx).copied().flatten()
    }

    /// Areas present, largest first; ties keep rule order.
    pub fn area_counts(&self) -> Vec<(RoleArea, usize)> {
        let mut counts: Vec<(RoleArea, usize)> = tally(&self.areas).into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Seniority levels present, from most to least senior.
    pub fn seniority_counts(&self) -> Vec<(Seniority, usize)> {
        tally(&self.seniorities).into_iter().collect()
    }

    pub fn members_of_area(&self, area: RoleArea) -> Vec<usize> {
        members(&self.areas, area)
    }

    pub fn members_of_seniority(&self, level: Seniority) -> Vec<usize> {
        members(&self.seniorities, level)
    }
}

fn tally<T: Copy + Ord>(labels: &[Option<T>]) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for label in labels.iter().flatten() {
        *counts.entry(*label).or_insert(0) += 1;
    }
    counts
}

fn members<T: Copy + PartialEq>(labels: &[Option<T>], wanted: T) -> Vec<usize> {
    labels
        .iter()
        .enumerate()
        .filter(|(_, label)| **label == Some(wanted))
        .map(|(idx, _)| idx)
        .collect()
}
