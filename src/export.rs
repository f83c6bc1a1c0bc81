use crate::analysis::CompanyAnalysis;
use crate::contacts::ContactRecord;
use crate::roles::RoleBreakdown;
use anyhow::{Context, Result};
use clap::ValueEnum;
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Output format for company reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyReportRow {
    pub rank: usize,
    pub canonical_name: String,
    pub total_count: u64,
    pub alias_count: usize,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_records: usize,
    pub records_with_company: usize,
    pub distinct_names: usize,
    pub clusters: usize,
}

/// Count of records in one role area or seniority level
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyReport {
    pub summary: ReportSummary,
    pub companies: Vec<CompanyReportRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<CategoryCount>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub seniorities: Vec<CategoryCount>,
}

impl CompanyReport {
    /// Top `top_n` clusters of an analysis.
    pub fn from_analysis(analysis: &CompanyAnalysis, top_n: usize) -> Self {
        let companies = analysis
            .top_companies(top_n)
            .into_iter()
            .enumerate()
            .map(|(i, cluster)| CompanyReportRow {
                rank: i + 1,
                canonical_name: cluster.canonical_name.clone(),
                total_count: cluster.total_count,
                alias_count: cluster.len(),
                aliases: cluster.aliases.clone(),
            })
            .collect();

        Self {
            summary: ReportSummary {
                total_records: analysis.total_records(),
                records_with_company: analysis.records_with_company(),
                distinct_names: analysis.names().len(),
                clusters: analysis.clusters().len(),
            },
            companies,
            roles: Vec::new(),
            seniorities: Vec::new(),
        }
    }

    /// Attach role area and seniority counts.
    pub fn with_roles(mut self, breakdown: &RoleBreakdown) -> Self {
        self.roles = breakdown
            .area_counts()
            .into_iter()
            .map(|(area, count)| CategoryCount {
                label: area.label().to_string(),
                count,
            })
            .collect();
        self.seniorities = breakdown
            .seniority_counts()
            .into_iter()
            .map(|(level, count)| CategoryCount {
                label: level.label().to_string(),
                count,
            })
            .collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}

pub fn write_csv<W: Write>(report: &CompanyReport, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    wtr.write_record(["rank", "canonical", "total_count", "alias_count", "aliases"])?;
    for row in &report.companies {
        wtr.write_record([
            row.rank.to_string(),
            row.canonical_name.clone(),
            row.total_count.to_string(),
            row.alias_count.to_string(),
            row.aliases.join("; "),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(report: &CompanyReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_table<W: Write>(report: &CompanyReport, mut writer: W) -> Result<()> {
    let summary = &report.summary;
    writeln!(writer, "=== Company Summary ===")?;
    writeln!(writer, "Records analyzed: {}", summary.total_records)?;
    writeln!(writer, "Records with a company: {}", summary.records_with_company)?;
    writeln!(writer, "Distinct company names: {}", summary.distinct_names)?;
    writeln!(writer, "Company clusters: {}", summary.clusters)?;

    if report.is_empty() {
        writeln!(writer, "\nNo companies found.")?;
        return Ok(());
    }

    let name_width = report
        .companies
        .iter()
        .map(|row| row.canonical_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Company".len());

    writeln!(writer)?;
    writeln!(writer, "{:>4}  {:<name_width$}  {:>6}  Aliases", "#", "Company", "Count")?;
    for row in &report.companies {
        writeln!(
            writer,
            "{:>4}  {:<name_width$}  {:>6}  {}",
            row.rank,
            row.canonical_name,
            row.total_count,
            row.aliases.join(", ")
        )?;
    }

    write_categories(&mut writer, "Roles", &report.roles)?;
    write_categories(&mut writer, "Seniority", &report.seniorities)?;
    Ok(())
}

fn write_categories<W: Write>(writer: &mut W, heading: &str, rows: &[CategoryCount]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let label_width = rows.iter().map(|r| r.label.chars().count()).max().unwrap_or(0);
    writeln!(writer, "\n=== {} ===", heading)?;
    for row in rows {
        writeln!(writer, "{:<label_width$}  {:>6}", row.label, row.count)?;
    }
    Ok(())
}

/// Write `report` in `format` to `writer`.
pub fn write_report<W: Write>(
    report: &CompanyReport,
    format: ReportFormat,
    writer: W,
) -> Result<()> {
    match format {
        ReportFormat::Table => write_table(report, writer),
        ReportFormat::Csv => write_csv(report, writer),
        ReportFormat::Json => write_json(report, writer),
    }
}

/// Write `report` to a file.
pub fn export_report(
    report: &CompanyReport,
    format: ReportFormat,
    output_path: &Path,
) -> Result<()> {
    debug!(
        "Exporting {} companies as {:?} to {}",
        report.companies.len(),
        format,
        output_path.display()
    );

    let file = create_output(output_path)?;
    write_report(report, format, file)?;

    info!("Exported {} companies to {}", report.companies.len(), output_path.display());
    Ok(())
}

fn create_output(output_path: &Path) -> Result<File> {
    File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))
}

/// One person in a member listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberRow {
    pub name: String,
    pub title: String,
    /// Every column of the source row
    pub fields: BTreeMap<String, String>,
}

/// People whose company resolved to one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReport {
    pub company: String,
    pub members: Vec<MemberRow>,
}

impl MemberReport {
    /// Rows of `records` at `indices`; indices out of range are ignored.
    pub fn from_records(company: &str, records: &[ContactRecord], indices: &[usize]) -> Self {
        let members = indices
            .iter()
            .filter_map(|&idx| records.get(idx))
            .map(|record| MemberRow {
                name: record.display_name().unwrap_or_default(),
                title: record.title.clone().unwrap_or_default(),
                fields: record.fields.clone(),
            })
            .collect();

        Self {
            company: company.to_string(),
            members,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Source columns across all members, first appearance order, minus
    /// the ones already written as `name` and `title`.
    fn extra_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for member in &self.members {
            for key in member.fields.keys() {
                let reserved =
                    key.eq_ignore_ascii_case("name") || key.eq_ignore_ascii_case("title");
                if !reserved && !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
        columns
    }
}

pub fn write_members_csv<W: Write>(report: &MemberReport, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    let extra = report.extra_columns();

    let mut header = vec!["name", "title"];
    header.extend(extra.iter().copied());
    wtr.write_record(&header)?;

    for member in &report.members {
        let mut record = vec![member.name.as_str(), member.title.as_str()];
        record.extend(
            extra
                .iter()
                .map(|column| member.fields.get(*column).map(String::as_str).unwrap_or("")),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_members_json<W: Write>(report: &MemberReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_members_table<W: Write>(report: &MemberReport, mut writer: W) -> Result<()> {
    writeln!(writer, "=== People at {} ({}) ===", report.company, report.members.len())?;
    for member in &report.members {
        if member.name.is_empty() {
            writeln!(writer, "- {}", member.title)?;
        } else {
            writeln!(writer, "- {}: {}", member.name, member.title)?;
        }
    }
    Ok(())
}

/// Write a member listing in `format` to `writer`.
pub fn write_member_report<W: Write>(
    report: &MemberReport,
    format: ReportFormat,
    writer: W,
) -> Result<()> {
    match format {
        ReportFormat::Table => write_members_table(report, writer),
        ReportFormat::Csv => write_members_csv(report, writer),
        ReportFormat::Json => write_members_json(report, writer),
    }
}

/// Write a member listing to a file.
pub fn export_member_report(
    report: &MemberReport,
    format: ReportFormat,
    output_path: &Path,
) -> Result<()> {
    let file = create_output(output_path)?;
    write_member_report(report, format, file)?;

    info!(
        "Exported {} people at {} to {}",
        report.members.len(),
        report.company,
        output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::CompanyResolver;
    use tempfile::TempDir;

    fn sample_report() -> CompanyReport {
        let analysis = CompanyAnalysis::from_titles(
            &CompanyResolver::builtin().unwrap(),
            [
                "Engineer at Google Brazil",
                "PM @ Google",
                "Dev at Acme Widgets",
                "Dev at Acme Widgets Ltda",
                "",
            ],
        );
        CompanyReport::from_analysis(&analysis, 20)
    }

    fn render(report: &CompanyReport, format: ReportFormat) -> String {
        let mut buf = Vec::new();
        write_report(report, format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_report_rows() {
        let report = sample_report();
        assert_eq!(report.summary.total_records, 5);
        assert_eq!(report.summary.records_with_company, 4);
        assert_eq!(report.companies.len(), 2);
        // tie on count 2: alphabetical
        assert_eq!(report.companies[0].canonical_name, "acme widgets");
        assert_eq!(report.companies[0].alias_count, 2);
        assert_eq!(report.companies[1].canonical_name, "google");
        assert_eq!(report.companies[1].rank, 2);
    }

    #[test]
    fn test_top_n_truncates() {
        let analysis = CompanyAnalysis::from_titles(
            &CompanyResolver::builtin().unwrap(),
            ["Dev at Vale", "Dev at Natura", "Dev at Ambev"],
        );
        let report = CompanyReport::from_analysis(&analysis, 2);
        assert_eq!(report.companies.len(), 2);
        assert_eq!(report.summary.clusters, 3);
    }

    #[test]
    fn test_csv_output() {
        let out = render(&sample_report(), ReportFormat::Csv);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("rank,canonical,total_count,alias_count,aliases"));
        assert_eq!(lines.next(), Some("1,acme widgets,2,2,acme widgets; acme widgets ltda"));
        assert_eq!(lines.next(), Some("2,google,2,1,google"));
    }

    #[test]
    fn test_json_output() {
        let out = render(&sample_report(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["summary"]["clusters"], 2);
        assert_eq!(value["companies"][1]["canonical_name"], "google");
    }

    #[test]
    fn test_table_output() {
        let out = render(&sample_report(), ReportFormat::Table);
        assert!(out.contains("Records analyzed: 5"));
        assert!(out.contains("acme widgets"));
    }

    #[test]
    fn test_table_empty() {
        let resolver = CompanyResolver::builtin().unwrap();
        let analysis = CompanyAnalysis::from_titles(&resolver, Vec::<String>::new());
        let out = render(&CompanyReport::from_analysis(&analysis, 20), ReportFormat::Table);
        assert!(out.contains("No companies found."));
    }

    // =========================================================================
    // Tests for role sections
    // =========================================================================

    fn report_with_roles() -> CompanyReport {
        let titles = [
            "Senior Software Engineer at Google",
            "Sales Manager at Google",
            "Head of Sales at Acme Widgets",
            "Backend Developer at Acme Widgets",
        ];
        let analysis = CompanyAnalysis::from_titles(&CompanyResolver::builtin().unwrap(), titles);
        CompanyReport::from_analysis(&analysis, 20).with_roles(&RoleBreakdown::from_titles(titles))
    }

    #[test]
    fn test_role_sections_in_table() {
        let out = render(&report_with_roles(), ReportFormat::Table);
        assert!(out.contains("=== Roles ==="));
        assert!(out.contains("=== Seniority ==="));
        let seniority = out.split("=== Seniority ===").nth(1).unwrap();
        let manager = seniority.find("Manager").unwrap();
        let senior = seniority.find("Senior").unwrap();
        assert!(manager < senior, "levels are listed most senior first");
    }

    #[test]
    fn test_role_sections_in_json() {
        let out = render(&report_with_roles(), ReportFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["roles"][0]["label"], "Technology");
        assert_eq!(value["roles"][0]["count"], 2);
        assert_eq!(value["seniorities"][0]["label"], "Manager");
        assert_eq!(value["seniorities"][0]["count"], 2);
    }

    #[test]
    fn test_role_sections_omitted_without_breakdown() {
        let out = render(&sample_report(), ReportFormat::Json);
        assert!(!out.contains("\"roles\""));
        assert!(!render(&sample_report(), ReportFormat::Table).contains("=== Roles ==="));
    }

    // =========================================================================
    // Tests for member listings
    // =========================================================================

    fn sample_members() -> MemberReport {
        let records = crate::contacts::parse_contacts_csv(
            "First Name,Last Name,Position,Email\n\
             Ana,Silva,Engineer at Google,ana@x.com\n\
             Bruno,,PM at Nubank,\n\
             ,,Data Scientist at Google,\n",
            None,
        )
        .unwrap();
        MemberReport::from_records("google", &records, &[0, 2, 99])
    }

    #[test]
    fn test_member_rows() {
        let report = sample_members();
        assert_eq!(report.members.len(), 2);
        assert_eq!(report.members[0].name, "Ana Silva");
        assert_eq!(report.members[1].name, "");
        assert_eq!(report.members[1].title, "Data Scientist at Google");
    }

    #[test]
    fn test_members_csv_output() {
        let mut buf = Vec::new();
        write_member_report(&sample_members(), ReportFormat::Csv, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("name,title,Email,First Name,Last Name,Position"));
        assert_eq!(
            lines.next(),
            Some("Ana Silva,Engineer at Google,ana@x.com,Ana,Silva,Engineer at Google")
        );
        assert_eq!(
            lines.next(),
            Some(",Data Scientist at Google,,,,Data Scientist at Google")
        );
    }

    #[test]
    fn test_members_json_and_table_output() {
        let mut buf = Vec::new();
        write_member_report(&sample_members(), ReportFormat::Json, &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["company"], "google");
        assert_eq!(value["members"][0]["fields"]["Email"], "ana@x.com");

        let mut buf = Vec::new();
        write_member_report(&sample_members(), ReportFormat::Table, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("=== People at google (2) ==="));
        assert!(out.contains("- Ana Silva: Engineer at Google"));
        assert!(out.contains("- Data Scientist at Google"));
    }

    #[test]
    fn test_export_members_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.csv");
        export_member_report(&sample_members(), ReportFormat::Csv, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("name,title,"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        export_report(&sample_report(), ReportFormat::Json, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"companies\""));
    }
}
