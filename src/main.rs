use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use orgcluster::analysis::CompanyAnalysis;
use orgcluster::cli::{Cli, Commands};
use orgcluster::config::AppConfig;
use orgcluster::contacts::{load_contacts, ContactRecord};
use orgcluster::export::{
    export_member_report, export_report, write_member_report, write_report, CompanyReport,
    MemberReport, ReportFormat,
};
use orgcluster::logger::{self, VerbosityLevel};
use orgcluster::org_normalizer::normalize;
use orgcluster::resolver::CompanyResolver;
use orgcluster::roles::RoleBreakdown;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(VerbosityLevel::from_flags(cli.verbose, cli.quiet));

    // Handle --init flag first (before any other processing)
    if cli.init {
        let result = match &cli.config {
            Some(path) => AppConfig::create_default_config_at(path),
            None => AppConfig::create_default_config(),
        };
        match result {
            Ok(path) => {
                println!("✅ Created default configuration file at: {}", path.display());
                println!("   Edit this file to customize settings, then run orgcluster again.");
                return Ok(());
            }
            Err(e) => {
                eprintln!("❌ Failed to create configuration file: {}", e);
                std::process::exit(1);
            }
        }
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Run 'orgcluster --init' to create a default configuration file.");
            std::process::exit(1);
        }
    };
    let resolver =
        CompanyResolver::from_config(&config).context("Failed to build company resolver")?;

    match command {
        Commands::Analyze {
            files,
            title_column,
            top,
            format,
            output,
            members,
        } => run_analyze(
            &resolver,
            &files,
            title_column.as_deref(),
            top.unwrap_or(config.report.top_n),
            format,
            output.as_deref(),
            members.as_deref(),
        ),
        Commands::Extract { titles } => run_extract(&resolver, &titles),
        Commands::Compare { a, b } => run_compare(&resolver, &a, &b),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, orgcluster::config::ConfigError> {
    match path {
        Some(path) => AppConfig::load_from_path(path),
        None => AppConfig::load_or_default(),
    }
}

fn run_analyze(
    resolver: &CompanyResolver,
    files: &[PathBuf],
    title_column: Option<&str>,
    top_n: usize,
    format: ReportFormat,
    output: Option<&Path>,
    members: Option<&str>,
) -> Result<()> {
    let records = load_contacts(files, title_column)?;
    let analysis = CompanyAnalysis::from_titles(resolver, titles_of(&records));

    if analysis.is_empty() {
        println!(
            "No data: no company could be extracted from {} contact(s).",
            records.len()
        );
        return Ok(());
    }

    // A member listing replaces the company report
    if let Some(company) = members {
        return export_members(resolver, &analysis, &records, company, format, output);
    }

    let roles = RoleBreakdown::from_titles(titles_of(&records));
    let report = CompanyReport::from_analysis(&analysis, top_n).with_roles(&roles);
    match output {
        Some(path) => {
            export_report(&report, format, path)?;
            println!("✅ Report written to {}", path.display());
        }
        None => write_report(&report, format, io::stdout().lock())?,
    }

    Ok(())
}

fn titles_of(records: &[ContactRecord]) -> impl Iterator<Item = &str> {
    records.iter().map(|r| r.title.as_deref().unwrap_or(""))
}

fn export_members(
    resolver: &CompanyResolver,
    analysis: &CompanyAnalysis,
    records: &[ContactRecord],
    company: &str,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let query = resolver
        .resolve_alias(company)
        .map(str::to_string)
        .unwrap_or_else(|| company.to_lowercase());

    let canonical = analysis
        .clusters()
        .canonical_for(&query)
        .or_else(|| analysis.clusters().get(&query).map(|c| c.canonical_name.as_str()))
        .or_else(|| {
            // Fall back to the cluster whose canonical normalizes the same way
            let key = normalize(&query);
            analysis
                .clusters()
                .iter()
                .find(|c| normalize(&c.canonical_name) == key)
                .map(|c| c.canonical_name.as_str())
        });

    let Some(canonical) = canonical else {
        println!("No contacts found for '{}'.", company);
        return Ok(());
    };

    let report = MemberReport::from_records(canonical, records, &analysis.members_of(canonical));
    match output {
        Some(path) => {
            export_member_report(&report, format, path)?;
            println!(
                "✅ {} people at {} written to {}",
                report.members.len(),
                canonical,
                path.display()
            );
        }
        None => write_member_report(&report, format, io::stdout().lock())?,
    }
    Ok(())
}

fn run_extract(resolver: &CompanyResolver, titles: &[String]) -> Result<()> {
    let mut out = io::stdout().lock();
    for title in titles {
        let company = resolver.extract_company(title);
        if company.is_empty() {
            writeln!(out, "{} => (none)", title)?;
        } else {
            writeln!(out, "{} => {}", title, company)?;
        }
    }
    Ok(())
}

fn run_compare(resolver: &CompanyResolver, a: &str, b: &str) -> Result<()> {
    let kind = resolver.compare(a, b);
    let mut out = io::stdout().lock();

    writeln!(out, "'{}' -> '{}'", a, normalize(a))?;
    writeln!(out, "'{}' -> '{}'", b, normalize(b))?;
    writeln!(out, "Score: {:.3} ({})", kind.score(), kind)?;
    writeln!(
        out,
        "Similar: {}",
        if resolver.is_similar(a, b) { "yes" } else { "no" }
    )?;

    for name in [a, b] {
        if let Some(canonical) = resolver.resolve_alias(name) {
            writeln!(out, "Alias: '{}' is a known variant of '{}'", name, canonical)?;
        }
    }
    Ok(())
}
