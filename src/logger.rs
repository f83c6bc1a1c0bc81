use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum VerbosityLevel {
    Silent = 0,   // Errors only
    Summary = 1,  // Warnings and results (default)
    Detailed = 2, // Load and clustering progress
    Debug = 3,    // Every extraction and merge decision
}

impl VerbosityLevel {
    pub fn from_verbose_count(count: u8) -> Self {
        match count {
            0 => VerbosityLevel::Summary,
            1 => VerbosityLevel::Detailed,
            2.. => VerbosityLevel::Debug,
        }
    }

    /// `--quiet` wins over any `-v`.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            VerbosityLevel::Silent
        } else {
            Self::from_verbose_count(verbose)
        }
    }

    pub fn level(&self) -> Level {
        match self {
            VerbosityLevel::Silent => Level::ERROR,
            VerbosityLevel::Summary => Level::WARN,
            VerbosityLevel::Detailed => Level::INFO,
            VerbosityLevel::Debug => Level::DEBUG,
        }
    }

    /// Filter used when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> String {
        format!("orgcluster={}", self.level().as_str().to_lowercase())
    }
}

/// Install the global subscriber, writing to stderr so report output on
/// stdout stays clean. `RUST_LOG` overrides the verbosity flags.
pub fn init(verbosity: VerbosityLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    // A subscriber may already be installed (e.g. by a test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
