//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::{IntoDiagnostic, Result};
use std::io::{self, BufRead, Write};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::employee::parse_ssn;
use crate::core::{Config, EmployeeStore, Ssn};

/// Everything a command needs: merged config, the store and the output format
pub struct Context {
    pub config: Config,
    pub store: EmployeeStore,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl Context {
    /// Open the configured database, which must already exist
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let ctx = Self::open_or_create(global);
        let path = ctx.store.provider().path();
        if !path.exists() {
            return Err(miette::miette!(
                help = "run `corpdb init` to create it",
                "Database {} not found",
                path.display()
            ));
        }
        Ok(ctx)
    }

    /// Open the configured database, creating the file on first use
    pub fn open_or_create(global: &GlobalOpts) -> Self {
        let config = Config::load();
        let path = global.database(&config);
        tracing::debug!(path = %path.display(), "using database");
        Self {
            store: EmployeeStore::open(path),
            format: global.output_format(&config),
            quiet: global.quiet,
            config,
        }
    }
}

/// Parse SSN arguments; a single `-` reads them from stdin, one per line
pub fn collect_ssns(raw: &[String]) -> Result<Vec<Ssn>> {
    let lines: Vec<String> = if raw.len() == 1 && raw[0] == "-" {
        io::stdin()
            .lock()
            .lines()
            .map_while(std::result::Result::ok)
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    } else {
        raw.to_vec()
    };

    if lines.is_empty() {
        return Err(miette::miette!("No SSNs given"));
    }
    lines
        .iter()
        .map(|s| parse_ssn("ssn", s).map_err(miette::Report::from))
        .collect()
}

/// Ask a yes/no question on stdin; anything but `y` means no
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush().into_diagnostic()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).into_diagnostic()?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
