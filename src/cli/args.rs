//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    add::AddArgs, admin::AdminCommands, completions::CompletionsArgs, delete::DeleteArgs,
    group::GroupArgs, init::InitArgs, login::LoginArgs, modify::ModifyArgs, search::SearchArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "corpdb")]
#[command(author, version, about = "Employee records over a COMPANY database")]
#[command(long_about = "Search, report on and maintain employee records stored in a SQLite COMPANY database.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// SQLite database file (default: from config, then ./company.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalOpts {
    /// Database path: `--db` wins over every config layer
    pub fn database(&self, config: &Config) -> PathBuf {
        self.db.clone().unwrap_or_else(|| config.database())
    }

    /// Resolve `auto` against the configured default, falling back to TSV
    pub fn output_format(&self, config: &Config) -> OutputFormat {
        match self.format {
            OutputFormat::Auto => config
                .default_format
                .as_deref()
                .and_then(|f| OutputFormat::from_str(f, true).ok())
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(OutputFormat::Tsv),
            f => f,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the COMPANY tables in the database
    Init(InitArgs),

    /// List every employee with all attributes
    List,

    /// Search employees by attribute
    Search(SearchArgs),

    /// Average salary per sex, department or supervisor
    Group(GroupArgs),

    /// Add a new employee
    Add(AddArgs),

    /// Change one attribute on one or more employees
    Modify(ModifyArgs),

    /// Delete employees (supervisors with subordinates are refused)
    Delete(DeleteArgs),

    /// List departments
    Departments,

    /// Administrator management
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Resolve the access level of an SSN
    Login(LoginArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default (tsv if none)
    #[default]
    Auto,
    /// Aligned, tab-separated columns
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
    /// JSON format (for programming)
    Json,
    /// Markdown tables
    Md,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(format: OutputFormat) -> GlobalOpts {
        GlobalOpts {
            db: None,
            format,
            quiet: false,
            verbose: false,
        }
    }

    #[test]
    fn test_output_format_resolution() {
        let mut config = Config::default();
        assert_eq!(opts(OutputFormat::Auto).output_format(&config), OutputFormat::Tsv);

        config.default_format = Some("json".into());
        assert_eq!(opts(OutputFormat::Auto).output_format(&config), OutputFormat::Json);
        assert_eq!(opts(OutputFormat::Md).output_format(&config), OutputFormat::Md);

        config.default_format = Some("yaml".into());
        assert_eq!(opts(OutputFormat::Auto).output_format(&config), OutputFormat::Tsv);
    }

    #[test]
    fn test_db_flag_wins() {
        let config = Config {
            database: Some("from-config.db".into()),
            ..Default::default()
        };
        let mut global = opts(OutputFormat::Auto);
        assert_eq!(global.database(&config), PathBuf::from("from-config.db"));

        global.db = Some("flag.db".into());
        assert_eq!(global.database(&config), PathBuf::from("flag.db"));
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["corpdb", "--db", "x.db", "modify", "--attr", "salary", "--value", "1", "123456789"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Modify(_)));
    }
}
