//! `corpdb init` command - Create the COMPANY schema

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Also load the sample COMPANY dataset
    #[arg(long)]
    pub sample: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open_or_create(global);
    let path = ctx.store.provider().path().to_path_buf();

    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            std::fs::create_dir_all(parent).into_diagnostic()?;
        }
    }

    ctx.store.install_schema()?;
    if args.sample {
        ctx.store.load_sample_data()?;
    }

    if !ctx.quiet {
        println!(
            "{} Initialized COMPANY database at {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
        if args.sample {
            println!("  Loaded the sample dataset");
        }
        println!();
        println!("Next steps:");
        println!("  {} List all employees", style("corpdb list").yellow());
        println!(
            "  {} Add an employee",
            style("corpdb add --interactive").yellow()
        );
    }
    Ok(())
}
