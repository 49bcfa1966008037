//! `corpdb modify` command - Change one attribute on many employees
//!
//! Each SSN is updated on its own: a value that is invalid for one row
//! (for example making an employee their own supervisor) skips that row
//! and the rest still go through.

use console::style;
use miette::Result;

use crate::cli::helpers::{collect_ssns, Context};
use crate::cli::GlobalOpts;
use crate::core::EditableAttribute;

#[derive(clap::Args, Debug)]
pub struct ModifyArgs {
    /// Attribute to change: address, sex, salary, bdate, supervisor, department
    #[arg(long, short = 'a')]
    pub attr: String,

    /// New value
    #[arg(long)]
    pub value: String,

    /// SSNs to update (use - to read from stdin)
    #[arg(required = true)]
    pub ssns: Vec<String>,
}

pub fn run(args: ModifyArgs, global: &GlobalOpts) -> Result<()> {
    let attribute: EditableAttribute = args.attr.parse()?;
    let ids = collect_ssns(&args.ssns)?;

    let ctx = Context::open(global)?;
    let outcome = ctx.store.update(&ids, attribute, &args.value)?;

    for failure in &outcome.failures {
        eprintln!(
            "{} {}: {}",
            style("✗").red(),
            failure.ssn,
            failure.error
        );
    }

    if !ctx.quiet {
        println!(
            "{} Updated {} of {} employee(s)",
            style("✓").green(),
            style(outcome.succeeded).cyan(),
            outcome.requested
        );
        if outcome.missing() > 0 {
            println!(
                "  {} SSN(s) did not match any employee",
                style(outcome.missing()).yellow()
            );
        }
    }

    if outcome.failures.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!(
            "{} employee(s) not updated: invalid {}",
            outcome.failures.len(),
            attribute
        ))
    }
}
