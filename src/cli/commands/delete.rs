//! `corpdb delete` command - Delete employees behind the dependency guard
//!
//! Supervisors who still have subordinates are never deleted. Employees who
//! manage a department, work on projects or have dependents on file are
//! deleted only after confirmation (or `--yes`).

use console::style;
use miette::Result;

use crate::cli::helpers::{collect_ssns, confirm, Context};
use crate::cli::GlobalOpts;
use crate::core::{CoreError, DeletionReview, GuardedDelete, Ssn};

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// SSNs to delete (use - to read from stdin)
    #[arg(required = true)]
    pub ssns: Vec<String>,

    /// Skip the confirmation prompt for employees with dependent records
    #[arg(long, short = 'y')]
    pub yes: bool,
}

pub fn run(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let ids = collect_ssns(&args.ssns)?;
    let ctx = Context::open(global)?;

    let mut prompt_error = None;
    let result = ctx.store.delete_guarded(&ids, |review| {
        if args.yes {
            return true;
        }
        print_warnings(review);
        match confirm("Delete anyway?") {
            Ok(answer) => answer,
            Err(e) => {
                prompt_error = Some(e);
                false
            }
        }
    });
    if let Some(e) = prompt_error {
        return Err(e);
    }

    match result {
        Ok(GuardedDelete::Deleted(outcome)) => {
            if !ctx.quiet {
                println!(
                    "{} Deleted {} of {} employee(s)",
                    style("✓").green(),
                    style(outcome.succeeded).cyan(),
                    outcome.requested
                );
            }
            Ok(())
        }
        Ok(GuardedDelete::Declined) => {
            println!("Aborted.");
            Ok(())
        }
        Err(CoreError::DependencyBlocked { blocked }) => Err(miette::miette!(
            help = "reassign their subordinates to another supervisor first",
            "Cannot delete supervisors with subordinates: {}",
            describe(&ctx, &blocked)?
        )),
        Err(e) => Err(e.into()),
    }
}

fn print_warnings(review: &DeletionReview) {
    println!("{}", style("Some employees have dependent records:").yellow());
    for detail in review.details.iter().filter(|d| d.is_warnable()) {
        let mut parts = Vec::new();
        if detail.managed_departments > 0 {
            parts.push(format!("manages {} department(s)", detail.managed_departments));
        }
        if detail.project_assignments > 0 {
            parts.push(format!("works on {} project(s)", detail.project_assignments));
        }
        if detail.dependents > 0 {
            parts.push(format!("has {} dependent(s)", detail.dependents));
        }
        println!("  {}  {}", style(&detail.ssn).cyan(), parts.join(", "));
    }
}

/// "Name (SSN)" for each blocked supervisor
fn describe(ctx: &Context, ssns: &[Ssn]) -> Result<String> {
    let mut names = Vec::with_capacity(ssns.len());
    for ssn in ssns {
        names.push(match ctx.store.find(ssn)? {
            Some(emp) => format!("{} ({})", emp.display_name(), ssn),
            None => ssn.to_string(),
        });
    }
    Ok(names.join(", "))
}
