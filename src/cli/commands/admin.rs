//! `corpdb admin` command - Administrator management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;
use crate::core::employee::parse_ssn;

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Grant administrator rights to an SSN
    Add {
        /// SSN (9 digits)
        ssn: String,
    },

    /// Check whether an SSN has administrator rights (prints yes/no)
    Check {
        /// SSN (9 digits)
        ssn: String,
    },
}

pub fn run(cmd: AdminCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    match cmd {
        AdminCommands::Add { ssn } => {
            let ssn = parse_ssn("ssn", &ssn)?;
            let added = ctx.store.add_admin(&ssn)?;
            if !ctx.quiet {
                if added {
                    println!("{} {} is now an administrator", style("✓").green(), ssn);
                } else {
                    println!("{} is already an administrator", ssn);
                }
            }
        }
        AdminCommands::Check { ssn } => {
            let ssn = parse_ssn("ssn", &ssn)?;
            let answer = if ctx.store.is_admin(&ssn)? { "yes" } else { "no" };
            println!("{answer}");
        }
    }
    Ok(())
}
