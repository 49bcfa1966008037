//! `corpdb login` command - Resolve the access level of an SSN

use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;
use crate::core::employee::parse_ssn;

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    /// SSN (9 digits)
    pub ssn: String,
}

/// Prints `admin` or `employee`; unknown SSNs are an error
pub fn run(args: LoginArgs, global: &GlobalOpts) -> Result<()> {
    let ssn = parse_ssn("ssn", &args.ssn)?;
    let ctx = Context::open(global)?;

    match ctx.store.login(&ssn)? {
        Some(role) => {
            println!("{role}");
            Ok(())
        }
        None => Err(miette::miette!("No employee or administrator with SSN {}", ssn)),
    }
}
