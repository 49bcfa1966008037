//! `corpdb group` command - Average salary per group

use clap::ValueEnum;
use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::table::ResultTable;
use crate::cli::GlobalOpts;
use crate::core::{GroupKey, GroupSpec, Ssn};

#[derive(clap::Args, Debug)]
pub struct GroupArgs {
    /// Attribute to group by
    #[arg(value_enum)]
    pub by: GroupBy,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum GroupBy {
    Sex,
    Department,
    Supervisor,
}

impl From<GroupBy> for GroupSpec {
    fn from(by: GroupBy) -> Self {
        match by {
            GroupBy::Sex => GroupSpec::Sex,
            GroupBy::Department => GroupSpec::Department,
            GroupBy::Supervisor => GroupSpec::Supervisor,
        }
    }
}

pub fn run(args: GroupArgs, global: &GlobalOpts) -> Result<()> {
    let spec = GroupSpec::from(args.by);
    let ctx = Context::open(global)?;
    let averages = ctx.store.group_average(spec)?;

    let mut table = ResultTable::new([spec.header(), "AVG SALARY"], "group");
    for (key, average) in &averages {
        let label = match (spec, key) {
            // Supervisors are grouped by SSN; show who that is
            (GroupSpec::Supervisor, GroupKey::Value(ssn)) => supervisor_label(&ctx, ssn)?,
            _ => key.label(&spec).to_string(),
        };
        table.push_row(vec![label, format!("{average:.2}")]);
    }
    table.output(ctx.format, !ctx.quiet)
}

fn supervisor_label(ctx: &Context, raw: &str) -> Result<String> {
    let Ok(ssn) = Ssn::parse(raw) else {
        return Ok(raw.to_string());
    };
    Ok(match ctx.store.find(&ssn)? {
        Some(emp) => format!("{} ({})", emp.display_name(), ssn),
        None => ssn.to_string(),
    })
}
