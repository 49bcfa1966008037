//! `corpdb departments` command - List departments

use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::table::ResultTable;
use crate::cli::GlobalOpts;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let departments = ctx.store.departments()?;

    let mut table = ResultTable::new(["DNUMBER", "DNAME", "MANAGER"], "department");
    for dept in &departments {
        table.push_row(vec![
            dept.number.to_string(),
            dept.name.clone(),
            dept.manager_ssn
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_default(),
        ]);
    }
    table.output(ctx.format, !ctx.quiet)
}
