//! `corpdb list` command - Every employee, all attributes

use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::table::ResultTable;
use crate::cli::GlobalOpts;
use crate::core::Projection;

pub fn run(global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let employees = ctx.store.get_all()?;

    ResultTable::employees(&employees, &Projection::all(), ctx.config.utc_offset_hours())
        .output(ctx.format, !ctx.quiet)
}
