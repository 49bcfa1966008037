//! `corpdb search` command - Search employees by attribute
//!
//! All filters combine with AND. Department and sex accept several values
//! (any of them matches); salary is a lower bound; name and address match
//! anywhere in the text.

use console::style;
use miette::Result;

use crate::cli::helpers::Context;
use crate::cli::table::ResultTable;
use crate::cli::GlobalOpts;
use crate::core::{Attribute, Criterion, Projection};

#[derive(clap::Args, Debug, Default)]
pub struct SearchArgs {
    /// Name fragment, matched against "First M. Last"
    #[arg(long)]
    pub name: Option<String>,

    /// Exact SSN
    #[arg(long)]
    pub ssn: Option<String>,

    /// Exact birth date (YYYY-MM-DD)
    #[arg(long)]
    pub bdate: Option<String>,

    /// Address fragment
    #[arg(long)]
    pub address: Option<String>,

    /// Department name(s), comma-separated or repeated
    #[arg(long = "dept", value_delimiter = ',')]
    pub departments: Vec<String>,

    /// Sex (F/M), comma-separated or repeated
    #[arg(long, value_delimiter = ',')]
    pub sex: Vec<String>,

    /// Minimum salary
    #[arg(long)]
    pub salary: Option<String>,

    /// Supervisor SSN
    #[arg(long)]
    pub supervisor: Option<String>,

    /// Additional filter as ATTR=VALUE (repeatable)
    #[arg(long = "where", value_name = "ATTR=VALUE")]
    pub filters: Vec<String>,

    /// Attributes to show, comma-separated (default: all)
    #[arg(long, short = 'c')]
    pub columns: Option<String>,

    /// Show only the number of matches
    #[arg(long)]
    pub count: bool,
}

impl SearchArgs {
    /// Criteria in flag order, followed by any `--where` filters
    pub fn criteria(&self) -> Result<Vec<Criterion>> {
        let mut criteria = Vec::new();
        let scalars = [
            (Attribute::Name, &self.name),
            (Attribute::Ssn, &self.ssn),
            (Attribute::Bdate, &self.bdate),
            (Attribute::Address, &self.address),
            (Attribute::Salary, &self.salary),
            (Attribute::Supervisor, &self.supervisor),
        ];
        for (attribute, value) in scalars {
            if let Some(v) = value {
                criteria.push(Criterion::single(attribute, v.clone()));
            }
        }
        if !self.departments.is_empty() {
            criteria.push(Criterion::departments(self.departments.iter().cloned()));
        }
        if !self.sex.is_empty() {
            criteria.push(Criterion::sexes(self.sex.iter().cloned()));
        }
        for filter in &self.filters {
            criteria.push(Criterion::parse(filter)?);
        }
        Ok(criteria)
    }

    pub fn projection(&self) -> Result<Projection> {
        match &self.columns {
            Some(cols) => Ok(Projection::parse(cols)?),
            None => Ok(Projection::all()),
        }
    }
}

pub fn run(args: SearchArgs, global: &GlobalOpts) -> Result<()> {
    let criteria = args.criteria()?;
    let projection = args.projection()?;

    let ctx = Context::open(global)?;
    let employees = ctx.store.search(&criteria, &projection)?;

    let table = ResultTable::employees(&employees, &projection, ctx.config.utc_offset_hours());

    if args.count {
        println!("{}", table.len());
        return Ok(());
    }

    if table.is_empty() && !ctx.quiet {
        eprintln!("{}", style("No matching employees.").yellow());
    }

    table.output(ctx.format, !ctx.quiet)
}
