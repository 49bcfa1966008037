//! `corpdb add` command - Add a new employee

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::Context;
use crate::cli::GlobalOpts;
use crate::core::EmployeeDraft;

#[derive(clap::Args, Debug, Default)]
pub struct AddArgs {
    /// First name (letters only)
    #[arg(long)]
    pub first: Option<String>,

    /// Middle initial
    #[arg(long)]
    pub middle: Option<String>,

    /// Last name (letters only)
    #[arg(long)]
    pub last: Option<String>,

    /// SSN (9 digits)
    #[arg(long)]
    pub ssn: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub bdate: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// Sex (F or M)
    #[arg(long)]
    pub sex: Option<String>,

    /// Salary, up to two decimal places
    #[arg(long)]
    pub salary: Option<String>,

    /// Supervisor SSN
    #[arg(long)]
    pub supervisor: Option<String>,

    /// Department number
    #[arg(long)]
    pub dept: Option<String>,

    /// Prompt for any field not given on the command line
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

impl AddArgs {
    fn into_draft(self) -> EmployeeDraft {
        EmployeeDraft {
            first_name: self.first.unwrap_or_default(),
            middle_initial: self.middle.unwrap_or_default(),
            last_name: self.last.unwrap_or_default(),
            ssn: self.ssn.unwrap_or_default(),
            birth_date: self.bdate.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            sex: self.sex.unwrap_or_default(),
            salary: self.salary.unwrap_or_default(),
            supervisor_ssn: self.supervisor.unwrap_or_default(),
            department_number: self.dept.unwrap_or_default(),
        }
    }
}

pub fn run(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let ctx = Context::open(global)?;
    let interactive = args.interactive;
    let mut draft = args.into_draft();

    if interactive {
        prompt_missing(&mut draft, &ctx)?;
    }

    let emp = ctx.store.insert_draft(&draft)?;

    if !ctx.quiet {
        println!(
            "{} Added employee {} ({})",
            style("✓").green(),
            style(emp.display_name()).cyan(),
            emp.ssn
        );
    }
    Ok(())
}

fn prompt_missing(draft: &mut EmployeeDraft, ctx: &Context) -> Result<()> {
    let theme = ColorfulTheme::default();

    let text = |prompt: &str, current: &mut String, required: bool| -> Result<()> {
        if !current.trim().is_empty() {
            return Ok(());
        }
        *current = Input::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(!required)
            .interact_text()
            .into_diagnostic()?;
        Ok(())
    };

    text("First name", &mut draft.first_name, true)?;
    text("Middle initial", &mut draft.middle_initial, false)?;
    text("Last name", &mut draft.last_name, true)?;
    text("SSN (9 digits)", &mut draft.ssn, true)?;
    text("Birth date (YYYY-MM-DD)", &mut draft.birth_date, false)?;
    text("Address", &mut draft.address, false)?;

    if draft.sex.trim().is_empty() {
        let choices = ["F", "M"];
        let picked = Select::with_theme(&theme)
            .with_prompt("Sex")
            .items(&choices)
            .default(0)
            .interact()
            .into_diagnostic()?;
        draft.sex = choices[picked].to_string();
    }

    text("Salary", &mut draft.salary, false)?;
    text("Supervisor SSN", &mut draft.supervisor_ssn, false)?;

    if draft.department_number.trim().is_empty() {
        let departments = ctx.store.departments()?;
        if departments.is_empty() {
            text("Department number", &mut draft.department_number, true)?;
        } else {
            let labels: Vec<String> = departments
                .iter()
                .map(|d| format!("{} {}", d.number, d.name))
                .collect();
            let picked = Select::with_theme(&theme)
                .with_prompt("Department")
                .items(&labels)
                .default(0)
                .interact()
                .into_diagnostic()?;
            draft.department_number = departments[picked].number.to_string();
        }
    }
    Ok(())
}
