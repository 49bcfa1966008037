//! Table formatting utilities for CLI list commands
//!
//! Every command that prints records builds a [`ResultTable`] of display
//! strings and hands it the output format; the table owns all formatting.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::{Employee, Projection};

/// Widest a TSV column may grow before its cells are truncated
const MAX_COLUMN_WIDTH: usize = 40;

/// Rows of display cells under a header
#[derive(Debug, Clone)]
pub struct ResultTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    noun: &'static str,
}

impl ResultTable {
    /// `noun` names one row in the summary line, e.g. `employee`
    pub fn new<I, S>(headers: I, noun: &'static str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            noun,
        }
    }

    /// One row per employee, cells rendered through the projection
    pub fn employees(employees: &[Employee], projection: &Projection, utc_offset_hours: i32) -> Self {
        let mut table = Self::new(projection.headers(), "employee");
        for emp in employees {
            table.push_row(projection.render(emp, utc_offset_hours));
        }
        table
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Print the table; the summary line only accompanies TSV output
    pub fn output(&self, format: OutputFormat, show_summary: bool) -> Result<()> {
        match format {
            OutputFormat::Csv => print!("{}", self.render_csv()?),
            OutputFormat::Json => println!("{}", self.render_json()?),
            OutputFormat::Md => println!("{}", self.render_md()),
            OutputFormat::Tsv | OutputFormat::Auto => {
                print!("{}", self.render_tsv());
                if show_summary {
                    println!();
                    println!("{} {}(s) found.", style(self.len()).cyan(), self.noun);
                }
            }
        }
        Ok(())
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let content = self
                    .rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0);
                header.len().max(content).min(MAX_COLUMN_WIDTH)
            })
            .collect()
    }

    pub fn render_tsv(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let header: Vec<String> = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<width$}", style(h).bold(), width = *w))
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", truncate_str(c, *w), width = *w))
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }
        out
    }

    pub fn render_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).into_diagnostic()?;
        for row in &self.rows {
            writer.write_record(row).into_diagnostic()?;
        }
        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }

    /// JSON array of objects keyed by lowercased header
    pub fn render_json(&self) -> Result<String> {
        let keys: Vec<String> = self.headers.iter().map(|h| h.to_lowercase()).collect();
        let records: Vec<serde_json::Map<String, serde_json::Value>> = self
            .rows
            .iter()
            .map(|row| {
                keys.iter()
                    .cloned()
                    .zip(row.iter().map(|c| serde_json::Value::String(c.clone())))
                    .collect()
            })
            .collect();
        serde_json::to_string_pretty(&records).into_diagnostic()
    }

    pub fn render_md(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().cloned());
        for row in &self.rows {
            builder.push_record(row.iter().map(|c| c.replace('|', "\\|")));
        }
        builder.build().with(Style::markdown()).to_string()
    }
}
