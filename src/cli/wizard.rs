use std::collections::HashSet;
use std::io::{BufRead, Write};

use anyhow::{bail, Result};

use crate::config::types::DatabaseConfig;
use crate::error::FdwError;

/// Interactive numbered menus over a line-oriented input.
pub struct Wizard<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("Input closed before a selection was made");
        }
        Ok(line.trim().to_string())
    }

    fn print_menu<I>(&mut self, title: &str, labels: I) -> Result<()>
    where
        I: IntoIterator<Item = String>,
    {
        writeln!(self.output)?;
        writeln!(self.output, "{}", title)?;
        for (i, label) in labels.into_iter().enumerate() {
            writeln!(self.output, "{}) {}", i + 1, label)?;
        }
        Ok(())
    }

    /// Pick exactly one item; re-prompts until a valid index is given.
    pub fn choose_from_list<'a, T, F>(&mut self, title: &str, items: &'a [T], label: F) -> Result<&'a T>
    where
        F: Fn(&T) -> String,
    {
        if items.is_empty() {
            bail!("Nothing to choose from: {}", title);
        }
        self.print_menu(title, items.iter().map(&label))?;

        loop {
            let choice = self.prompt("Select: ")?;
            if let Ok(n) = choice.parse::<usize>() {
                if (1..=items.len()).contains(&n) {
                    return Ok(&items[n - 1]);
                }
            }
            writeln!(self.output, "Invalid option")?;
        }
    }

    /// Pick any number of items by space-separated indices. Out-of-range
    /// indices are ignored; non-numeric input re-prompts.
    pub fn choose_multiple(&mut self, title: &str, items: &[String]) -> Result<Vec<String>> {
        self.print_menu(title, items.iter().cloned())?;

        loop {
            let raw = self.prompt("Select (space separated): ")?;
            let parsed: std::result::Result<Vec<usize>, _> =
                raw.split_whitespace().map(|x| x.parse::<usize>()).collect();
            match parsed {
                Ok(indices) => {
                    return Ok(indices
                        .into_iter()
                        .filter(|&n| (1..=items.len()).contains(&n))
                        .map(|n| items[n - 1].clone())
                        .collect());
                }
                Err(_) => writeln!(self.output, "Invalid input")?,
            }
        }
    }

    /// Free-form line, used for action menus and confirmations.
    pub fn ask(&mut self, label: &str) -> Result<String> {
        self.prompt(label)
    }

    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }
}

/// Every requested schema must be configured on the chosen database.
pub fn validate_selection(database: &DatabaseConfig, selected: &[String]) -> Result<(), FdwError> {
    let available: HashSet<&str> = database.schemas.iter().map(|s| s.as_str()).collect();
    for schema in selected {
        if !available.contains(schema.as_str()) {
            return Err(FdwError::config(format!(
                "Schema '{}' does not exist in this database target",
                schema
            )));
        }
    }
    Ok(())
}
