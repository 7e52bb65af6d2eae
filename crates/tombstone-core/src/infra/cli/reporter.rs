// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::domain::models::{BatchReport, ItemState, RepoCheck};
use comfy_table::Table;
use console::{StyledObject, style};
use std::path::Path;

#[derive(Default)]
pub struct ConsoleReporter {
    use_colors: bool,
}

impl ConsoleReporter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    pub fn report_check_started(&self, url: &str) {
        println!();
        println!("Checking repository : {}", self.cyan(url));
        println!();
    }

    pub fn report_check_outcome(&self, url: &str, check: &RepoCheck) {
        match check.confirmed() {
            true => println!("• status : {}", self.cyan(check)),
            false => println!("• status : {}", self.red(check)),
        }

        if check.repo_real() != url {
            println!("• resolved to : {}", self.cyan(check.repo_real()));
        }

        if let Some(successor) = check.moved_to() {
            println!("• moved to : {}", self.cyan(successor));
        }

        if let Some(error) = check.error() {
            println!("• reason : {}", self.red(error));
        }

        println!();
    }

    pub fn report_audit_started(&self, total_items: usize) {
        println!();
        println!(
            "Auditing {} repositories. This operation may take some time ...",
            self.cyan(total_items)
        );
    }

    pub fn report_audit_outcomes(&self, report: &BatchReport, checkpoint_path: &Path) {
        let statistics = &report.statistics;
        println!();
        println!("Statistics : ");
        println!();
        println!("• total repositories : {}", self.cyan(statistics.total));
        println!("• checked in this run : {}", self.cyan(statistics.completed));
        println!("• confirmed by previous runs : {}", self.cyan(statistics.skipped));
        println!("• archived : {}", self.cyan(statistics.archived));
        println!("• moved to another repository : {}", self.cyan(statistics.moved));
        println!("• deleted : {}", self.cyan(statistics.deleted));
        println!("• unconfirmed : {}", self.red(statistics.unconfirmed));

        if statistics.pending > 0 {
            println!("• left for the next run : {}", self.red(statistics.pending));
        }

        let relocations = report
            .outcomes
            .iter()
            .filter_map(|(item, state)| match state {
                ItemState::Completed(check) => check.moved_to().map(|successor| (item, successor)),
                _ => None,
            })
            .collect::<Vec<_>>();

        if !relocations.is_empty() {
            println!();
            println!("Relocated repositories : ");
            println!();

            let mut table = Table::new();
            table.set_header(vec!["Key", "Repository", "Moved to"]);
            relocations.iter().for_each(|(item, successor)| {
                table.add_row(vec![item.key.as_str(), item.url.as_str(), *successor]);
            });
            println!("{table}");
        }

        let unconfirmed = report
            .outcomes
            .iter()
            .filter_map(|(item, state)| match state {
                ItemState::Completed(check) if !check.confirmed() => Some((item, check)),
                _ => None,
            })
            .collect::<Vec<_>>();

        if !unconfirmed.is_empty() {
            println!();
            println!("Unconfirmed repositories : ");
            println!();

            let mut table = Table::new();
            table.set_header(vec!["Key", "Repository", "Reason"]);
            unconfirmed.iter().for_each(|(item, check)| {
                let reason = check.error().map(|error| error.to_string()).unwrap_or_default();
                table.add_row(vec![item.key.clone(), item.url.clone(), reason]);
            });
            println!("{table}");
        }

        println!();
        println!("Results saved at {}", self.cyan(checkpoint_path.display()));
        println!();
    }

    fn cyan<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).cyan(),
            false => style(what),
        }
    }

    fn red<T>(&self, what: T) -> StyledObject<T> {
        match self.use_colors {
            true => style(what).red(),
            false => style(what),
        }
    }
}
