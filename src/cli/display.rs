use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::supervisor::{CheckVerdict, CredentialCheck};
use crate::utils::{format_balance, truncate_chars, truncate_str};

pub struct Display;

impl Display {
    pub fn new() -> Self {
        Self
    }

    pub fn print_header(&self, text: &str) {
        println!();
        println!("{}", style(text).bold().cyan());
        println!("{}", style("═".repeat(60)).dim());
        println!();
    }

    pub fn print_check_table(&self, checks: &[CredentialCheck]) {
        if checks.is_empty() {
            println!("{}", style("No credentials found.").dim());
            return;
        }

        let valid = checks.iter().filter(|c| c.verdict.is_valid()).count();
        println!(
            "Valid: {}  Failed: {}",
            style(valid).green(),
            style(checks.len() - valid).red()
        );
        println!();

        println!(
            "{:<4} {:<14} {:<24} {:<13} {:>10}  {}",
            style("#").bold(),
            style("Credential").bold(),
            style("Proxy").bold(),
            style("Verdict").bold(),
            style("Balance").bold(),
            style("Detail").bold()
        );
        println!("{}", style("─".repeat(85)).dim());

        for check in checks {
            let verdict = match check.verdict {
                CheckVerdict::Valid => style(check.verdict.label()).green(),
                CheckVerdict::Rejected | CheckVerdict::Invalid => {
                    style(check.verdict.label()).red().bold()
                }
                _ => style(check.verdict.label()).yellow(),
            };

            println!(
                "{:<4} {:<14} {:<24} {:<13} {:>10}  {}",
                check.index,
                check.credential,
                check
                    .proxy
                    .as_deref()
                    .map(|p| truncate_str(p, 24))
                    .unwrap_or("direct"),
                verdict,
                check
                    .balance
                    .map(format_balance)
                    .unwrap_or_else(|| "-".to_string()),
                style(truncate_chars(check.detail.as_deref().unwrap_or(""), 40)).dim()
            );
        }
    }

    pub fn print_success(&self, message: &str) {
        println!("{} {}", style("✓").green().bold(), message);
    }

    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        println!("{} {}", style("!").yellow().bold(), message);
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
