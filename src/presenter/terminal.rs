use chrono::Utc;
use console::{Style, Term, style};

use super::Presenter;
use crate::config::PresenterConfig;
use crate::status::{BoardSnapshot, FleetSummary, StatusRecord, WorkerPhase};
use crate::utils::{format_balance, format_clock, format_since, truncate_chars, truncate_str};

const PROXY_WIDTH: usize = 24;
const ERROR_WIDTH: usize = 48;

/// Live table on stdout.
pub struct TerminalPresenter {
    threshold: f64,
    clear_screen: bool,
    term: Term,
}

impl TerminalPresenter {
    pub fn new(config: &PresenterConfig) -> Self {
        Self {
            threshold: config.balance_highlight_threshold,
            clear_screen: config.clear_screen,
            term: Term::stdout(),
        }
    }

    /// Table lines for `snapshot`, header first.
    pub fn table_lines(&self, snapshot: &BoardSnapshot) -> Vec<String> {
        let mut lines = Vec::with_capacity(snapshot.records.len() + 4);
        lines.push(format!(
            "{}  {}",
            style("Reward Fleet").bold().cyan(),
            style(snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
        ));
        lines.push(format!(
            "{:<4} {:<24} {:<10} {:>10} {:>7} {:<9} {:<5} {:<9} {:>5}  {}",
            style("#").bold(),
            style("Proxy").bold(),
            style("Phase").bold(),
            style("Balance").bold(),
            style("Claims").bold(),
            style("Claimed").bold(),
            style("Ping").bold(),
            style("Pinged").bold(),
            style("Fails").bold(),
            style("Last error").bold(),
        ));
        lines.push(style("─".repeat(110)).dim().to_string());

        for record in &snapshot.records {
            lines.push(self.row(record, snapshot));
        }

        if snapshot.records.is_empty() {
            lines.push(style("No accounts loaded.").dim().to_string());
        }
        lines
    }

    fn row(&self, record: &StatusRecord, snapshot: &BoardSnapshot) -> String {
        let proxy = record
            .proxy
            .as_deref()
            .map(|p| truncate_str(p.trim_start_matches("http://"), PROXY_WIDTH).to_string())
            .unwrap_or_else(|| "direct".to_string());

        let balance_style = if record.balance > self.threshold {
            Style::new().green().bold()
        } else {
            Style::new()
        };

        let ping = match record.ping_ok {
            Some(true) => style("✓").green(),
            Some(false) => style("✗").red(),
            None => style("-").dim(),
        };

        let error = match &record.last_error {
            Some(e) => {
                let text = truncate_chars(&e.to_string(), ERROR_WIDTH);
                if record.needs_attention {
                    style(text).red().bold()
                } else {
                    style(text).yellow()
                }
            }
            None => style(String::new()),
        };

        let index = if record.needs_attention {
            style(format!("{}!", record.index)).red().bold()
        } else {
            style(record.index.to_string())
        };

        format!(
            "{:<4} {:<24} {:<10} {:>10} {:>7} {:<9} {:<5} {:<9} {:>5}  {}",
            index,
            proxy,
            self.phase_style(record.phase).apply_to(record.phase),
            balance_style.apply_to(format_balance(record.balance)),
            record.missions_claimed,
            format_clock(record.last_claim_at),
            ping,
            format_since(record.last_ping_at, snapshot.taken_at),
            record.consecutive_failures,
            error,
        )
    }

    pub fn summary_line(&self, summary: &FleetSummary) -> String {
        format!(
            "{} accounts: {}  claims: {}  pings ok: {}  balance: {}  attention: {}",
            style(format!("[{}]", summary.taken_at.format("%H:%M:%S"))).dim(),
            summary.accounts,
            style(summary.total_claims).green(),
            style(summary.successful_pings).cyan(),
            format_balance(summary.total_balance),
            if summary.needs_attention > 0 {
                style(summary.needs_attention).red().bold()
            } else {
                style(summary.needs_attention).dim()
            },
        )
    }

    fn phase_style(&self, phase: WorkerPhase) -> Style {
        match phase {
            WorkerPhase::Idle => Style::new().dim(),
            WorkerPhase::Validating => Style::new().blue(),
            WorkerPhase::Fetching => Style::new().cyan(),
            WorkerPhase::Claiming => Style::new().yellow().bold(),
            WorkerPhase::Pinging => Style::new().magenta(),
            WorkerPhase::Sleeping => Style::new().green(),
            WorkerPhase::Stopped => Style::new().dim().strikethrough(),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&self, snapshot: &BoardSnapshot) {
        if self.clear_screen && self.term.is_term() {
            let _ = self.term.clear_screen();
        }
        for line in self.table_lines(snapshot) {
            println!("{}", line);
        }
    }

    fn summarize(&self, summary: &FleetSummary) {
        println!();
        println!("{}", self.summary_line(summary));
        println!();
    }

    fn finish(&self, snapshot: &BoardSnapshot) {
        self.render(snapshot);
        println!();
        println!("{}", style("Fleet stopped.").bold());
        println!("{}", self.summary_line(&snapshot.summary()));
        let elapsed = Utc::now() - snapshot.taken_at;
        if elapsed.num_seconds() > 1 {
            println!("{}", style(format!("(snapshot {}s old)", elapsed.num_seconds())).dim());
        }
    }
}
