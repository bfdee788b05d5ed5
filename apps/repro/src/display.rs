//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use repro_ops::{ResultSet, RunReport};
use repro_types::{BuildResult, ColorChoice, Outcome};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Print only the single-package verdict line
    verdict_only: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            verdict_only: false,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Print the `Success`/`Failed` line instead of the summary table
    #[must_use]
    pub fn verdict_only(mut self, verdict_only: bool) -> Self {
        self.verdict_only = verdict_only;
        self
    }

    /// Print the finished run in the selected format
    pub fn render_report(&self, report: &RunReport) -> io::Result<()> {
        if self.json_output {
            let json = report.to_json().map_err(io::Error::other)?;
            println!("{json}");
        } else if self.verdict_only {
            println!("{}", verdict_line(&report.results));
        } else {
            self.render_run_report(report)?;
        }
        Ok(())
    }

    /// Render the three result buckets and a one-line tally
    fn render_run_report(&self, report: &RunReport) -> io::Result<()> {
        let results = &report.results;
        if results.is_empty() {
            println!("No packages verified.");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Package").add_attribute(Attribute::Bold),
            Cell::new("Binary").add_attribute(Attribute::Bold),
            Cell::new("Size").add_attribute(Attribute::Bold),
            Cell::new("Wall (s)").add_attribute(Attribute::Bold),
            Cell::new("User (s)").add_attribute(Attribute::Bold),
            Cell::new("System (s)").add_attribute(Attribute::Bold),
            Cell::new("Outcome").add_attribute(Attribute::Bold),
        ]);

        for result in results.iter() {
            table.add_row(vec![
                Cell::new(&result.package),
                Cell::new(or_dash(&result.binary)),
                Cell::new(or_dash(&result.size)),
                Cell::new(format!("{:.3}", result.wall_time)),
                Cell::new(format!("{:.3}", result.user_time)),
                Cell::new(format!("{:.3}", result.system_time)),
                self.format_outcome(result.outcome),
            ]);
        }

        println!("{table}");
        println!();
        println!(
            "{} {} reproducible, {} not reproducible, {} failed",
            self.style_heading(&report.selection),
            results.matched.len(),
            results.mismatched.len(),
            results.failed.len(),
        );
        println!(
            "Results written to {} in {:.1}s",
            report.csv_path.display(),
            millis_to_secs(report.duration_ms),
        );
        Ok(())
    }

    /// Format outcome as colored cell
    fn format_outcome(&self, outcome: Outcome) -> Cell {
        let cell = Cell::new(outcome.to_string());
        if !self.supports_color() {
            return cell;
        }
        match outcome {
            Outcome::Match => cell.fg(Color::Green),
            Outcome::Mismatch => cell.fg(Color::Yellow),
            Outcome::Failed => cell.fg(Color::Red),
        }
    }

    fn style_heading(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(format!("{text}:")).to_string()
        } else {
            format!("{text}:")
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

/// Single-package verdict: `Success <wall> <user> <system>` when the rebuild
/// matched, `Failed` otherwise
pub fn verdict_line(results: &ResultSet) -> String {
    match results.matched.as_slice() {
        [BuildResult {
            wall_time,
            user_time,
            system_time,
            ..
        }] if results.len() == 1 => format!("Success {wall_time} {user_time} {system_time}"),
        _ => "Failed".to_string(),
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[allow(clippy::cast_precision_loss)]
fn millis_to_secs(millis: u64) -> f64 {
    millis as f64 / 1000.0
}
