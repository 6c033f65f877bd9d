//! Analysis run summary

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::hypothesis::{ClaimMetrics, TestOutcome};
use crate::pipeline::model::{ProbabilityReport, SeverityReport};

/// One hypothesis test and where it ran.
#[derive(Debug, Clone, Serialize)]
pub struct TestRecord {
    pub group_column: String,
    pub metric: String,
    pub outcome: TestOutcome,
}

/// Collected results and timings of one analysis run.
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub rows: usize,
    pub columns: usize,
    pub metrics: Option<ClaimMetrics>,
    pub tests: Vec<TestRecord>,
    pub severity: Option<(String, SeverityReport)>,
    pub probability: Option<(String, ProbabilityReport)>,
    pub charts_rendered: usize,
    timings: Vec<(String, Duration)>,
}

impl AnalysisSummary {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    pub fn record_time(&mut self, step: &str, elapsed: Duration) {
        self.timings.push((step.to_string(), elapsed));
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("▣").cyan(),
            style("ANALYSIS SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![Cell::new("Rows"), Cell::new(self.rows)]);
        table.add_row(vec![Cell::new("Columns"), Cell::new(self.columns)]);

        if let Some(metrics) = &self.metrics {
            table.add_row(vec![
                Cell::new("Claim frequency"),
                Cell::new(format!("{:.4}", metrics.claim_frequency)),
            ]);
            table.add_row(vec![
                Cell::new("Claim severity"),
                Cell::new(format!("{:.2}", metrics.claim_severity)),
            ]);
            table.add_row(vec![
                Cell::new("Margin"),
                Cell::new(format!("{:.2}", metrics.margin)).fg(if metrics.margin >= 0.0 {
                    Color::Green
                } else {
                    Color::Red
                }),
            ]);
        }
        if let Some((name, report)) = &self.severity {
            table.add_row(vec![
                Cell::new(format!("Severity model ({name})")),
                Cell::new(format!("rmse {:.2}, r2 {:.3}", report.rmse, report.r2)),
            ]);
        }
        if let Some((name, report)) = &self.probability {
            table.add_row(vec![
                Cell::new(format!("Probability model ({name})")),
                Cell::new(format!(
                    "acc {:.3}, prec {:.3}, rec {:.3}, f1 {:.3}",
                    report.accuracy, report.precision, report.recall, report.f1
                )),
            ]);
        }
        table.add_row(vec![
            Cell::new("Charts rendered"),
            Cell::new(self.charts_rendered),
        ]);

        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.tests.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("▣").cyan(),
                style("HYPOTHESIS TESTS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());

            let mut tests = Table::new();
            tests.load_preset(UTF8_FULL_CONDENSED);
            tests.set_header(vec![
                Cell::new("Segment").add_attribute(Attribute::Bold),
                Cell::new("Metric").add_attribute(Attribute::Bold),
                Cell::new("Result").add_attribute(Attribute::Bold),
            ]);
            for record in &self.tests {
                tests.add_row(vec![
                    Cell::new(&record.group_column),
                    Cell::new(&record.metric),
                    Cell::new(describe_outcome(&record.outcome)),
                ]);
            }
            for line in tests.to_string().lines() {
                println!("    {}", line);
            }
        }

        if !self.timings.is_empty() {
            println!();
            for (step, elapsed) in &self.timings {
                println!(
                    "    {}",
                    style(format!("{step}: {:.2}s", elapsed.as_secs_f64())).dim()
                );
            }
        }
    }
}

fn describe_outcome(outcome: &TestOutcome) -> String {
    match outcome {
        TestOutcome::ChiSquared(r) => format!(
            "chi2 = {:.3}, p = {:.4}, dof = {}",
            r.statistic, r.p_value, r.dof
        ),
        TestOutcome::TTest(r) => format!("t = {:.3}, p = {:.4}", r.statistic, r.p_value),
        TestOutcome::Anova {
            statistic,
            p_value,
            pairwise,
        } => format!(
            "F = {:.3}, p = {:.4}, {} pairwise ({} rejected)",
            statistic,
            p_value,
            pairwise.len(),
            pairwise.iter().filter(|c| c.reject).count()
        ),
        TestOutcome::Insufficient => "insufficient groups, no test".to_string(),
    }
}
