//! Terminal styling for the analysis run output

use console::style;
use std::path::Path;
use std::time::Duration;

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("claimlens").cyan().bold(),
        style(format!("v{version}")).dim()
    );
    println!(
        "    {}",
        style("Exploratory analysis for insurance claims data").dim()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print the resolved run configuration
pub fn print_config(input: &Path, group_columns: &[String], metric: &str, alpha: f64) {
    println!();
    println!("    {}", style("Configuration").cyan().bold());
    println!("      Input:    {}", input.display());
    println!("      Segments: {}", group_columns.join(", "));
    println!("      Metric:   {metric}");
    println!("      Alpha:    {alpha}");
}

/// Print a numbered step header
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {step_num}")).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!(
        "    {} {}",
        style("✓").green().bold(),
        style(message).green()
    );
}

/// Print an informational message
pub fn print_info(message: &str) {
    println!("    {} {}", style("ℹ").blue(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!(
        "    {} {}",
        style("⚠").yellow().bold(),
        style(message).yellow()
    );
}

/// Print the elapsed time of a step
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("took {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        style("✦").magenta().bold(),
        style("Analysis complete").white().bold()
    );
    println!();
}
