//! Claimlens entry point: the full analysis run from raw data to summary.

use std::str::FromStr;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Table};
use polars::prelude::*;

use claimlens::cli::Cli;
use claimlens::pipeline::{
    claim_metrics, descriptive_stats, design_matrix, encode_categorical, engineer_features,
    feature_columns, impute_missing, load_dataset, loss_ratio, missing_counts, resolve_data_path,
    segment, split, test_hypothesis, train_evaluate_probability, train_evaluate_severity,
    with_loss_ratio, MetricSource, ProbabilityModel, SeverityModel, LOSS_RATIO_COLUMN,
    TOTAL_CLAIMS, TOTAL_PREMIUM, TRANSACTION_MONTH,
};
use claimlens::report::{write_results, AnalysisExport, AnalysisSummary, RunMetadata, TestRecord};
use claimlens::utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config, print_info,
    print_step_header, print_step_time, print_success, print_warning,
};
use claimlens::viz::{
    hypothesis_plot_path, plot_categorical_distribution, plot_correlation_matrix,
    plot_group_distribution, plot_loss_ratio_by_category, plot_numerical_distribution,
    plot_temporal_trend, PlotStyle,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Resolve model names up front so a typo fails before any heavy work.
    let severity_model = SeverityModel::from_str(&cli.severity_model)?;
    let probability_model = ProbabilityModel::from_str(&cli.probability_model)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    let input = resolve_data_path(cli.input.as_deref());
    print_config(&input, &cli.group_columns, &cli.metric, cli.alpha);

    // Step 1: load
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let df = load_dataset(Some(&input))?;
    let mut summary = AnalysisSummary::new(df.height(), df.width());
    print_success(&format!(
        "Loaded {} rows x {} columns",
        df.height(),
        df.width()
    ));
    summary.record_time("load", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 2: descriptive statistics and portfolio metrics
    print_step_header(2, "Descriptive Statistics");
    let step_start = Instant::now();
    let stats = descriptive_stats(&df)?;
    print_stats_table(&stats)?;

    let missing: Vec<(String, u64)> = missing_counts(&df)
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect();
    if missing.is_empty() {
        print_info("No missing values");
    } else {
        print_info(&format!("{} column(s) with missing values", missing.len()));
        for (name, count) in missing.iter().take(10) {
            println!("      {name}: {count}");
        }
    }

    let df = with_loss_ratio(df)?;
    let metrics = claim_metrics(&df)?;
    print_success(&format!(
        "Claim frequency {:.4}, severity {:.2}, margin {:.2}",
        metrics.claim_frequency, metrics.claim_severity, metrics.margin
    ));
    summary.metrics = Some(metrics);
    summary.record_time("eda", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 3: hypothesis tests per segment column
    print_step_header(3, "Hypothesis Tests");
    let step_start = Instant::now();
    for group in &cli.group_columns {
        if df.column(group).is_err() {
            print_warning(&format!("Segment column '{group}' not found, skipping"));
            continue;
        }
        let segments = segment(&df, group)?;
        print_info(&format!("{group}: {} segments", segments.height()));

        let (outcome, _) = test_hypothesis(
            &df,
            group,
            MetricSource::Column(TOTAL_CLAIMS.to_string()),
            true,
            cli.alpha,
        )?;
        record_test(&mut summary, group, "HasClaim", outcome, cli.alpha);

        let (outcome, _) = test_hypothesis(
            &df,
            group,
            MetricSource::Column(cli.metric.clone()),
            false,
            cli.alpha,
        )?;
        record_test(&mut summary, group, &cli.metric, outcome, cli.alpha);

        // Loss ratio as a precomputed series rather than a dataset column.
        let ratio = loss_ratio(df.column(TOTAL_CLAIMS)?, df.column(TOTAL_PREMIUM)?)?;
        let (outcome, _) = test_hypothesis(
            &df,
            group,
            MetricSource::Series(ratio.into_series()),
            false,
            cli.alpha,
        )?;
        record_test(&mut summary, group, "LossRatio", outcome, cli.alpha);
    }
    summary.record_time("hypothesis", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 4: preprocess for modelling
    print_step_header(4, "Preprocessing");
    let step_start = Instant::now();
    let spinner = create_spinner("Imputing, engineering and encoding...");
    let processed = impute_missing(df.clone())?;
    let processed = engineer_features(processed)?;
    let processed = encode_categorical(processed, cli.max_cardinality)?;
    finish_with_success(
        &spinner,
        &format!("Preprocessed to {} columns", processed.width()),
    );
    summary.record_time("preprocess", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 5: baseline models
    print_step_header(5, "Baseline Models");
    let step_start = Instant::now();
    if cli.skip_models {
        print_info("Model training skipped");
    } else {
        run_models(&cli, severity_model, probability_model, &processed, &mut summary)?;
    }
    summary.record_time("models", step_start.elapsed());
    print_step_time(step_start.elapsed());

    // Step 6: charts
    print_step_header(6, "Charts");
    let step_start = Instant::now();
    if cli.no_plots {
        print_info("Chart rendering skipped");
    } else {
        render_charts(&cli, &df, &mut summary)?;
    }
    summary.record_time("charts", step_start.elapsed());
    print_step_time(step_start.elapsed());

    if let Some(path) = &cli.export {
        let export = AnalysisExport {
            metadata: RunMetadata::new(&input, cli.alpha),
            metrics: summary.metrics.clone(),
            tests: summary.tests.clone(),
        };
        write_results(path, &export)?;
        print_success(&format!("Results written to {}", path.display()));
    }

    summary.display();
    print_completion();
    Ok(())
}

/// Record a test outcome in the summary and echo its verdict.
fn record_test(
    summary: &mut AnalysisSummary,
    group: &str,
    metric: &str,
    outcome: claimlens::pipeline::TestOutcome,
    alpha: f64,
) {
    match outcome.p_value() {
        Some(p) if p < alpha => print_success(&format!(
            "{group} x {metric}: p = {p:.4}, reject the null at alpha = {alpha}"
        )),
        Some(p) => print_info(&format!(
            "{group} x {metric}: p = {p:.4}, fail to reject the null"
        )),
        None => print_warning(&format!("{group} x {metric}: insufficient groups")),
    }
    summary.tests.push(TestRecord {
        group_column: group.to_string(),
        metric: metric.to_string(),
        outcome,
    });
}

/// Train and score the severity and probability baselines on the
/// preprocessed dataset.
fn run_models(
    cli: &Cli,
    severity_model: SeverityModel,
    probability_model: ProbabilityModel,
    processed: &DataFrame,
    summary: &mut AnalysisSummary,
) -> Result<()> {
    // Targets and leakage-prone derivatives stay out of the feature set.
    let features = feature_columns(
        processed,
        &[TOTAL_CLAIMS, LOSS_RATIO_COLUMN, "PremiumToClaimsRatio"],
    );
    if features.is_empty() {
        print_warning("No usable feature columns, skipping models");
        return Ok(());
    }

    let claims = processed.column(TOTAL_CLAIMS)?.cast(&DataType::Float64)?;
    let has_claim: Vec<bool> = claims
        .f64()?
        .into_iter()
        .map(|c| c.is_some_and(|c| c > 0.0))
        .collect();

    // Severity: regress claim amounts over the claim-bearing rows only.
    let mask = BooleanChunked::from_slice("has_claim".into(), &has_claim);
    let claim_rows = processed.filter(&mask)?;
    if claim_rows.height() < 10 {
        print_warning(&format!(
            "Only {} rows with claims, skipping severity model",
            claim_rows.height()
        ));
    } else {
        let spinner = create_spinner("Training severity model...");
        let x = design_matrix(&claim_rows, &features)?;
        let target = claim_rows.column(TOTAL_CLAIMS)?.cast(&DataType::Float64)?;
        let y: Vec<f64> = target.f64()?.into_iter().map(|v| v.unwrap_or(0.0)).collect();
        let (x_train, x_test, y_train, y_test) = split(&x, &y, cli.test_size, cli.seed);
        match train_evaluate_severity(severity_model, &x_train, &x_test, &y_train, &y_test) {
            Ok((report, _)) => {
                finish_with_success(
                    &spinner,
                    &format!(
                        "Severity {}: rmse {:.2}, r2 {:.3}",
                        cli.severity_model, report.rmse, report.r2
                    ),
                );
                summary.severity = Some((cli.severity_model.clone(), report));
            }
            Err(e) => {
                spinner.finish_and_clear();
                print_warning(&format!("Severity model failed: {e}"));
            }
        }
    }

    // Probability: classify "has any claim" over all rows.
    let y: Vec<i64> = has_claim.iter().map(|b| i64::from(*b)).collect();
    let classes = y.iter().any(|v| *v == 1) && y.iter().any(|v| *v == 0);
    if y.len() < 10 || !classes {
        print_warning("Claim labels are single-class or too few, skipping probability model");
        return Ok(());
    }
    let spinner = create_spinner("Training probability model...");
    let x = design_matrix(processed, &features)?;
    let (x_train, x_test, y_train, y_test) = split(&x, &y, cli.test_size, cli.seed);
    match train_evaluate_probability(probability_model, &x_train, &x_test, &y_train, &y_test) {
        Ok((report, _)) => {
            finish_with_success(
                &spinner,
                &format!(
                    "Probability {}: acc {:.3}, f1 {:.3}",
                    cli.probability_model, report.accuracy, report.f1
                ),
            );
            summary.probability = Some((cli.probability_model.clone(), report));
        }
        Err(e) => {
            spinner.finish_and_clear();
            print_warning(&format!("Probability model failed: {e}"));
        }
    }
    Ok(())
}

/// Render the standard chart set into the configured plots directory.
fn render_charts(cli: &Cli, df: &DataFrame, summary: &mut AnalysisSummary) -> Result<()> {
    let style = PlotStyle::default();
    let dir = &cli.plots_dir;
    let mut rendered = 0usize;

    plot_numerical_distribution(
        df,
        TOTAL_CLAIMS,
        &style,
        &dir.join("TotalClaims_distribution.png"),
    )?;
    rendered += 1;
    plot_numerical_distribution(
        df,
        TOTAL_PREMIUM,
        &style,
        &dir.join("TotalPremium_distribution.png"),
    )?;
    rendered += 1;

    for group in &cli.group_columns {
        if df.column(group).is_err() {
            continue;
        }
        plot_categorical_distribution(
            df,
            group,
            &style,
            &dir.join(format!("{group}_distribution.png")),
        )?;
        plot_loss_ratio_by_category(
            df,
            group,
            &style,
            &hypothesis_plot_path(dir, group, "LossRatio", "bar"),
        )?;
        plot_group_distribution(
            df,
            group,
            &cli.metric,
            &style,
            &hypothesis_plot_path(dir, group, &cli.metric, "box"),
        )?;
        rendered += 3;
    }

    if df.column(TRANSACTION_MONTH).is_ok() {
        plot_temporal_trend(
            df,
            TRANSACTION_MONTH,
            &style,
            &dir.join("monthly_transactions.png"),
        )?;
        rendered += 1;
    }

    let corr_cols: Vec<String> = [
        TOTAL_PREMIUM,
        TOTAL_CLAIMS,
        "SumInsured",
        "CalculatedPremiumPerTerm",
        LOSS_RATIO_COLUMN,
    ]
    .iter()
    .filter(|name| df.column(name).is_ok())
    .map(|name| name.to_string())
    .collect();
    plot_correlation_matrix(df, &corr_cols, &style, &dir.join("correlation_matrix.png"))?;
    rendered += 1;

    summary.charts_rendered = rendered;
    print_success(&format!("Rendered {rendered} charts to {}", dir.display()));
    Ok(())
}

/// Print the descriptive-statistics frame as an indented table.
fn print_stats_table(stats: &DataFrame) -> Result<()> {
    let names: Vec<String> = stats
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(names.clone());

    let labels = stats.column("statistic")?.str()?;
    for row in 0..stats.height() {
        let mut cells: Vec<String> = vec![labels.get(row).unwrap_or("").to_string()];
        for name in &names[1..] {
            let value = stats.column(name)?.f64()?.get(row);
            cells.push(match value {
                Some(v) => format!("{v:.2}"),
                None => "null".to_string(),
            });
        }
        table.add_row(cells);
    }
    for line in table.to_string().lines() {
        println!("    {line}");
    }
    Ok(())
}
