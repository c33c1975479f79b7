// Example suite for the testenv harness.
// Usage: cargo run --bin testenv-demo -- [--config FILE] [--table | --json] [--color auto|always|never]

use std::path::PathBuf;

use clap::Parser;
use testenv::config::{ColorMode, HarnessConfig, ReportFormat};
use testenv::{named, Assert, Harness, TestError, TestOutcome, Value};

#[derive(Debug, Parser)]
#[command(
    name = "testenv-demo",
    version,
    about = "Runs the bundled example suite through the testenv harness."
)]
struct DemoArgs {
    /// JSON harness configuration; the flags below override it.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print results as a table.
    #[arg(long, conflicts_with = "json")]
    table: bool,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,
    /// When to color the output.
    #[arg(long, value_enum)]
    color: Option<ColorMode>,
}

impl DemoArgs {
    fn harness_config(&self) -> miette::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        if self.json {
            config.report = ReportFormat::Json;
        } else if self.table {
            config.report = ReportFormat::Table;
        }
        if let Some(color) = self.color {
            config.color = color;
        }
        Ok(config)
    }
}

fn check_if_pythagoras_was_right(t: &Assert) -> TestOutcome {
    t.are_equal(5 * 5, 3 * 3 + 4 * 4)?;
    Ok(())
}

fn simple_math(t: &Assert) -> TestOutcome {
    t.is_true(1 + 1 == 2)?;
    Ok(())
}

fn check_if_function(t: &Assert) -> TestOutcome {
    t.is_function(Value::function(""))?;
    Ok(())
}

fn long_execution(t: &Assert) -> TestOutcome {
    for i in 0..200 {
        for j in (i + 1)..1000 {
            t.is_false(i == j)?;
        }
    }
    Ok(())
}

fn error_test_fail(t: &Assert) -> TestOutcome {
    t.are_equal(1, 1)?;
    Ok(())
}

fn error_test_success(_: &Assert) -> TestOutcome {
    Err(TestError::raise(
        "Something went wrong, and this is what we wanted",
    ))
}

fn another_failing_test(_: &Assert) -> TestOutcome {
    Err(TestError::raise("This is not supposed to happen"))
}

fn build_suite(config: HarnessConfig) -> Harness {
    let mut harness = Harness::new().with_config(config);
    let (name, body) = named!(check_if_pythagoras_was_right);
    harness.add_test(name, body);
    let (name, body) = named!(simple_math);
    harness.add_test(name, body);
    let (name, body) = named!(check_if_function);
    harness.add_test(name, body);
    let (name, body) = named!(long_execution);
    harness.add_test(name, body);
    let (name, body) = named!(error_test_fail);
    harness.add_error_test(name, body);
    let (name, body) = named!(error_test_success);
    harness.add_error_test(name, body);
    let (name, body) = named!(another_failing_test);
    harness.add_test(name, body);
    harness
}

fn main() -> miette::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let args = DemoArgs::parse();
    let config = args.harness_config()?;

    let mut harness = build_suite(config);
    harness.run_tests().print_configured();

    if harness.failed_count() > 0 {
        std::process::exit(1);
    }
    Ok(())
}
