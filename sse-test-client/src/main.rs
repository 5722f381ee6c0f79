use anyhow::Result;
use clap::Parser;
use colored::*;

mod output;
mod scenarios;
mod sse_client;

use output::print_test_summary;

#[derive(Parser)]
#[command(name = "sse-test-client")]
#[command(about = "Event stream integration testing tool")]
struct Cli {
    /// Base URL of the backend (e.g., http://localhost:4000)
    #[arg(long)]
    base_url: String,

    /// Test scenario to run
    #[arg(long, value_enum)]
    scenario: ScenarioChoice,

    /// Number of counter values to check on the open-ended stream
    #[arg(long, default_value_t = 3)]
    counter_events: usize,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone)]
enum ScenarioChoice {
    /// Open-ended counter stream on /stream
    Counter,
    /// Bounded stream with greeting and terminal notice on /stream/test
    Bounded,
    /// JSON stream with padding frames on /stream/postman
    Postman,
    /// Run every scenario
    All,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }

    println!("{}", "=== TEST PHASE ===".bright_white().bold());
    println!("{} Target: {}", "→".blue(), cli.base_url);

    let mut results = Vec::new();

    match cli.scenario {
        ScenarioChoice::Counter => {
            results.push(scenarios::test_counter_stream(&cli.base_url, cli.counter_events).await?);
        }
        ScenarioChoice::Bounded => {
            results.push(scenarios::test_bounded_stream(&cli.base_url).await?);
        }
        ScenarioChoice::Postman => {
            results.push(scenarios::test_postman_stream(&cli.base_url).await?);
        }
        ScenarioChoice::All => {
            results.push(scenarios::test_counter_stream(&cli.base_url, cli.counter_events).await?);
            results.push(scenarios::test_bounded_stream(&cli.base_url).await?);
            results.push(scenarios::test_postman_stream(&cli.base_url).await?);
        }
    }

    print_test_summary(&results);

    let all_passed = results.iter().all(|r| r.passed);

    if all_passed {
        println!("\n{}", "All tests passed! ✓".bright_green().bold());
    } else {
        println!("\n{}", "Some tests failed! ✗".bright_red().bold());
    }

    std::process::exit(if all_passed { 0 } else { 1 });
}
