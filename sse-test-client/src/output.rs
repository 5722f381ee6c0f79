use colored::*;
use std::time::Duration;

#[derive(Debug)]
pub struct TestResult {
    pub scenario: String,
    pub passed: bool,
    pub message: Option<String>,
    pub duration: Duration,
}

impl TestResult {
    pub fn pass(scenario: &str, duration: Duration) -> Self {
        Self {
            scenario: scenario.to_string(),
            passed: true,
            message: None,
            duration,
        }
    }

    pub fn fail(scenario: &str, message: String, duration: Duration) -> Self {
        println!("{} {}", "✗".red(), message);
        Self {
            scenario: scenario.to_string(),
            passed: false,
            message: Some(message),
            duration,
        }
    }
}

pub fn print_data(label: &str, data: &str) {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(json) if json.is_object() => println!(
            "[{}] {}",
            label.bright_blue().bold(),
            json.to_string().dimmed()
        ),
        _ => println!("[{}] {}", label.bright_blue().bold(), data.yellow()),
    }
}

pub fn print_test_summary(results: &[TestResult]) {
    println!("\n{}", "=== TEST SUMMARY ===".bright_white().bold());

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    for result in results {
        let status = if result.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!("[{}] {} ({:?})", status, result.scenario, result.duration);

        if let Some(msg) = &result.message {
            println!("      {}", msg.dimmed());
        }
    }

    println!(
        "\n{}: {} passed, {} failed",
        "Results".bold(),
        passed.to_string().green(),
        failed.to_string().red()
    );
}
