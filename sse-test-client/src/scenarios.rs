use anyhow::Result;
use colored::*;
use std::time::{Duration, Instant};

use crate::output::{print_data, TestResult};
use crate::sse_client::{Connection, Received};

/// Longest gap between two events before a scenario gives up.
const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// `/stream` must send a heartbeat and then consecutive counter values.
pub async fn test_counter_stream(base_url: &str, events: usize) -> Result<TestResult> {
    let start = Instant::now();
    let scenario = "counter_stream";
    println!("\n{}", "=== TEST: Counter Stream ===".bright_cyan().bold());

    let mut sse = Connection::open(base_url, "/stream", "counter".to_string()).await?;

    match sse.next(EVENT_TIMEOUT).await? {
        Received::Comment(comment) => println!("{} Heartbeat received ({})", "✓".green(), comment),
        other => {
            return Ok(TestResult::fail(
                scenario,
                format!("Expected a heartbeat comment first, got {:?}", other),
                start.elapsed(),
            ))
        }
    }

    let mut previous: Option<i64> = None;
    for _ in 0..events {
        let Some(data) = sse.next_data(EVENT_TIMEOUT).await? else {
            return Ok(TestResult::fail(
                scenario,
                "Open-ended stream closed by the server".to_string(),
                start.elapsed(),
            ));
        };
        print_data(&sse.label, &data);

        let value: i64 = match data.parse() {
            Ok(value) => value,
            Err(_) => {
                return Ok(TestResult::fail(
                    scenario,
                    format!("Expected a counter value, got {:?}", data),
                    start.elapsed(),
                ))
            }
        };
        if let Some(previous) = previous {
            if value != previous + 1 {
                return Ok(TestResult::fail(
                    scenario,
                    format!("Counter jumped from {} to {}", previous, value),
                    start.elapsed(),
                ));
            }
        }
        previous = Some(value);
    }

    println!("{} {} consecutive values received", "✓".green(), events);
    Ok(TestResult::pass(scenario, start.elapsed()))
}

/// `/stream/test` must greet, count from 1 and close after its notice.
pub async fn test_bounded_stream(base_url: &str) -> Result<TestResult> {
    let start = Instant::now();
    let scenario = "bounded_stream";
    println!("\n{}", "=== TEST: Bounded Stream ===".bright_cyan().bold());

    let mut sse = Connection::open(base_url, "/stream/test", "test".to_string()).await?;

    let greeting = sse.next_data(EVENT_TIMEOUT).await?;
    if greeting.as_deref() != Some("Connected to SSE stream") {
        return Ok(TestResult::fail(
            scenario,
            format!("Unexpected greeting {:?}", greeting),
            start.elapsed(),
        ));
    }

    let mut expected = 1;
    loop {
        let Some(data) = sse.next_data(EVENT_TIMEOUT).await? else {
            return Ok(TestResult::fail(
                scenario,
                "Stream ended without a terminal notice".to_string(),
                start.elapsed(),
            ));
        };
        print_data(&sse.label, &data);

        if data == "Stream ended" {
            break;
        }
        if data != format!("Message number: {}", expected) {
            return Ok(TestResult::fail(
                scenario,
                format!("Expected message {}, got {:?}", expected, data),
                start.elapsed(),
            ));
        }
        expected += 1;
    }

    if sse.next(EVENT_TIMEOUT).await? != Received::Ended {
        return Ok(TestResult::fail(
            scenario,
            "Server kept sending after the terminal notice".to_string(),
            start.elapsed(),
        ));
    }

    println!("{} {} messages, then a clean close", "✓".green(), expected - 1);
    Ok(TestResult::pass(scenario, start.elapsed()))
}

/// `/stream/postman` must send JSON counters separated by padding frames.
pub async fn test_postman_stream(base_url: &str) -> Result<TestResult> {
    let start = Instant::now();
    let scenario = "postman_stream";
    println!("\n{}", "=== TEST: Postman Stream ===".bright_cyan().bold());

    let mut sse = Connection::open(base_url, "/stream/postman", "postman".to_string()).await?;

    let mut expected = 1;
    let mut preamble = 0;
    loop {
        let Some(data) = sse.next_data(EVENT_TIMEOUT).await? else {
            return Ok(TestResult::fail(
                scenario,
                "Stream ended without a terminal notice".to_string(),
                start.elapsed(),
            ));
        };

        if data == "Stream completed!" {
            print_data(&sse.label, &data);
            break;
        }
        if !data.is_empty() && data.chars().all(|c| c == '.') {
            continue;
        }

        match serde_json::from_str::<serde_json::Value>(&data) {
            Ok(json) if json.is_object() => {
                print_data(&sse.label, &data);
                let message = json["message"].as_str().unwrap_or_default();
                if message != format!("Counter: {}", expected) {
                    return Ok(TestResult::fail(
                        scenario,
                        format!("Expected counter {}, got {:?}", expected, message),
                        start.elapsed(),
                    ));
                }
                expected += 1;
            }
            _ if expected == 1 => preamble += 1,
            _ => {
                return Ok(TestResult::fail(
                    scenario,
                    format!("Unexpected text frame {:?} mid-stream", data),
                    start.elapsed(),
                ))
            }
        }
    }

    println!(
        "{} {} preamble frames, {} JSON messages",
        "✓".green(),
        preamble,
        expected - 1
    );
    Ok(TestResult::pass(scenario, start.elapsed()))
}
