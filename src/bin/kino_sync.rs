// src/bin/kino_sync.rs
// DOCUMENTATION: Operator tool that drives the sync endpoints of a running server
// PURPOSE: Refresh the catalogue, sync cinemas and films, plan sessions, print a summary
//
// Usage: kino-sync [--skip-refresh] [--days N]

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use reqwest::{Client, Method};
use serde_json::Value;
use std::env;
use std::process;
use std::time::{Duration, Instant};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// One call against the server
#[derive(Debug, Clone)]
struct SyncStep {
    label: &'static str,
    icon: &'static str,
    method: Method,
    path: String,
}

#[derive(Debug)]
struct StepResult {
    label: &'static str,
    icon: &'static str,
    success: bool,
    detail: String,
    duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Options {
    skip_refresh: bool,
    days: u32,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut options = Options {
        skip_refresh: false,
        days: 7,
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--skip-refresh" => options.skip_refresh = true,
            "--days" => {
                let value = iter.next().context("--days needs a value")?;
                options.days = value
                    .parse()
                    .with_context(|| format!("invalid --days value: {}", value))?;
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(options)
}

fn plan(options: &Options) -> Vec<SyncStep> {
    let mut steps = Vec::new();
    if !options.skip_refresh {
        steps.push(SyncStep {
            label: "Full refresh",
            icon: "🔄",
            method: Method::POST,
            path: "/api/admin/refresh".to_string(),
        });
    }
    steps.push(SyncStep {
        label: "Cinemas and halls",
        icon: "🏢",
        method: Method::GET,
        path: "/api/apollo-kino/sync-cinemas".to_string(),
    });
    steps.push(SyncStep {
        label: "Films",
        icon: "🎬",
        method: Method::GET,
        path: "/api/apollo-kino/sync".to_string(),
    });
    steps.push(SyncStep {
        label: "Upcoming sessions",
        icon: "📅",
        method: Method::POST,
        path: format!("/api/admin/sessions/generate?days={}", options.days),
    });
    steps
}

/// One line describing a step's response body
fn describe(label: &str, body: &Value) -> String {
    let n = |v: &Value| v.as_u64().unwrap_or(0);
    match label {
        "Full refresh" => {
            let data = &body["data"];
            format!(
                "{} cinemas, {} films, {} sessions ({} sample), {} shows skipped",
                n(&data["cinemasCreated"]),
                n(&data["filmsCreated"]),
                n(&data["sessionsCreated"]),
                n(&data["sampleSessionsCreated"]),
                n(&data["skippedShows"])
            )
        }
        "Cinemas and halls" => {
            let results = &body["results"];
            format!(
                "{} cinemas added, {} updated, {} halls regenerated",
                n(&results["cinemas"]["added"]),
                n(&results["cinemas"]["updated"]),
                n(&results["seats"]["regenerated"])
            )
        }
        "Films" => {
            let movies = &body["results"]["movies"];
            format!(
                "{} added, {} updated, {} failed",
                n(&movies["added"]),
                n(&movies["updated"]),
                movies["errors"].as_array().map(Vec::len).unwrap_or(0)
            )
        }
        _ => body["message"].as_str().unwrap_or("done").to_string(),
    }
}

struct KinoSyncManager {
    base_url: String,
    admin_token: String,
    client: Client,
    results: Vec<StepResult>,
}

impl KinoSyncManager {
    fn new(base_url: String, admin_token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url,
            admin_token,
            client,
            results: Vec::new(),
        })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn call(&self, step: &SyncStep) -> Result<Value> {
        let url = format!("{}{}", self.base_url, step.path);
        let mut request = self.client.request(step.method.clone(), &url);
        if !self.admin_token.is_empty() {
            request = request.header("X-Admin-Token", &self.admin_token);
        }

        let response = request.send().await.with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("invalid JSON from {}", url))?;

        if !status.is_success() {
            let message = body["error"]["message"].as_str().unwrap_or("unknown error");
            bail!("HTTP {} - {}", status, message);
        }
        Ok(body)
    }

    async fn run(&mut self, options: &Options) {
        println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
        if !self.check_service_health().await {
            println!("{}❌ Service unavailable at {}.{}", RED, self.base_url, RESET);
            println!("{}Please ensure kino-booking is running{}", YELLOW, RESET);
            process::exit(1);
        }
        println!("{}✅ Service available{}\n", GREEN, RESET);

        let steps = plan(options);
        self.print_header(steps.len());

        for (i, step) in steps.iter().enumerate() {
            let start_time = Instant::now();
            println!(
                "{}[{}/{}] {} {}...{}",
                CYAN,
                i + 1,
                steps.len(),
                step.icon,
                step.label,
                RESET
            );

            let outcome = self.call(step).await;
            let duration = start_time.elapsed().as_secs_f64();

            let result = match outcome {
                Ok(body) => {
                    let detail = describe(step.label, &body);
                    println!("{}✅ {} ({:.1}s){}", GREEN, detail, duration, RESET);
                    StepResult {
                        label: step.label,
                        icon: step.icon,
                        success: true,
                        detail,
                        duration_secs: duration,
                    }
                }
                Err(e) => {
                    println!("{}❌ {} failed: {:#}{}", RED, step.label, e, RESET);
                    StepResult {
                        label: step.label,
                        icon: step.icon,
                        success: false,
                        detail: format!("{:#}", e),
                        duration_secs: duration,
                    }
                }
            };
            self.results.push(result);
        }

        self.print_summary();
    }

    fn print_header(&self, total: usize) {
        println!("{}╔══════════════════════════════════════════════════════════════╗{}", CYAN, RESET);
        println!("{}║   🎟️  Apollo Kino catalogue sync                              ║{}", CYAN, RESET);
        println!("{}╚══════════════════════════════════════════════════════════════╝{}", CYAN, RESET);
        println!("\n{}📊 Steps to run: {}{}", BOLD, total, RESET);
    }

    fn print_summary(&self) {
        println!("\n\n{}📋 Sync Summary{}", BOLD, RESET);
        println!("──────────────────────────────────────────────────────────────────────────────");
        println!("{:<26} {:<8} {:>9}  {}", "Step", "Status", "Duration", "Result");
        println!("──────────────────────────────────────────────────────────────────────────────");

        for res in &self.results {
            let status_icon = if res.success { "✅" } else { "❌" };
            println!(
                "{:<26} {:<8} {:>8.1}s  {}",
                format!("{} {}", res.icon, res.label),
                status_icon,
                res.duration_secs,
                res.detail
            );
        }
        println!("──────────────────────────────────────────────────────────────────────────────");

        let failed = self.results.iter().filter(|r| !r.success).count();
        if failed == 0 {
            println!("\n{}✨ Sync completed successfully{}", GREEN, RESET);
        } else {
            println!("\n{}⚠️  {} step(s) failed{}", YELLOW, failed, RESET);
        }
    }

    fn failed(&self) -> bool {
        self.results.iter().any(|r| !r.success)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let admin_token = env::var("ADMIN_TOKEN").unwrap_or_default();
    if admin_token.is_empty() {
        println!("{}⚠️  ADMIN_TOKEN not set; admin calls are sent without a token{}", YELLOW, RESET);
    }
    let base_url = env::var("KINO_API_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

    let mut manager = KinoSyncManager::new(base_url.trim_end_matches('/').to_string(), admin_token)?;
    manager.run(&options).await;

    if manager.failed() {
        process::exit(2);
    }
    Ok(())
}
