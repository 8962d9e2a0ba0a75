//! Daycare CLI
//!
//! Command-line client for the Daycare API:
//! - Manage the roster
//! - Mark attendance
//! - File, browse and edit daily reports
//! - Edit theme tags and the parents note

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "daycare-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Command-line client for the Daycare API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show server status
    Status,

    /// List children on the roster
    Children,

    /// Add a child to the roster
    AddChild {
        name: String,
        email: String,
        /// Second parent email
        #[arg(long)]
        email2: Option<String>,
    },

    /// Import children from a CSV file with a name,email,email2 header
    ImportRoster { path: PathBuf },

    /// Show today's board: every child, their mark and report state
    Attendance,

    /// Mark a child present or absent for today
    Mark {
        child: String,
        /// present or absent
        status: String,
    },

    /// List children who still need a report today
    Available,

    /// Show the prefill for a child's report
    Draft { child: String },

    /// Submit a report from a JSON file
    Submit { path: PathBuf },

    /// List reports for a date
    Reports {
        /// YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Show a report
    Show { id: String },

    /// Apply an edit from a JSON file to a report
    Edit { id: String, path: PathBuf },

    /// Show theme tags, today's themes and today's note
    Themes,

    /// Add a theme tag
    AddTag { tag: String },

    /// Remove a theme tag
    RemoveTag { tag: String },

    /// Set today's themes
    DayThemes { tags: Vec<String> },

    /// Save the common parents note for today
    Note { text: String },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

struct Api {
    client: reqwest::Client,
    base: String,
}

impl Api {
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base.trim_end_matches('/'), path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<Value> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Cannot connect to Daycare API at {}", self.base))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or(text);
            bail!("Failed ({}): {}", status, message);
        }
        Ok(body)
    }

    async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }
}

fn read_json(path: &PathBuf) -> anyhow::Result<Value> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn seg(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api = Api {
        client: reqwest::Client::new(),
        base: cli.api_url.clone(),
    };
    let json_out = cli.format == "json";

    let output = match cli.command {
        Commands::Status => {
            let response = api
                .client
                .get(format!("{}/health", api.base.trim_end_matches('/')))
                .send()
                .await
                .with_context(|| format!("Cannot connect to Daycare API at {}", api.base))?;
            let health: Value = response.json().await?;
            if !json_out {
                println!("Daycare v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                println!("Store: {}", health["store"].as_str().unwrap_or("unknown"));
                if let Some(uptime) = health["uptime_seconds"].as_u64() {
                    println!("Uptime: {}", format_duration(uptime));
                }
                return Ok(());
            }
            health
        }

        Commands::Children => {
            let data = api.get("/children").await?;
            if !json_out {
                print_children(&data);
                return Ok(());
            }
            data
        }

        Commands::AddChild {
            name,
            email,
            email2,
        } => {
            let child = api
                .post(
                    "/children",
                    &json!({ "name": name, "email": email, "email2": email2 }),
                )
                .await?;
            if !json_out {
                println!("Added {}", child["name"].as_str().unwrap_or(&name));
                return Ok(());
            }
            child
        }

        Commands::ImportRoster { path } => {
            let rows = daycare::domain::roster::parse_roster_csv(
                std::fs::File::open(&path).with_context(|| format!("File not found: {:?}", path))?,
            )?;
            println!("Read {} rows from {:?}", rows.len(), path);

            let body = std::fs::read_to_string(&path)?;
            let summary = api
                .send(
                    api.client
                        .post(api.url("/children/import"))
                        .header("Content-Type", "text/csv")
                        .body(body),
                )
                .await?;
            if !json_out {
                println!("  Added: {}", summary["added"].as_u64().unwrap_or(0));
                println!("  Skipped: {}", summary["skipped"].as_u64().unwrap_or(0));
                for error in summary["errors"].as_array().into_iter().flatten() {
                    println!("  Error: {}", error.as_str().unwrap_or("-"));
                }
                return Ok(());
            }
            summary
        }

        Commands::Attendance => {
            let board = api.get("/attendance/board").await?;
            let summary = api.get("/attendance/summary").await?;
            if !json_out {
                print_attendance(&board, &summary);
                return Ok(());
            }
            json!({ "board": board, "summary": summary })
        }

        Commands::Mark { child, status } => {
            let entry = api
                .put(
                    &format!("/attendance/{}", seg(&child)),
                    &json!({ "status": status.to_lowercase() }),
                )
                .await?;
            if !json_out {
                println!(
                    "Marked {} {} at {}",
                    child,
                    entry["status"].as_str().unwrap_or(&status),
                    entry["time"].as_str().unwrap_or("-")
                );
                return Ok(());
            }
            entry
        }

        Commands::Available => {
            let data = api.get("/reports/available").await?;
            if !json_out {
                let children = data["children"].as_array().cloned().unwrap_or_default();
                if children.is_empty() {
                    println!("No children waiting for a report.");
                } else {
                    for child in children {
                        println!("{}", child.as_str().unwrap_or("-"));
                    }
                }
                return Ok(());
            }
            data
        }

        Commands::Draft { child } => api.get(&format!("/reports/draft/{}", seg(&child))).await?,

        Commands::Submit { path } => {
            let form = read_json(&path)?;
            let created = api.post("/reports", &form).await?;
            if !json_out {
                println!(
                    "Submitted report {}",
                    created["id"].as_str().unwrap_or("-")
                );
                return Ok(());
            }
            created
        }

        Commands::Reports { date } => {
            let path = match &date {
                Some(d) => format!("/reports?date={}", seg(d)),
                None => "/reports".to_string(),
            };
            let data = api.get(&path).await?;
            if !json_out {
                print_reports(&data);
                return Ok(());
            }
            data
        }

        Commands::Show { id } => api.get(&format!("/reports/{}", seg(&id))).await?,

        Commands::Edit { id, path } => {
            let edit = read_json(&path)?;
            api.send(
                api.client
                    .patch(api.url(&format!("/reports/{}", seg(&id))))
                    .json(&edit),
            )
            .await?
        }

        Commands::Themes => api.get("/themes").await?,

        Commands::AddTag { tag } => api.post("/themes/tags", &json!({ "tag": tag })).await?,

        Commands::RemoveTag { tag } => {
            api.send(
                api.client
                    .delete(api.url(&format!("/themes/tags/{}", seg(&tag)))),
            )
            .await?
        }

        Commands::DayThemes { tags } => {
            let tags: Vec<String> = tags
                .iter()
                .flat_map(|t| t.split(',').map(|s| s.trim().to_string()))
                .filter(|s| !s.is_empty())
                .collect();
            api.put("/themes/day", &json!({ "themes": tags })).await?
        }

        Commands::Note { text } => api.put("/themes/note", &json!({ "note": text })).await?,

        Commands::Config { output } => {
            let config = daycare::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}

fn print_children(data: &Value) {
    let children = data["children"].as_array().cloned().unwrap_or_default();
    if children.is_empty() {
        println!("No children on the roster yet.");
        println!();
        println!("Add one with:");
        println!("  daycare-cli add-child Alice alice.parent@example.com");
        return;
    }

    println!("{:<20} {:<30} {}", "Name", "Email", "Email 2");
    println!("{}", "-".repeat(75));
    for child in children {
        println!(
            "{:<20} {:<30} {}",
            child["name"].as_str().unwrap_or("-"),
            child["email"].as_str().unwrap_or("-"),
            child["email2"].as_str().unwrap_or("")
        );
    }
}

fn print_attendance(board: &Value, summary: &Value) {
    println!(
        "{}  {}/{} Done  ({} present, {} absent)",
        board["date"].as_str().unwrap_or("-"),
        summary["marked"].as_u64().unwrap_or(0),
        summary["total"].as_u64().unwrap_or(0),
        summary["present"].as_u64().unwrap_or(0),
        summary["absent"].as_u64().unwrap_or(0)
    );
    println!("Theme of the week: {}", join_strings(&board["theme"]));
    println!("Theme of the day: {}", join_strings(&board["themeOfTheDay"]));
    println!();

    for child in board["children"].as_array().into_iter().flatten() {
        let marked = match (child["status"].as_str(), child["time"].as_str()) {
            (Some(status), Some(time)) => format!("Marked {} at {}", status, time),
            _ => "Not marked".to_string(),
        };
        let reported = if child["reported"].as_bool().unwrap_or(false) {
            "\u{2713}"
        } else {
            ""
        };
        println!(
            "{:<20} {:<28} {}",
            child["name"].as_str().unwrap_or("-"),
            marked,
            reported
        );
    }
}

fn join_strings(value: &Value) -> String {
    let items: Vec<&str> = value
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect();
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

fn print_reports(data: &Value) {
    let reports = data["reports"].as_array().cloned().unwrap_or_default();
    if reports.is_empty() {
        println!(
            "No reports for {}",
            data["date"].as_str().unwrap_or("the selected date")
        );
        return;
    }

    println!("{:<20} {:<10} {:<10} {}", "Child", "In", "Out", "ID");
    println!("{}", "-".repeat(70));
    for report in reports {
        println!(
            "{:<20} {:<10} {:<10} {}",
            report["childName"].as_str().unwrap_or("-"),
            report["inTime"].as_str().unwrap_or("-"),
            report["outTime"].as_str().unwrap_or("-"),
            report["id"].as_str().unwrap_or("-")
        );
    }
}
