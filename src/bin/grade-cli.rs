use clap::{Parser, Subcommand};
use grade_relay::Student;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "grade-cli")]
#[command(about = "Command-line client for the grade relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a student's grades and print the aggregated summary
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0.0)]
        math: f64,
        #[arg(long, default_value_t = 0.0)]
        english: f64,
        #[arg(long, default_value_t = 0.0)]
        history: f64,
        #[arg(long, default_value_t = 0.0)]
        science: f64,
    },
    /// Check relay health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Submit {
            name,
            math,
            english,
            history,
            science,
        } => {
            let student = Student {
                name: Some(name),
                math_grade: math,
                english_grade: english,
                history_grade: history,
                science_grade: science,
            };
            let res = client
                .post(format!("{}/student", cli.url))
                .json(&student)
                .send()
                .await?;

            let status = res.status();
            let text = res.text().await?;
            ensure_success(status, &text)?;
            println!("{}", text);
        }
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            let status = res.status();
            let text = res.text().await?;
            ensure_success(status, &text)?;
            let json: Value = serde_json::from_str(&text)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

/// Turns a non-2xx relay reply into an error so the process exits non-zero.
fn ensure_success(status: reqwest::StatusCode, body: &str) -> Result<(), Box<dyn std::error::Error>> {
    if status.is_success() {
        return Ok(());
    }
    if body.is_empty() {
        Err(format!("relay returned status {}", status).into())
    } else {
        Err(format!("relay returned status {}: {}", status, body).into())
    }
}
