use anyhow::{Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use form::{FormInput, validate};
use reqwest::Client;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "RELAY_URL", default_value = "http://127.0.0.1:3000")]
    relay_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a form locally, then send it to the relay.
    Submit {
        #[arg(long)]
        name: String,

        #[arg(long)]
        mobile: String,

        /// Date of birth, YYYY-MM-DD.
        #[arg(long)]
        dob: String,

        /// create, update or delete.
        #[arg(long, default_value = "create")]
        action: String,

        /// Send even if local validation fails, to exercise the relay's checks.
        #[arg(long)]
        skip_local_checks: bool,
    },

    /// Print every stored record.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let relay_url = args.relay_url.trim_end_matches('/');
    let client = Client::new();

    match args.command {
        Command::Submit {
            name,
            mobile,
            dob,
            action,
            skip_local_checks,
        } => {
            let input = FormInput {
                name: Some(name),
                mobile: Some(mobile),
                dob: Some(dob),
                action: Some(action),
            };

            match validate(&input, Local::now().date_naive()) {
                Ok(submission) => println!(
                    "Local checks passed: {} ({}), age {}",
                    submission.name, submission.action, submission.age
                ),
                Err(e) if skip_local_checks => println!("Local checks failed ({e}), sending anyway"),
                Err(e) => bail!("{e}"),
            }

            let response = client
                .post(format!("{relay_url}/api/post"))
                .json(&input)
                .send()
                .await?;

            print_response(response).await
        }
        Command::List => {
            let response = client.get(format!("{relay_url}/api/getdata")).send().await?;

            print_response(response).await
        }
    }
}

async fn print_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();
    let body: Value = response.json().await?;

    println!("Status: {status}\n");
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        bail!("relay answered {status}");
    }

    Ok(())
}
