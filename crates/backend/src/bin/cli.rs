use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared_types::{AccessTokenResponse, AuthUserResponse, CalendarEvent, GoogleLoginRequest};

#[derive(Parser)]
#[command(name = "calendar-cli")]
#[command(about = "CLI for signing in and reading tenant calendars via the backend API")]
#[command(
    long_about = "A command-line interface for the calendar backend server.\n\n\
    Exchanges a Google ID token for a session token, shows who a session belongs to,\n\
    and lists the calendar events of the session's tenant."
)]
struct Cli {
    /// Backend server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:3000",
        env = "CALENDAR_API_URL"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with a Google ID token and print the session token
    Login {
        /// Google ID token obtained from Google Sign-In
        #[arg(long, env = "GOOGLE_ID_TOKEN")]
        google_token: String,

        /// Tenant to sign into, required when the account belongs to several
        #[arg(short, long)]
        tenant: Option<String>,
    },
    /// Show the subject and tenant of a session
    Me {
        #[arg(long, env = "CALENDAR_ACCESS_TOKEN")]
        access_token: String,
    },
    /// List the calendar events of the session's tenant
    Events {
        #[arg(long, env = "CALENDAR_ACCESS_TOKEN")]
        access_token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli.base_url.trim_end_matches('/');

    match cli.command {
        Commands::Login {
            google_token,
            tenant,
        } => {
            let req = GoogleLoginRequest {
                token: google_token,
                tenant_id: tenant,
            };
            let response = client
                .post(format!("{}/auth/google", base_url))
                .json(&req)
                .send()
                .await
                .context("Failed to reach backend")?;
            let session: AccessTokenResponse = parse(response).await?;
            println!("{}", session.access_token);
        }
        Commands::Me { access_token } => {
            let response = client
                .get(format!("{}/auth/me", base_url))
                .bearer_auth(&access_token)
                .send()
                .await
                .context("Failed to reach backend")?;
            let me: AuthUserResponse = parse(response).await?;
            println!("subject: {}", me.subject_id);
            println!("tenant:  {}", me.tenant_id);
        }
        Commands::Events { access_token } => {
            let response = client
                .get(format!("{}/calendar/events", base_url))
                .bearer_auth(&access_token)
                .send()
                .await
                .context("Failed to reach backend")?;
            let events: Vec<CalendarEvent> = parse(response).await?;
            if events.is_empty() {
                println!("No events found.");
            } else {
                for event in events {
                    println!(
                        "[{}] {} {}",
                        &event.id.to_string()[..8],
                        event.starts_at.format("%Y-%m-%d %H:%M"),
                        event.title
                    );
                    if let Some(desc) = &event.description {
                        println!("    {}", desc);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn parse<T: DeserializeOwned>(response: Response) -> anyhow::Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("Request failed ({}): {}", status, body);
    }
    response.json().await.context("Invalid response body")
}
