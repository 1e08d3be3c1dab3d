//! Pinboard CLI - share and browse pins from the terminal
//!
//! Works against the remote API when it is reachable and falls back to the
//! local store otherwise; the commands read the same either way.

mod error;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pinboard_core::config::Config;
use pinboard_core::gateway::UploadImage;
use pinboard_core::services::Services;
use pinboard_core::store::FileStore;
use pinboard_core::{Notification, Pin, User};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "pinboard")]
#[command(about = "Share and browse pins from the command line")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional path to the local data directory
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show whether the remote service is reachable
    Status,
    /// Create an account and sign in
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Sign in with email and password
    Login { email: String, password: String },
    /// Sign out
    Logout,
    /// Show the active session
    Whoami,
    /// List pins, most recent first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a new pin
    Add {
        /// Pin title
        title: String,
        /// Path to the image file
        image: PathBuf,
    },
    /// Retitle one of your pins
    Edit { id: String, title: String },
    /// Delete one of your pins
    Delete { id: String },
    /// Like or unlike a pin
    Like { id: String },
    /// List your notifications
    Notifications {
        /// Mark everything read afterwards
        #[arg(long)]
        read: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pinboard=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir)?;
    let config = Config::from_env(data_dir)?;
    let services = Services::open(&config)?;

    match cli.command {
        Commands::Status => run_status(&services).await,
        Commands::Register {
            username,
            email,
            password,
        } => {
            let user = services.auth.register(&username, &email, &password).await?;
            println!("Registered and signed in as {} ({})", user.username, user.role.as_str());
            Ok(())
        }
        Commands::Login { email, password } => {
            let user = services.auth.login(&email, &password).await?;
            println!("Signed in as {} ({})", user.username, user.role.as_str());
            Ok(())
        }
        Commands::Logout => {
            services.auth.logout()?;
            println!("Signed out");
            Ok(())
        }
        Commands::Whoami => {
            match services.auth.restore_session()? {
                Some(user) => print_user(&user),
                None => println!("Not logged in"),
            }
            Ok(())
        }
        Commands::List { json } => run_list(&services, json).await,
        Commands::Add { title, image } => {
            let user = require_session(&services)?;
            let image = UploadImage::read(&image).await?;
            let pin = services.pins.create(&title, image, &user.context()).await?;
            println!("Created pin {} \"{}\"", pin.id, pin.title);
            Ok(())
        }
        Commands::Edit { id, title } => {
            let user = require_session(&services)?;
            let pin = services.pins.update(&id, &title, &user.context()).await?;
            println!("Updated pin {} \"{}\"", pin.id, pin.title);
            Ok(())
        }
        Commands::Delete { id } => {
            let user = require_session(&services)?;
            services.pins.delete(&id, &user.context()).await?;
            println!("Deleted pin {id}");
            Ok(())
        }
        Commands::Like { id } => {
            let user = require_session(&services)?;
            let pin = services.pins.toggle_like(&id, &user.context()).await?;
            if pin.is_liked_by(&user.id) {
                println!("Liked \"{}\" ({} likes)", pin.title, pin.likers().len());
            } else {
                println!("Unliked \"{}\" ({} likes)", pin.title, pin.likers().len());
            }
            Ok(())
        }
        Commands::Notifications { read, json } => run_notifications(&services, read, json).await,
    }
}

async fn run_status(services: &Services<FileStore>) -> Result<(), CliError> {
    // Listing re-probes, which is exactly what status wants.
    services.pins.list().await?;
    if services.availability().is_remote() {
        println!("Remote service reachable: remote mode");
    } else {
        println!("Remote service not reachable: local store mode");
    }
    Ok(())
}

async fn run_list(services: &Services<FileStore>, json: bool) -> Result<(), CliError> {
    let pins = services.pins.list().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&pins)?);
        return Ok(());
    }
    if pins.is_empty() {
        println!("No pins yet");
        return Ok(());
    }
    for pin in &pins {
        println!("{}", format_pin_line(pin));
    }
    Ok(())
}

async fn run_notifications(
    services: &Services<FileStore>,
    read: bool,
    json: bool,
) -> Result<(), CliError> {
    let user = require_session(services)?;
    let ctx = user.context();
    let notifications = services.notifications.list(&ctx).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&notifications)?);
    } else if notifications.is_empty() {
        println!("No notifications");
    } else {
        let now = chrono::Utc::now().timestamp_millis();
        for notification in &notifications {
            println!("{}", format_notification_line(notification, now));
        }
    }
    if read {
        services.notifications.mark_all_read(&ctx).await?;
        println!("Marked all read");
    }
    Ok(())
}

fn require_session(services: &Services<FileStore>) -> Result<User, CliError> {
    services.auth.restore_session()?.ok_or(CliError::NotLoggedIn)
}

fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = env::var_os("PINBOARD_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("pinboard"))
        .ok_or(CliError::NoDataDir)
}

fn print_user(user: &User) {
    println!("{} <{}> role={}", user.username, user.email, user.role.as_str());
}

fn format_pin_line(pin: &Pin) -> String {
    let owner = pin.user_id.as_deref().unwrap_or("-");
    format!(
        "{}  \"{}\" by {} (owner: {}, likes: {})",
        pin.id,
        pin.title,
        pin.author,
        owner,
        pin.likers().len()
    )
}

fn format_notification_line(notification: &Notification, now: i64) -> String {
    let marker = if notification.is_read { " " } else { "*" };
    format!(
        "{} {} {} ({})",
        marker,
        notification.sender_name,
        notification.message,
        format_relative_time(notification.created_at, now)
    )
}

/// Compact "how long ago" label for notification lines.
fn format_relative_time(then_millis: i64, now_millis: i64) -> String {
    let elapsed = (now_millis - then_millis).max(0);
    let minutes = elapsed / 60_000;
    let hours = minutes / 60;
    let days = hours / 24;
    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        format!("{minutes}m ago")
    } else if days < 1 {
        format!("{hours}h ago")
    } else {
        format!("{days}d ago")
    }
}
