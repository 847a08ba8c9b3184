use anyhow::Result;
use case_portal::{
    api::HttpAuthApi,
    config::PortalConfig,
    guard::{Navigation, RouteGuard},
    session::{FileSessionStore, SessionManager, SessionState},
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "case-portal")]
#[command(about = "Office portal client for the case service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./case-portal.yaml when present)
    #[arg(short, long, global = true, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Revalidate the stored session and show who is signed in
    Status,
    /// Show what a portal path would display
    Open { path: String },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    let cli = Cli::parse();
    let config = PortalConfig::load_from(cli.config.as_deref())?;

    let api = Arc::new(HttpAuthApi::new(&config)?);
    let store = Arc::new(FileSessionStore::new(&config.session_file));
    let manager = SessionManager::new(api, store);

    match cli.command {
        Commands::Login { email, password } => {
            let session = manager.login(&email, &password).await?;
            println!(
                "Signed in as {} <{}> ({})",
                session.user.name, session.user.email, session.user.role
            );
        }
        Commands::Logout => {
            manager.logout().await?;
            println!("Signed out");
        }
        Commands::Status => {
            let state = manager.bootstrap().await?;
            print_state(&state);
        }
        Commands::Open { path } => {
            let mut guard = RouteGuard::new(manager.subscribe(), &config);
            let (state, navigation) = tokio::join!(manager.bootstrap(), guard.resolve(&path));
            state?;
            match navigation {
                Navigation::Render(route) => println!("render {:?}", route),
                Navigation::Loading => println!("loading"),
                Navigation::Redirect(to) => println!("redirect {}", to),
                Navigation::NotFound => println!("not found: {}", path),
            }
        }
    }

    Ok(())
}

fn print_state(state: &SessionState) {
    match state.session() {
        Some(session) if session.verified => println!(
            "Signed in as {} <{}> ({})",
            session.user.name, session.user.email, session.user.role
        ),
        Some(session) => println!(
            "Signed in as {} <{}> ({}), offline: session not verified",
            session.user.name, session.user.email, session.user.role
        ),
        None => println!("Not signed in"),
    }
}
