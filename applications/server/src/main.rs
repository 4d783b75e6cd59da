/// Cadence Server - Music streaming playlist backend
use cadence_core::{Role, User, UserId};
use cadence_server::{
    config::ServerConfig, create_router, services::AuthService, state::AppState,
};
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-server")]
#[command(about = "Cadence streaming playlist backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Register a user record for an auth-provider subject
    AddUser {
        /// Subject ID issued by the auth provider
        #[arg(short, long)]
        id: String,
        /// Display name
        #[arg(short, long)]
        name: String,
        /// Role (user or admin)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
    /// List all registered users
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            serve().await?;
        }
        Commands::AddUser { id, name, role } => {
            add_user(&id, &name, &role).await?;
        }
        Commands::ListUsers => {
            list_users().await?;
        }
    }

    Ok(())
}

async fn serve() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load()?;
    config.validate()?;

    tracing::info!("Starting Cadence Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database
    let pool = cadence_storage::create_pool(&config.storage.database_url).await?;
    cadence_storage::run_migrations(&pool).await?;
    tracing::info!("Database connected");

    // Initialize auth service
    let auth_service = Arc::new(AuthService::new(config.auth.jwt_secret.clone()));
    tracing::info!("Auth service initialized");

    // Build application state and router
    let app_state = AppState::new(pool, Arc::clone(&auth_service));
    let app = create_router(app_state, auth_service);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn add_user(id: &str, name: &str, role: &str) -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    let pool = cadence_storage::create_pool(&config.storage.database_url).await?;
    cadence_storage::run_migrations(&pool).await?;

    let role = Role::parse(role)
        .ok_or_else(|| anyhow::anyhow!("Invalid role '{role}' (expected 'user' or 'admin')"))?;

    let user_id = UserId::new(id.to_string());
    if cadence_storage::users::get_by_id(&pool, &user_id)
        .await?
        .is_some()
    {
        anyhow::bail!("User {id} already exists");
    }

    let user = User::with_id(user_id, name, role, chrono::Utc::now());
    cadence_storage::users::create(&pool, &user).await?;

    println!("Created user {} ({})", user.id, user.name);

    Ok(())
}

async fn list_users() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    let pool = cadence_storage::create_pool(&config.storage.database_url).await?;
    cadence_storage::run_migrations(&pool).await?;

    let users = cadence_storage::users::get_all(&pool).await?;

    println!("Users:");
    for user in users {
        println!("  {} - {} ({})", user.id, user.name, user.role.as_str());
    }

    Ok(())
}
