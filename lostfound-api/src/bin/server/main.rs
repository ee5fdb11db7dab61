use std::sync::Arc;

use auth::Authenticator;
use lostfound_api::config::AdminConfig;
use lostfound_api::config::Config;
use lostfound_api::domain::user::models::CreateUserCommand;
use lostfound_api::domain::user::models::EmailAddress;
use lostfound_api::domain::user::models::Password;
use lostfound_api::domain::user::models::Profile;
use lostfound_api::domain::user::models::Role;
use lostfound_api::domain::user::models::Username;
use lostfound_api::domain::user::ports::UserServicePort;
use lostfound_api::domain::user::service::UserService;
use lostfound_api::inbound::http::router::create_router;
use lostfound_api::outbound::repositories::PostgresUserRepository;
use lostfound_api::user::errors::UserError;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lostfound_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "lostfound-api",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        token_ttl_hours = config.jwt.expiration_hours,
        admin_bootstrap = config.admin.is_some(),
        "Configuration loaded"
    );

    if config.jwt.is_secret_weak() {
        tracing::warn!(
            recommended_bytes = lostfound_api::config::JwtConfig::RECOMMENDED_SECRET_BYTES,
            "Token signing secret is shorter than recommended"
        );
    }

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::with_token_ttl(
        config.jwt.secret.as_bytes(),
        config.jwt.token_ttl(),
    ));
    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let user_service = Arc::new(UserService::new(
        user_repository,
        Arc::clone(&authenticator),
    ));

    if let Some(admin) = &config.admin {
        bootstrap_admin(user_service.as_ref(), admin).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");

    Ok(())
}

/// Make sure the configured administrator account exists.
async fn bootstrap_admin(
    user_service: &dyn UserServicePort,
    admin: &AdminConfig,
) -> Result<(), anyhow::Error> {
    let command = CreateUserCommand {
        username: Username::new(admin.username.clone())?,
        email: EmailAddress::new(admin.email.clone())?,
        password: Password::new(admin.password.clone()),
        role: Role::Admin,
        profile: Profile::default(),
    };

    match user_service.create_user(command).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "Bootstrap administrator created");
            Ok(())
        }
        Err(UserError::EmailAlreadyExists(_)) => {
            tracing::debug!("Bootstrap administrator already present");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
