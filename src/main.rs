//! Admin panel backend server. Reads configuration from a TOML file
//! (~/.config/admin-kit/config.toml).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use admin_kit::auth::hash_password;
use admin_kit::config::AppConfig;
use admin_kit::core::form::FormSchema;
use admin_kit::domain::{User, UserRole};
use admin_kit::interfaces::http::modules::forms::example_registry;
use admin_kit::shared::shutdown::ShutdownSignal;
use admin_kit::{create_api_router, default_config_path, InMemoryStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Configuration ──────────────────────────────────────────
    let config_path = std::env::var("ADMIN_KIT_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Loaded configuration from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!(
                "Could not read {}: {e}. Falling back to defaults.",
                config_path.display()
            );
            cfg
        }
    };

    info!("Starting Admin Kit server...");

    // The recorder must exist before the first counter!/gauge! call.
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Prometheus recorder install failed");
    info!("📊 Prometheus recorder ready");

    let jwt_config = config.jwt_config();
    info!("JWT tokens expire after {}h", jwt_config.expiration_hours);

    // ── Store ──────────────────────────────────────────────────
    let store: Arc<dyn Store> = Arc::new(InMemoryStore::with_demo_data());
    let collections = store.collection_names().await?;
    info!(
        "In-memory store seeded with {} collection(s)",
        collections.len()
    );

    seed_admin(store.as_ref(), &config).await;

    // ── Form registry ──────────────────────────────────────────
    let forms: Arc<HashMap<String, FormSchema>> = Arc::new(example_registry()?);
    info!("📋 {} form schema(s) registered", forms.len());

    // Shutdown signal, fired by SIGTERM/SIGINT
    let shutdown = ShutdownSignal::new();
    shutdown.spawn_os_listener();

    let api_router = create_api_router(store, jwt_config, &config, forms, prometheus_handle);

    let api_addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("Listening on http://{api_addr}");
    info!("Swagger UI at http://{api_addr}/docs/");
    info!("🚀 Ready. Ctrl+C to shut down.");

    let drain = shutdown.clone();
    let server = axum::serve(
        listener,
        api_router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        drain.wait().await;
        info!("🛑 Draining open connections");
    });

    // Bound the drain so a stuck connection cannot hold the process open
    let drain_deadline = async {
        shutdown.wait().await;
        tokio::time::sleep(Duration::from_secs(config.server.shutdown_timeout)).await;
    };

    let mut server_task = tokio::spawn(async move { server.await });
    tokio::select! {
        result = &mut server_task => result??,
        _ = drain_deadline => {
            warn!(
                "⚠️ Drain timed out after {}s, closing remaining connections",
                config.server.shutdown_timeout
            );
            server_task.abort();
        }
    }

    info!("👋 Admin Kit shutdown complete");
    Ok(())
}

/// Route `RUST_LOG` (or the configured fallback level) into the chosen format.
fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Provision the configured admin account when the user table is empty.
async fn seed_admin(store: &dyn Store, config: &AppConfig) {
    let users_count = store.count_users().await.unwrap_or(0);
    if users_count > 0 {
        return;
    }

    info!("No users found, seeding the admin account");

    let password_hash = match hash_password(&config.admin.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Admin password could not be hashed: {e}");
            return;
        }
    };

    let admin = User::new(
        config.admin.username.clone(),
        config.admin.email.clone(),
        password_hash,
        UserRole::Admin,
    );

    match store.create_user(admin).await {
        Ok(user) => {
            info!("Admin account {} created", user.email);
            warn!("⚠️  Change the seeded admin password before going live");
        }
        Err(e) => {
            error!("Admin seed failed: {e}");
        }
    }
}
