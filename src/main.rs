use std::sync::Arc;

use eyre::Result;
use log::{error, info};
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::config::Config;
use crate::db::Sql;
use crate::repository::profiles::ProfileRepository;
use crate::repository::sessions::SessionRepository;
use crate::repository::users::UserRepository;
use crate::routes::Api;
use crate::service::auth::AuthService;
use crate::service::profiles::ProfileService;
use crate::service::sessions::SessionService;
use crate::service::users::UserService;

mod config;
mod db;
mod domain;
mod error;
mod extensions;
mod handlers;
mod repository;
mod routes;
mod service;
mod tables;

#[tokio::main]
async fn main() -> Result<()> {
    // setup log
    env_logger::init();
    info!("server starts with logging");

    let config = Config::from_env()?;

    // database
    let options = MySqlConnectOptions::new()
        .host(&config.mysql_host)
        .port(config.mysql_port)
        .username(&config.mysql_user)
        .password(&config.mysql_password)
        .database(&config.mysql_database);
    let pool = MySqlPoolOptions::new()
        .max_connections(config.mysql_max_connections)
        .connect_lazy_with(options);

    let migrations = tables::migrations(Some(config.mysql_database.clone()));
    info!(
        "Registered {} tables for database {}",
        migrations.tables().len(),
        migrations.database().unwrap_or_default()
    );
    let db = Arc::new(Sql::new(pool, migrations));

    // repositories
    let user_repository = Arc::new(UserRepository::new(db.clone()));
    let session_repository = Arc::new(SessionRepository::new(db.clone()));
    let profile_repository = Arc::new(ProfileRepository::new(db));

    // API
    let api = Api {
        user_service: UserService {
            user_repository: user_repository.clone(),
            session_repository: session_repository.clone(),
            profile_repository: profile_repository.clone(),
        },
        session_service: SessionService {
            user_repository: user_repository.clone(),
            session_repository: session_repository.clone(),
            session_ttl: config.session_ttl,
        },
        profile_service: ProfileService { profile_repository },
        auth_service: AuthService {
            user_repository,
            session_repository,
        },
    };

    let router = handlers::router(api, &config.api_version);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "listening on {} under /{}",
        listener.local_addr()?,
        config.api_version
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server gracefully stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutting down server...");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::process::Command;
    use std::time::Duration;

    #[tokio::test]
    async fn test_sigterm_triggers_shutdown() -> Result<()> {
        // keeps the default SIGTERM action from ending the test process
        let _guard = signal(SignalKind::terminate())?;
        let shutdown = tokio::spawn(shutdown_signal());
        // let the task install its handlers before the signal is sent
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let status = Command::new("kill")
            .args(["-TERM", &std::process::id().to_string()])
            .status()?;
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), shutdown).await??;
        Ok(())
    }
}
