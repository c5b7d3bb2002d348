use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, router};
use echo_core::{CoreConfig, HemodynamicService, db_path_from_env_value};

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_STATIC_DIR: &str = "public";

/// Main entry point for the echo hemodynamics server
///
/// Serves the REST API, its Swagger UI and the browser client from the static directory.
///
/// # Environment Variables
/// - `PORT`: listening port (default: 3001). When taken, the next port is tried once.
/// - `ECHO_DB_PATH`: JSON store path (default: "db.json")
/// - `ECHO_STATIC_DIR`: browser client directory (default: "public"); skipped when missing
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - `PORT` is not a valid port number,
/// - neither the port nor its fallback can be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("echo_run=info".parse()?)
                .add_directive("echo_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = port_from_env_value(std::env::var("PORT").ok())?;
    let cfg = CoreConfig::new(db_path_from_env_value(std::env::var("ECHO_DB_PATH").ok()))?;
    let static_dir = static_dir_from_env_value(std::env::var("ECHO_STATIC_DIR").ok());

    tracing::info!("++ Using store {}", cfg.db_path().display());

    let static_dir = if static_dir.is_dir() {
        Some(static_dir)
    } else {
        tracing::warn!(
            "static directory {} not found, browser client disabled",
            static_dir.display()
        );
        None
    };

    let state = AppState::new(HemodynamicService::open(&cfg));
    let app = router(state, static_dir);

    let listener = bind_with_fallback(port).await?;
    tracing::info!(
        "++ Server running at http://localhost:{}",
        listener.local_addr()?.port()
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Binds `port`, or `port + 1` when `port` is already in use.
async fn bind_with_fallback(port: u16) -> anyhow::Result<TcpListener> {
    match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == ErrorKind::AddrInUse => {
            let fallback = port
                .checked_add(1)
                .ok_or_else(|| anyhow::anyhow!("port {} is in use and has no successor", port))?;
            tracing::warn!(
                "Port {} is already in use. Trying port {}...",
                port,
                fallback
            );
            Ok(TcpListener::bind(("0.0.0.0", fallback)).await?)
        }
        Err(e) => Err(e.into()),
    }
}

fn port_from_env_value(value: Option<String>) -> anyhow::Result<u16> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT '{}': {}", v, e)),
        None => Ok(DEFAULT_PORT),
    }
}

fn static_dir_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_to_3001() {
        assert_eq!(port_from_env_value(None).unwrap(), 3001);
        assert_eq!(port_from_env_value(Some(" ".into())).unwrap(), 3001);
        assert_eq!(port_from_env_value(Some("8080".into())).unwrap(), 8080);
        assert!(port_from_env_value(Some("http".into())).is_err());
    }

    #[test]
    fn static_dir_defaults_to_public() {
        assert_eq!(static_dir_from_env_value(None), PathBuf::from("public"));
        assert_eq!(
            static_dir_from_env_value(Some("/srv/echo".into())),
            PathBuf::from("/srv/echo")
        );
    }

    #[tokio::test]
    async fn falls_back_to_next_port_when_taken() {
        let taken = TcpListener::bind(("0.0.0.0", 0)).await.unwrap();
        let port = taken.local_addr().unwrap().port();
        if port == u16::MAX {
            return;
        }

        // The successor may itself be taken on a busy machine.
        match bind_with_fallback(port).await {
            Ok(listener) => assert_eq!(listener.local_addr().unwrap().port(), port + 1),
            Err(e) => assert!(e.to_string().contains("in use") || e.to_string().contains("Address")),
        }
    }
}
