use std::net::{IpAddr, SocketAddr};

use trader_gateway::{config, routes, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let settings = config::load();

    if settings.paper_accounts.is_empty() {
        tracing::warn!("PAPER_ACCOUNTS is empty; every login will be rejected");
    }

    let host: IpAddr = match settings.host.parse() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::error!(host = %settings.host, error = %e, "invalid HOST");
            std::process::exit(1);
        }
    };
    let addr = SocketAddr::from((host, settings.port));

    let state = match AppState::with_paper_venue(settings) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to set up paper venue");
            std::process::exit(1);
        }
    };

    let app = routes::app(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!("listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
