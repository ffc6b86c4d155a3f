use skybridge_api::{app, app_config::Config, clients, state::AppState};
use skybridge_core::{Coordinator, FirstArrivalRole, FlightResolver};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skybridge_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Skybridge API on port {}", config.server.port);

    let client = Arc::new(clients::MakerSuiteClient::new(&config.upstream)?);
    let forwarder = Arc::new(clients::MakerSuiteForwarder::new(client.clone()));

    let first_arrival_role = match config.round_trip.first_arrival.as_str() {
        "depart" => FirstArrivalRole::Depart,
        _ => FirstArrivalRole::Return,
    };

    let coordinator = Coordinator::new(
        FlightResolver::new(client),
        forwarder,
        chrono::Duration::seconds(config.round_trip.pending_ttl_seconds as i64),
        first_arrival_role,
    );

    let app_state = AppState {
        coordinator: Arc::new(coordinator),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
