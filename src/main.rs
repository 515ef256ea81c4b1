use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use newsdesk::{
    config::Config,
    http::{router, AppState},
    logging::init_logging,
};

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "Multilingual news site backed by a headless CMS")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    #[arg(short, long, default_value = "3000")]
    port: u16,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_logging(args.debug);

    let config = Config::from_env();
    let state = AppState::new(config).context("failed to load demo content")?;
    let app = router(state);

    let bind_addr = format!("{}:{}", args.host, args.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;

    info!("newsdesk started on {}", bind_addr);
    info!("   GraphQL proxy:  http://{}/api/graphql", bind_addr);
    info!("   Revalidation:   http://{}/api/revalidate", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
