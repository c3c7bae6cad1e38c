use pingora::server::Server;
use std::sync::Arc;
use toolbox_web::{App, IdGenerator, ServerConfig, build_app};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

fn main() {
    // INFO by default, override with RUST_LOG
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let generator = Arc::new(IdGenerator::new());
    let app = build_app(generator);
    let config = ServerConfig::default();

    tracing::info!(addr = %config.listen_addr, "starting toolbox server");
    tracing::info!("routes: GET /, GET /ids, POST /api/ids/new, GET /api/ids/decode/{{id}}");

    if let Err(e) = run_server(app, &config) {
        tracing::error!(error = %e, "server failed to start");
    }
}

fn run_server(app: App, config: &ServerConfig) -> std::io::Result<()> {
    let mut server = Server::new(None).map_err(|e| std::io::Error::other(e.to_string()))?;
    server.bootstrap();
    server.add_service(app.into_service(config));
    server.run_forever()
}
