use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::routing::get;
use std::io::Write;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;

use env_logger::Builder;
use log::{info, LevelFilter};
use tower_http::trace::{self, TraceLayer};
use tracing::Level as TracingLevel;

use sudoku_api::api;

async fn log_request_response(req: Request<Body>, next: Next) -> axum::response::Response {
    let path = req.uri().path().to_owned();
    let method = req.method().clone();
    let start = Instant::now();

    info!(">> Request started: {} {}", method, path);

    let response = next.run(req).await;

    let status = response.status();
    let duration = start.elapsed();

    info!(
        "<< Request completed: {} {} - Status: {} - Duration: {:.2?}",
        method, path, status, duration
    );

    response
}

#[tokio::main]
async fn main() {
    setup_logger();
    info!("Sudoku API starting...");

    let app = api::router()
        .route("/", get(|| async { "Sudoku API running!" }))
        .layer(middleware::from_fn(log_request_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(TracingLevel::INFO))
                .on_request(trace::DefaultOnRequest::new().level(TracingLevel::INFO))
                .on_response(trace::DefaultOnResponse::new().level(TracingLevel::INFO)),
        );

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn setup_logger() {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();
}
