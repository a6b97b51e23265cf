use axum::{Router, http::StatusCode, routing::get};
use std::net::SocketAddr;
use std::time::Duration;
use zevermon::fetcher::{DeviceFetcher, HttpFetcher, fetch};
use zevermon::monitor::DeviceMonitor;
use zevermon::status::StatusSource;

const BODY: &str = "1\n1\nSN123\nREGKEY\nHW1.0\nSW2.0\n12:00 01/01/2024\n0\n1\nINV1\n350\n2.5\nOK\n";

async fn spawn_device(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn healthy_device() -> Router {
    Router::new().route("/home.cgi", get(|| async { BODY }))
}

#[tokio::test]
async fn fetches_status_page() {
    let addr = spawn_device(healthy_device()).await;
    let base = format!("http://{}/", addr);

    let fetcher = HttpFetcher::new(&base, Duration::from_secs(2)).unwrap();
    assert_eq!(fetcher.endpoint(), format!("http://{}/home.cgi", addr));
    assert_eq!(fetcher.fetch().await.unwrap(), BODY);

    // one-shot helper takes the base without a trailing slash as well
    let raw = fetch(&format!("http://{}", addr), Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(raw, BODY);
}

#[tokio::test]
async fn http_error_status_is_a_transport_error() {
    let router = Router::new().route(
        "/home.cgi",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_device(router).await;

    let err = fetch(&format!("http://{}", addr), Duration::from_secs(2))
        .await
        .unwrap_err();
    assert!(err.message.contains("500"), "{}", err);
    assert!(err.url.ends_with("/home.cgi"));
}

#[tokio::test]
async fn slow_device_times_out() {
    let router = Router::new().route(
        "/home.cgi",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            BODY
        }),
    );
    let addr = spawn_device(router).await;

    let started = std::time::Instant::now();
    let err = fetch(&format!("http://{}", addr), Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(err.message.contains("timed out"), "{}", err);
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    // bind and drop to get a port nobody listens on
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let result = fetch(&format!("http://{}", addr), Duration::from_secs(1)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn monitor_polls_a_real_device() {
    let addr = spawn_device(healthy_device()).await;
    let fetcher = HttpFetcher::new(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
    let mut monitor = DeviceMonitor::new(fetcher, chrono_tz::UTC);

    let status = monitor.poll().await;
    assert_eq!(status.source, StatusSource::Live);
    assert_eq!(status.device.serial_number, "SN123");
    assert_eq!(status.device.current_power_w, 350);
}
