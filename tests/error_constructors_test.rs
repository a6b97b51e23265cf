use zevermon::error::ZeverError;
use zevermon::fetcher::TransportError;

#[test]
fn error_constructors() {
    assert!(matches!(ZeverError::config("x"), ZeverError::Config { .. }));
    assert!(matches!(ZeverError::io("x"), ZeverError::Io { .. }));
    assert!(matches!(ZeverError::network("x"), ZeverError::Network { .. }));
    assert!(matches!(ZeverError::timeout("x"), ZeverError::Timeout { .. }));
    assert!(matches!(ZeverError::protocol("x"), ZeverError::Protocol { .. }));
    assert!(matches!(ZeverError::web("x"), ZeverError::Web { .. }));
    assert!(matches!(
        ZeverError::validation("f", "m"),
        ZeverError::Validation { .. }
    ));
}

#[test]
fn transport_error_becomes_network_error() {
    let err: ZeverError = TransportError::new("http://dev/home.cgi", "connection refused").into();
    assert!(matches!(err, ZeverError::Network { .. }));
    let s = err.to_string();
    assert!(s.starts_with("Network error"));
    assert!(s.contains("http://dev/home.cgi"));
}

#[test]
fn io_error_converts() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: ZeverError = io.into();
    assert!(matches!(err, ZeverError::Io { .. }));
    assert_eq!(err.to_string(), "I/O error: gone");
}
