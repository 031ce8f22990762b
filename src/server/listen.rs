use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;
use tracing::warn;

/// Binds `port`, then each of `fallback_ports` in order.
pub async fn bind_with_fallback(
    addr: IpAddr,
    port: u16,
    fallback_ports: &[u16],
) -> std::io::Result<TcpListener> {
    let mut last_err = None;
    for candidate in std::iter::once(port).chain(fallback_ports.iter().copied()) {
        match TcpListener::bind(SocketAddr::new(addr, candidate)).await {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                warn!(port = candidate, error = %e, "Port unavailable, trying next");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no port to bind")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn falls_back_when_port_taken() {
        let local = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let taken = TcpListener::bind(SocketAddr::new(local, 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let listener = bind_with_fallback(local, taken_port, &[taken_port, 0])
            .await
            .unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), taken_port);

        let err = bind_with_fallback(local, taken_port, &[]).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);
    }
}
