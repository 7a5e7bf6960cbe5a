//! SSDP M-SEARCH over UDP multicast.

use crate::error::DiscoveryError;
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

pub const SSDP_MULTICAST: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 1900);

/// One answer to an M-SEARCH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsdpResponse {
    pub location: String,
    pub usn: Option<String>,
    pub search_target: Option<String>,
}

/// Build the M-SEARCH datagram. MX is clamped to the 1..=5 range.
pub fn m_search_request(search_target: &str, timeout: Duration) -> String {
    let mx = timeout.as_secs().clamp(1, 5);
    format!(
        "M-SEARCH * HTTP/1.1\r\nHOST: {}\r\nMAN: \"ssdp:discover\"\r\nMX: {}\r\nST: {}\r\n\r\n",
        SSDP_MULTICAST, mx, search_target
    )
}

/// Parse an HTTP-over-UDP answer; headers are case-insensitive
pub fn parse_response(datagram: &str) -> Option<SsdpResponse> {
    let mut lines = datagram.lines();
    let status = lines.next()?;
    if !status.starts_with("HTTP/") || !status.contains(" 200") {
        return None;
    }

    let mut location = None;
    let mut usn = None;
    let mut search_target = None;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match name.trim().to_ascii_uppercase().as_str() {
            "LOCATION" => location = Some(value),
            "USN" => usn = Some(value),
            "ST" => search_target = Some(value),
            _ => {}
        }
    }

    Some(SsdpResponse {
        location: location.filter(|l| !l.is_empty())?,
        usn,
        search_target,
    })
}

/// Multicast one M-SEARCH and collect distinct answers until `timeout`
pub async fn search(
    search_target: &str,
    timeout: Duration,
) -> Result<Vec<SsdpResponse>, DiscoveryError> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
    let request = m_search_request(search_target, timeout);
    socket.send_to(request.as_bytes(), SSDP_MULTICAST).await?;
    debug!("Sent M-SEARCH for {}", search_target);

    let deadline = Instant::now() + timeout;
    let mut seen = HashSet::new();
    let mut responses = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        match timeout_at(deadline, socket.recv_from(&mut buf)).await {
            Err(_) => break,
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok((len, from))) => {
                let datagram = String::from_utf8_lossy(&buf[..len]);
                match parse_response(&datagram) {
                    Some(response) if seen.insert(response.location.clone()) => {
                        trace!("SSDP answer from {}: {}", from, response.location);
                        responses.push(response);
                    }
                    Some(_) => {}
                    None => trace!("Ignoring non-SSDP datagram from {}", from),
                }
            }
        }
    }

    Ok(responses)
}
