//! Hub discovery over multicast DNS.
//!
//! Sends a single mDNS query for `hubitat.local` and returns the first IPv4
//! address answered.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

const MDNS_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);
const MDNS_PORT: u16 = 5353;
const HUB_HOSTNAME: &str = "hubitat.local";
const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(2);

const TYPE_A: u16 = 1;
const CLASS_IN: u16 = 1;
/// Asks responders to answer by unicast to our ephemeral port.
const UNICAST_RESPONSE: u16 = 0x8000;

/// Looks up the hub's address on the local network.
///
/// Returns `None` when nothing answers within the timeout.
pub async fn discover_hub() -> Option<String> {
    match query(HUB_HOSTNAME).await {
        Ok(Some(ip)) => {
            debug!("Discovered hub at {ip}");
            Some(ip.to_string())
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Hub discovery failed: {e}");
            None
        }
    }
}

async fn query(hostname: &str) -> std::io::Result<Option<Ipv4Addr>> {
    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
    socket
        .send_to(&build_query(hostname), (MDNS_GROUP, MDNS_PORT))
        .await?;

    let mut buf = [0u8; 1500];
    let deadline = tokio::time::Instant::now() + DISCOVERY_TIMEOUT;
    loop {
        let received = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await;
        let Ok(received) = received else {
            return Ok(None);
        };
        let (len, from) = received?;
        if let Some(ip) = parse_a_record(&buf[..len]) {
            debug!("mDNS answer from {from}");
            return Ok(Some(ip));
        }
    }
}

/// Builds a DNS query packet for the A record of `hostname`.
pub fn build_query(hostname: &str) -> Vec<u8> {
    // Header: id 0, flags 0, one question, no other records.
    let mut packet = vec![0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0];
    for label in hostname.split('.').filter(|l| !l.is_empty()) {
        packet.push(label.len() as u8);
        packet.extend_from_slice(label.as_bytes());
    }
    packet.push(0);
    packet.extend_from_slice(&TYPE_A.to_be_bytes());
    packet.extend_from_slice(&(CLASS_IN | UNICAST_RESPONSE).to_be_bytes());
    packet
}

/// Extracts the first A record from a DNS response packet.
pub fn parse_a_record(packet: &[u8]) -> Option<Ipv4Addr> {
    let questions = read_u16(packet, 4)?;
    let answers = read_u16(packet, 6)?;
    let mut pos = 12;

    for _ in 0..questions {
        pos = skip_name(packet, pos)? + 4;
    }

    for _ in 0..answers {
        pos = skip_name(packet, pos)?;
        let record_type = read_u16(packet, pos)?;
        let rdlength = read_u16(packet, pos + 8)? as usize;
        let rdata = pos + 10;
        let end = rdata.checked_add(rdlength)?;
        if end > packet.len() {
            return None;
        }
        if record_type == TYPE_A && rdlength == 4 {
            return Some(Ipv4Addr::new(
                packet[rdata],
                packet[rdata + 1],
                packet[rdata + 2],
                packet[rdata + 3],
            ));
        }
        pos = end;
    }
    None
}

fn read_u16(packet: &[u8], pos: usize) -> Option<u16> {
    let bytes = packet.get(pos..pos + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Returns the offset just past the (possibly compressed) name at `pos`.
fn skip_name(packet: &[u8], mut pos: usize) -> Option<usize> {
    loop {
        let len = *packet.get(pos)?;
        match len {
            0 => return Some(pos + 1),
            // Compression pointer: two bytes, ends the name.
            l if l & 0xC0 == 0xC0 => return Some(pos + 2),
            l => pos += 1 + l as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_answer(ip: [u8; 4]) -> Vec<u8> {
        // Header with one question and one answer.
        let mut packet = vec![0, 0, 0x84, 0, 0, 1, 0, 1, 0, 0, 0, 0];
        let question = &build_query("hubitat.local")[12..];
        packet.extend_from_slice(question);
        // Answer: pointer to the question name, type A, class IN, ttl, rdata.
        packet.extend_from_slice(&[0xC0, 12, 0, 1, 0x80, 1, 0, 0, 0, 120, 0, 4]);
        packet.extend_from_slice(&ip);
        packet
    }

    #[test]
    fn test_build_query_layout() {
        let packet = build_query("hubitat.local");
        assert_eq!(&packet[..12], &[0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(packet[12], 7);
        assert_eq!(&packet[13..20], b"hubitat");
        assert_eq!(packet[20], 5);
        assert_eq!(&packet[21..26], b"local");
        assert_eq!(&packet[26..], &[0, 0, 1, 0x80, 1]);
    }

    #[test]
    fn test_parse_a_record() {
        let packet = response_with_answer([192, 168, 1, 42]);
        assert_eq!(parse_a_record(&packet), Some(Ipv4Addr::new(192, 168, 1, 42)));
    }

    #[test]
    fn test_parse_truncated_packet() {
        let packet = response_with_answer([192, 168, 1, 42]);
        assert_eq!(parse_a_record(&packet[..packet.len() - 2]), None);
        assert_eq!(parse_a_record(&[0, 0]), None);
    }

    #[test]
    fn test_parse_query_without_answers() {
        assert_eq!(parse_a_record(&build_query("hubitat.local")), None);
    }
}
