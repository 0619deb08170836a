//! Outbound transport
//!
//! The control loop only produces `(address, value)` pairs. A [`Transport`]
//! puts them on the wire. Sends must never block the tick.

mod osc;

pub use osc::encode;

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::sync::mpsc::{self, Sender};
use std::thread;

use crate::control::OutboundMessage;
use crate::error::TransportError;

/// Destination for outbound messages
pub trait Transport: Send {
    /// Hand a message off. Failures are reported, never retried.
    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }
}

enum SenderCommand {
    Send(Vec<u8>),
    Stop,
}

/// UDP OSC sender.
///
/// A dedicated thread owns the socket, so `send` only enqueues.
pub struct OscSender {
    sender: Sender<SenderCommand>,
    target: SocketAddr,
}

impl OscSender {
    /// Open a socket aimed at `host:port`.
    pub fn new(host: &str, port: u16) -> Result<Self, TransportError> {
        let target = (host, port).to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                format!("no address for {}:{}", host, port),
            )
        })?;

        let bind = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind)?;

        let (sender, receiver) = mpsc::channel::<SenderCommand>();

        thread::Builder::new()
            .name("osc-sender".to_string())
            .spawn(move || {
                while let Ok(cmd) = receiver.recv() {
                    match cmd {
                        SenderCommand::Send(packet) => {
                            if let Err(e) = socket.send_to(&packet, target) {
                                tracing::warn!(%target, error = %e, "OSC send failed");
                            }
                        }
                        SenderCommand::Stop => break,
                    }
                }
            })?;

        tracing::info!(%target, "OSC output ready");

        Ok(Self { sender, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Stop the sender thread.
    pub fn stop(&self) {
        let _ = self.sender.send(SenderCommand::Stop);
    }
}

impl Transport for OscSender {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        tracing::trace!(%message, "send");
        self.sender
            .send(SenderCommand::Send(encode(message)))
            .map_err(|_| TransportError::Closed)
    }
}

impl Drop for OscSender {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Logs messages instead of sending them (dry run)
#[derive(Debug, Default)]
pub struct LogTransport {
    sent: u64,
}

impl LogTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Drop for LogTransport {
    fn drop(&mut self) {
        tracing::info!(sent = self.sent, "dry run finished");
    }
}

impl Transport for LogTransport {
    fn send(&mut self, message: &OutboundMessage) -> Result<(), TransportError> {
        self.sent += 1;
        tracing::info!(address = %message.address, value = %message.value, "dry run");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_osc_sender_delivers_packet() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut sender = OscSender::new("127.0.0.1", port).unwrap();
        let message = OutboundMessage::float("delay/time", 0.25);
        sender.send(&message).unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], encode(&message).as_slice());
    }

    #[test]
    fn test_send_after_stop_is_not_fatal() {
        let mut sender = OscSender::new("127.0.0.1", 9).unwrap();
        sender.stop();
        // the thread may still be draining; either way this must not panic
        let _ = sender.send(&OutboundMessage::int("siren/stop", 1));
    }

    #[test]
    fn test_log_transport_counts() {
        let mut transport = LogTransport::new();
        transport.send(&OutboundMessage::float("a", 1.0)).unwrap();
        transport.send(&OutboundMessage::float("b", 2.0)).unwrap();
        assert_eq!(transport.sent, 2);
    }

    #[test]
    fn test_boxed_transport() {
        let mut transport: Box<dyn Transport> = Box::new(LogTransport::new());
        assert!(transport.send(&OutboundMessage::int("x", 1)).is_ok());
    }
}
