//! Async client that drives a [`Controller`] over a real UDP socket.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use log::{debug, trace};

use crate::config::ControllerConfig;
use crate::controller::Controller;
use crate::errors::Error;
use crate::packet::MAX_PACKET_SIZE;
use crate::registry::DeviceHandle;
use crate::runtime::{self, AsyncUdpSocket, Instant, UdpSocket};
use crate::sink::Outbox;
use crate::types::Hsbk;

type Result<T> = std::result::Result<T, Error>;

/// A controller bound to a broadcast-capable UDP socket.
///
/// The controller queues everything it sends into an [`Outbox`]; the client
/// writes the queue to the network after every operation.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use lifx_lan_rs::Client;
///
/// let mut client = Client::bind().await?;
/// client.discover().await?;
/// client.listen(Duration::from_secs(2)).await?;
/// for device in client.controller().devices() {
///     println!("{} {}", device.mac(), device.label());
/// }
/// ```
pub struct Client {
    socket: UdpSocket,
    controller: Controller<Outbox>,
}

impl Client {
    /// Bind an ephemeral port on all interfaces with the default config.
    pub async fn bind() -> Result<Self> {
        Self::bind_with_config(
            ControllerConfig::default(),
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
        )
        .await
    }

    pub async fn bind_with_config(config: ControllerConfig, addr: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| Error::socket("bind", e))?;
        socket
            .set_broadcast(true)
            .map_err(|e| Error::socket("set_broadcast", e))?;
        if let Ok(local) = socket.local_addr() {
            debug!("listening on {local}");
        }

        Ok(Client {
            socket,
            controller: Controller::with_config(config, Outbox::new()),
        })
    }

    pub fn controller(&self) -> &Controller<Outbox> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<Outbox> {
        &mut self.controller
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket
            .local_addr()
            .map_err(|e| Error::socket("local_addr", e))
    }

    /// Broadcast a discovery request.
    pub async fn discover(&mut self) -> Result<()> {
        self.controller.discover();
        self.flush().await
    }

    /// Ask a single host to announce itself.
    pub async fn discover_device(&mut self, ip: Ipv4Addr) -> Result<()> {
        self.controller.discover_device(ip);
        self.flush().await
    }

    /// Feed received datagrams to the controller for `duration`, sending
    /// any follow-up queries as they are produced.
    pub async fn listen(&mut self, duration: Duration) -> Result<()> {
        let start = Instant::now();
        let mut buffer = [0u8; MAX_PACKET_SIZE * 4];

        while let Some(remaining) = duration.checked_sub(start.elapsed()) {
            match runtime::timeout(remaining, self.socket.recv_from(&mut buffer)).await {
                Ok(Ok((size, SocketAddr::V4(from)))) => {
                    self.controller.handle_incoming(&buffer[..size], from);
                    self.flush().await?;
                }
                Ok(Ok((_, SocketAddr::V6(from)))) => trace!("ignoring datagram from {from}"),
                Ok(Err(e)) => debug!("recv_from failed: {e}"),
                Err(_) => break,
            }
        }
        Ok(())
    }

    pub async fn poll_light(&mut self, handle: DeviceHandle) -> Result<()> {
        self.controller.poll_light(handle);
        self.flush().await
    }

    pub async fn set_light_color(
        &mut self,
        handle: DeviceHandle,
        color: &Hsbk,
        duration_ms: u32,
    ) -> Result<()> {
        self.controller.set_light_color(handle, color, duration_ms);
        self.flush().await
    }

    pub async fn set_light_power(
        &mut self,
        handle: DeviceHandle,
        powered: bool,
        duration_ms: u32,
    ) -> Result<()> {
        self.controller.set_light_power(handle, powered, duration_ms);
        self.flush().await
    }

    /// Write every queued packet to the socket.
    pub async fn flush(&mut self) -> Result<()> {
        for packet in self.controller.sink_mut().take() {
            send(&self.socket, &packet.bytes, packet.destination).await?;
        }
        Ok(())
    }
}

async fn send(socket: &UdpSocket, bytes: &[u8], destination: SocketAddrV4) -> Result<()> {
    trace!("sending {} bytes to {destination}", bytes.len());
    socket
        .send_to(bytes, SocketAddr::V4(destination))
        .await
        .map_err(|e| Error::socket("send_to", e))?;
    Ok(())
}

#[cfg(all(test, feature = "runtime-tokio"))]
mod tests {
    use super::*;
    use crate::packet::{self, Message, MessageType};
    use crate::types::MacAddress;

    const MAC: [u8; 6] = [0xd0, 0x73, 0xd5, 0x01, 0x02, 0x03];

    /// A device on loopback that answers the discovery request and records
    /// what it receives afterwards.
    async fn fake_device() -> (tokio::net::UdpSocket, u16) {
        let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        (socket, port)
    }

    async fn client_for(port: u16) -> Client {
        let config = ControllerConfig {
            broadcast_address: Ipv4Addr::LOCALHOST,
            port,
            ..Default::default()
        };
        Client::bind_with_config(config, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap()
    }

    async fn recv_type(device: &tokio::net::UdpSocket) -> (u16, u32, SocketAddr) {
        let mut buf = [0u8; 256];
        let (n, from) = device.recv_from(&mut buf).await.unwrap();
        let packet = packet::decode(&buf[..n]).unwrap();
        (packet.message_type(), packet.source(), from)
    }

    #[tokio::test]
    async fn test_discover_and_follow_up_over_loopback() {
        let (device, port) = fake_device().await;
        let mut client = client_for(port).await;

        client.discover().await.unwrap();
        let (code, source, from) = recv_type(&device).await;
        assert_eq!(code, MessageType::GetService.code());
        assert_eq!(source, client.controller().source());

        let reply = packet::encode(
            Some(MacAddress::new(MAC)),
            source,
            0,
            &Message::StateService {
                service: 1,
                port: u32::from(port),
            },
        )
        .unwrap();
        device.send_to(&reply, from).await.unwrap();

        client.listen(Duration::from_millis(300)).await.unwrap();
        assert_eq!(client.controller().count(), 1);
        let handle = client
            .controller()
            .device_by_mac(&MacAddress::new(MAC))
            .unwrap();
        assert_eq!(client.controller().device(handle).unwrap().port(), port);

        assert_eq!(recv_type(&device).await.0, MessageType::GetVersion.code());
        assert_eq!(recv_type(&device).await.0, MessageType::GetHostFirmware.code());

        // later commands go straight out instead of piling up in the outbox
        assert!(client.controller().sink().is_empty());
        client.poll_light(handle).await.unwrap();
        assert!(client.controller().sink().is_empty());
        assert_eq!(recv_type(&device).await.0, MessageType::GetColor.code());
    }

    #[tokio::test]
    async fn test_listen_returns_after_duration() {
        let (_device, port) = fake_device().await;
        let mut client = client_for(port).await;
        let start = std::time::Instant::now();
        client.listen(Duration::from_millis(50)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(client.controller().count(), 0);
    }
}
