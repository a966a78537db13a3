use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream, UdpSocket};
use tokio::time::{timeout, timeout_at, Instant};

use crate::core::{CandidateAddress, Error, Result, SocketType, DEFAULT_TTL};

/// Opens sessions to candidate addresses
#[allow(async_fn_in_trait)]
pub trait Transport {
    type Session: Session;

    /// Creates a socket for `candidate`; stream sockets are also connected
    async fn open(
        &self,
        candidate: &CandidateAddress,
        port: u16,
        timeout: Duration,
    ) -> Result<Self::Session>;
}

/// One socket exchanging a request and a response with a single peer
#[allow(async_fn_in_trait)]
pub trait Session {
    /// Address the session talks to
    fn peer(&self) -> SocketAddr;

    /// Writes the request once, returning the bytes written
    async fn send(&mut self, buf: &[u8]) -> Result<usize>;

    /// Waits up to `timeout` for a response of `expected` bytes
    ///
    /// Streams accumulate reads until `expected` bytes, EOF or the deadline.
    /// Datagram sessions return a single datagram unmodified. Either way the
    /// result may be short and callers compare its length.
    async fn receive(&mut self, expected: usize, timeout: Duration) -> Result<Vec<u8>>;

    /// Releases the socket
    fn close(self)
    where
        Self: Sized,
    {
        drop(self)
    }
}

/// Socket based transport
#[derive(Debug, Clone, Copy)]
pub struct NetTransport {
    ttl: u32,
}

impl NetTransport {
    /// Creates a transport applying `ttl` to every socket
    pub fn with_ttl(ttl: u32) -> Self {
        NetTransport { ttl }
    }

    fn socket(&self, addr: SocketAddr, kind: SocketType) -> io::Result<Socket> {
        let (ty, protocol) = match kind {
            SocketType::Datagram => (Type::DGRAM, Protocol::UDP),
            SocketType::Stream => (Type::STREAM, Protocol::TCP),
        };
        let socket = Socket::new(Domain::for_address(addr), ty, Some(protocol))?;
        if addr.is_ipv4() {
            socket.set_ttl(self.ttl)?;
        } else {
            socket.set_unicast_hops_v6(self.ttl)?;
        }
        socket.set_nonblocking(true)?;
        Ok(socket)
    }
}

impl Default for NetTransport {
    fn default() -> Self {
        NetTransport::with_ttl(DEFAULT_TTL)
    }
}

impl Transport for NetTransport {
    type Session = NetSession;

    async fn open(
        &self,
        candidate: &CandidateAddress,
        port: u16,
        connect_timeout: Duration,
    ) -> Result<NetSession> {
        let addr = candidate.socket_addr(port);
        let socket = self
            .socket(addr, candidate.socket_type)
            .map_err(|source| Error::SocketCreateFailed { addr, source })?;

        match candidate.socket_type {
            SocketType::Datagram => {
                let local = match addr.ip() {
                    IpAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
                    IpAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
                };
                socket
                    .bind(&local.into())
                    .map_err(|source| Error::SocketCreateFailed { addr, source })?;
                let socket = UdpSocket::from_std(socket.into())
                    .map_err(|source| Error::SocketCreateFailed { addr, source })?;
                Ok(NetSession::Datagram { socket, peer: addr })
            }
            SocketType::Stream => {
                let socket = TcpSocket::from_std_stream(socket.into());
                let stream = timeout(connect_timeout, socket.connect(addr))
                    .await
                    .map_err(|_| Error::connect(addr, "timed out"))?
                    .map_err(|e| Error::connect(addr, e))?;
                Ok(NetSession::Stream { stream, peer: addr })
            }
        }
    }
}

/// Session over a real UDP or TCP socket
#[derive(Debug)]
pub enum NetSession {
    /// Unconnected UDP socket; each send names the peer
    Datagram { socket: UdpSocket, peer: SocketAddr },
    /// Connected TCP stream
    Stream { stream: TcpStream, peer: SocketAddr },
}

impl NetSession {
    /// IP time-to-live of the underlying IPv4 socket
    pub fn ttl(&self) -> Result<u32> {
        let ttl = match self {
            NetSession::Datagram { socket, .. } => socket.ttl()?,
            NetSession::Stream { stream, .. } => stream.ttl()?,
        };
        Ok(ttl)
    }
}

impl Session for NetSession {
    fn peer(&self) -> SocketAddr {
        match self {
            NetSession::Datagram { peer, .. } | NetSession::Stream { peer, .. } => *peer,
        }
    }

    async fn send(&mut self, buf: &[u8]) -> Result<usize> {
        let written = match self {
            NetSession::Datagram { socket, peer } => socket.send_to(buf, *peer).await?,
            NetSession::Stream { stream, .. } => stream.write(buf).await?,
        };
        Ok(written)
    }

    async fn receive(&mut self, expected: usize, limit: Duration) -> Result<Vec<u8>> {
        let deadline = Instant::now() + limit;
        match self {
            NetSession::Datagram { socket, peer } => {
                receive_datagram(socket, *peer, expected, deadline).await
            }
            NetSession::Stream { stream, .. } => {
                receive_stream(stream, expected, deadline).await
            }
        }
    }
}

/// Waits for one whole datagram from `peer`
///
/// Datagrams are never concatenated. A short one is held back in case the
/// real reply follows and is returned only if nothing better arrives before
/// the deadline. Oversized datagrams come back with their full length.
async fn receive_datagram(
    socket: &UdpSocket,
    peer: SocketAddr,
    expected: usize,
    deadline: Instant,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; expected + 1];
    let mut short = Vec::new();

    loop {
        let (n, from) = match timeout_at(deadline, socket.recv_from(&mut buf)).await {
            Err(_) => return Ok(short),
            Ok(res) => res?,
        };
        // Stray datagrams from other hosts are dropped
        if from.ip() != peer.ip() {
            continue;
        }
        if n < expected {
            short = buf[..n].to_vec();
            continue;
        }
        buf.truncate(n);
        return Ok(buf);
    }
}

/// Reads until `expected` bytes arrive, the peer closes, or the deadline passes
async fn receive_stream(
    stream: &mut TcpStream,
    expected: usize,
    deadline: Instant,
) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; expected];
    let mut filled = 0;

    while filled < expected {
        match timeout_at(deadline, stream.read(&mut buf[filled..])).await {
            Err(_) => break,
            Ok(res) => match res? {
                0 => break,
                n => filled += n,
            },
        }
    }

    buf.truncate(filled);
    Ok(buf)
}
