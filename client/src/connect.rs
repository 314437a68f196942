//! Opens the wire connection and drives handshake steps 1-6 (§4.G): send
//! `VERSION`, wait for the server's own, then send `AUTHREQUEST`. Grounded
//! on the teacher's `hand_shake::init_and_connect`, generalized from a
//! websocket upgrade to the length-prefixed TCP framing this protocol uses
//! (§4.A, §4.B).

use std::net::SocketAddr;
use std::sync::Arc;

use net::{Connection, TcpConnection};
use protocol::catalog::CURRENT_VERSION;
use protocol::handshake::{MIN_ACCEPTED_VERSION, PasswordScheme};
use protocol::message::Message;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to connect to {addr}: {source}")]
    Io {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("connection closed before the handshake completed")]
    Disconnected,
    #[error("server version {server} is older than the minimum {required} this client accepts")]
    ServerTooOld { server: u32, required: u32 },
}

/// A connected, version-negotiated, not-yet-authenticated socket plus the
/// channel of messages the server has pushed since connecting.
pub struct PendingConnection {
    pub connection: Arc<dyn Connection>,
    pub inbound: mpsc::Receiver<Message>,
}

/// Opens the socket and exchanges `VERSION` (§4.G steps 1-2). Does not send
/// `AUTHREQUEST`; the caller decides the nickname/role/password to use only
/// after seeing the negotiated version.
pub async fn connect(addr: SocketAddr) -> Result<PendingConnection, ConnectError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|source| ConnectError::Io { addr, source })?;
    let _ = stream.set_nodelay(true);
    let (connection, mut inbound) = TcpConnection::spawn(stream);
    let connection: Arc<dyn Connection> = connection;

    connection
        .send(Message::Version { version: CURRENT_VERSION, feature_list: Vec::new() })
        .map_err(|_| ConnectError::Disconnected)?;

    let server_version = loop {
        match inbound.recv().await.ok_or(ConnectError::Disconnected)? {
            Message::Version { version, .. } => break version,
            // Ignore anything sent before the version reply; none is
            // expected in practice but this keeps the loop robust.
            _ => continue,
        }
    };
    if server_version < MIN_ACCEPTED_VERSION {
        return Err(ConnectError::ServerTooOld { server: server_version, required: MIN_ACCEPTED_VERSION });
    }
    connection.set_peer_version(server_version);

    Ok(PendingConnection { connection, inbound })
}

/// Sends `AUTHREQUEST` as a plaintext-or-none player login (§4.G steps 6-7)
/// and returns once the connection is usable for lobby/game traffic. The
/// caller still owns `inbound` and must keep draining it; the `Status`
/// reply isn't consumed here so nothing is lost if the caller wants to
/// inspect it.
pub fn authenticate(connection: &Arc<dyn Connection>, nickname: impl Into<String>) -> Result<(), ConnectError> {
    connection
        .send(Message::AuthRequest {
            role: "Player".to_string(),
            nickname: nickname.into(),
            password_scheme: PasswordScheme::None as u8,
            password: String::new(),
        })
        .map_err(|_| ConnectError::Disconnected)
}
