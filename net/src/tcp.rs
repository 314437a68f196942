//! The TCP transport (§4.B "Local vs network transport" — the network
//! half). Frames are the length-prefixed encoding from
//! `protocol::message` (§4.A); one accepted socket is split into a reader
//! task that decodes inbound frames and a writer task that serializes
//! outbound sends, so per-connection order is preserved even though both
//! directions run concurrently.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use protocol::message::{DecodeError, Message, decode_frame, encode_frame};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

use crate::connection::{Connection, ConnectionId, PeerState, SendError};
use crate::CHANNEL_BUFFER_SIZE;

/// A connection backed by a live TCP socket.
pub struct TcpConnection {
    id: ConnectionId,
    state: Arc<PeerState>,
    outbound: mpsc::Sender<Message>,
    closed: Arc<AtomicBool>,
}

impl TcpConnection {
    /// Splits `stream` into a reader and writer task and returns the
    /// `Connection` handle plus the channel of messages decoded from the
    /// peer. The caller (the server's accept loop) drives the inbound
    /// channel; everything else about framing is internal to this module.
    pub fn spawn(stream: TcpStream) -> (Arc<TcpConnection>, mpsc::Receiver<Message>) {
        let (read_half, write_half) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (inbound_tx, inbound_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let closed = Arc::new(AtomicBool::new(false));

        let conn = Arc::new(TcpConnection {
            id: ConnectionId::next(),
            state: Arc::new(PeerState::default()),
            outbound: outbound_tx,
            closed: closed.clone(),
        });

        tokio::spawn(writer_task(write_half, outbound_rx, closed.clone()));
        tokio::spawn(reader_task(read_half, inbound_tx, closed));

        (conn, inbound_rx)
    }
}

async fn writer_task(
    mut write_half: tokio::net::tcp::OwnedWriteHalf,
    mut outbound_rx: mpsc::Receiver<Message>,
    closed: Arc<AtomicBool>,
) {
    while let Some(msg) = outbound_rx.recv().await {
        let framed = match encode_frame(&msg) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(?err, "failed to encode outbound message; dropping it");
                continue;
            }
        };
        if let Err(err) = write_half.write_all(&framed).await {
            tracing::warn!(?err, "tcp write failed, closing connection");
            break;
        }
    }
    closed.store(true, Ordering::Release);
}

async fn reader_task(
    mut read_half: tokio::net::tcp::OwnedReadHalf,
    inbound_tx: mpsc::Sender<Message>,
    closed: Arc<AtomicBool>,
) {
    let mut buf = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];
    loop {
        match decode_frame(&buf) {
            Ok(Some((msg, consumed))) => {
                buf.drain(..consumed);
                if inbound_tx.send(msg).await.is_err() {
                    break;
                }
                continue;
            }
            Ok(None) => {}
            Err(DecodeError::FrameTooLarge { declared, max }) => {
                tracing::warn!(declared, max, "peer sent an oversized frame, dropping connection");
                break;
            }
            Err(err) => {
                // Malformed frame from an older/buggy peer: drop it and
                // keep the session alive (§7 "Decoding errors").
                tracing::debug!(?err, "dropping malformed frame");
                buf.clear();
                continue;
            }
        }

        match read_half.read(&mut chunk).await {
            Ok(0) => break, // peer closed cleanly
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(err) => {
                tracing::debug!(?err, "tcp read failed, closing connection");
                break;
            }
        }
    }
    closed.store(true, Ordering::Release);
}

impl Connection for TcpConnection {
    fn id(&self) -> ConnectionId {
        self.id
    }

    fn send(&self, msg: Message) -> Result<(), SendError> {
        self.outbound.try_send(msg).map_err(|_| SendError::Closed)
    }

    fn peer_version(&self) -> u32 {
        self.state.negotiated_version()
    }

    fn set_peer_version(&self, version: u32) {
        self.state.set_negotiated_version(version);
    }

    fn nickname(&self) -> Option<String> {
        self.state.nickname()
    }

    fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    fn set_authenticated(&self, nickname: String) {
        self.state.set_authenticated(nickname);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
