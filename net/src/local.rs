//! The in-process transport (§4.B "Local vs network transport" — the
//! bot/practice-game half). Two [`Connection`] handles backed by a pair of
//! `tokio` mpsc channels instead of a socket: whatever one side sends
//! arrives, in order, as an inbound message on the other side. No framing
//! is needed since the messages never leave process memory.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use protocol::message::Message;
use tokio::sync::mpsc;

use crate::CHANNEL_BUFFER_SIZE;
use crate::connection::{Connection, ConnectionId, PeerState, SendError};

pub struct LocalConnection {
    id: ConnectionId,
    state: Arc<PeerState>,
    outbound: mpsc::Sender<Message>,
    closed: Arc<AtomicBool>,
}

impl Connection for LocalConnection {
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

/// Builds a connected pair: `(server_side, client_side, server_inbound,
/// client_inbound)`. The server core holds `server_side` as the bot's
/// `Connection` inside the game the same way it would a TCP peer; a local
/// bot runtime holds `client_side` and drains `client_inbound` to see what
/// the server sent it.
pub fn local_pair() -> (
    Arc<LocalConnection>,
    Arc<LocalConnection>,
    mpsc::Receiver<Message>,
    mpsc::Receiver<Message>,
) {
    let (to_client_tx, to_client_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
    let (to_server_tx, to_server_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

    let server_side = Arc::new(LocalConnection {
        id: ConnectionId::next(),
        state: Arc::new(PeerState::default()),
        outbound: to_client_tx,
        closed: Arc::new(AtomicBool::new(false)),
    });
    let client_side = Arc::new(LocalConnection {
        id: ConnectionId::next(),
        state: Arc::new(PeerState::default()),
        outbound: to_server_tx,
        closed: Arc::new(AtomicBool::new(false)),
    });

    (server_side, client_side, to_server_rx, to_client_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::catalog::CURRENT_VERSION;

    #[tokio::test]
    async fn messages_sent_by_one_side_arrive_in_order_on_the_other() {
        let (server_side, _client_side, mut server_inbound, mut client_inbound) = local_pair();

        server_side
            .send(Message::Version {
                version: CURRENT_VERSION,
                feature_list: vec![],
            })
            .unwrap();
        server_side
            .send(Message::Ping { sent_at_millis: 1 })
            .unwrap();

        assert!(matches!(
            client_inbound.recv().await.unwrap(),
            Message::Version { .. }
        ));
        assert!(matches!(
            client_inbound.recv().await.unwrap(),
            Message::Ping { sent_at_millis: 1 }
        ));
        assert!(server_inbound.try_recv().is_err());
    }
}
