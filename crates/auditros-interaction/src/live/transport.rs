use async_trait::async_trait;
use tokio::sync::mpsc;

use auditros_core::generation::GenerationError;

use super::protocol::{ClientMessage, ServerMessage};

/// Bidirectional message channel to the real-time model endpoint.
#[async_trait]
pub trait LiveTransport: Send {
    async fn send(&mut self, message: ClientMessage) -> Result<(), GenerationError>;

    /// Next server message, or `None` once the session has closed.
    async fn recv(&mut self) -> Result<Option<ServerMessage>, GenerationError>;

    async fn close(&mut self) -> Result<(), GenerationError>;
}

/// In-process transport over a pair of tokio channels.
pub struct ChannelTransport {
    outgoing: Option<mpsc::UnboundedSender<ClientMessage>>,
    incoming: mpsc::UnboundedReceiver<ServerMessage>,
}

/// The far side of a [`ChannelTransport`].
pub struct ChannelPeer {
    pub received: mpsc::UnboundedReceiver<ClientMessage>,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl ChannelTransport {
    pub fn pair() -> (Self, ChannelPeer) {
        let (client_tx, client_rx) = mpsc::unbounded_channel();
        let (server_tx, server_rx) = mpsc::unbounded_channel();
        (
            Self {
                outgoing: Some(client_tx),
                incoming: server_rx,
            },
            ChannelPeer {
                received: client_rx,
                sender: server_tx,
            },
        )
    }
}

#[async_trait]
impl LiveTransport for ChannelTransport {
    async fn send(&mut self, message: ClientMessage) -> Result<(), GenerationError> {
        let sender = self
            .outgoing
            .as_ref()
            .ok_or_else(|| GenerationError::Transport("Live session is closed".into()))?;
        sender
            .send(message)
            .map_err(|_| GenerationError::Transport("Live peer disconnected".into()))
    }

    async fn recv(&mut self) -> Result<Option<ServerMessage>, GenerationError> {
        if self.outgoing.is_none() {
            return Ok(None);
        }
        Ok(self.incoming.recv().await)
    }

    async fn close(&mut self) -> Result<(), GenerationError> {
        self.outgoing = None;
        self.incoming.close();
        Ok(())
    }
}
