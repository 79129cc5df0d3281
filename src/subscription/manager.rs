use crate::state::{RadarEngine, RadarUpdate};
use crate::subscription::protocol::{ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Manages a single WebSocket connection to the radar feed
pub struct ConnectionManager {
    /// Contact IDs this connection is watching; empty means everything
    watched: HashSet<String>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            watched: HashSet::new(),
        }
    }

    /// Handle WebSocket connection lifecycle
    pub async fn handle(
        mut self,
        mut socket: WebSocket,
        mut update_rx: broadcast::Receiver<RadarUpdate>,
        engine: Arc<RadarEngine>,
    ) {
        info!("WebSocket connection established");

        // Initial state so the client can render before the next tick
        if let Err(e) = send(&mut socket, engine.snapshot().into()).await {
            error!(error = %e, "Failed to send initial snapshot");
            return;
        }

        loop {
            tokio::select! {
                // Handle incoming client messages
                Some(msg) = socket.recv() => {
                    match msg {
                        Ok(Message::Text(text)) => {
                            if let Err(e) = self.handle_client_message(&mut socket, &text, &engine).await {
                                error!(error = %e, "Error handling client message");
                            }
                        }
                        Ok(Message::Close(_)) => {
                            info!("WebSocket client disconnected");
                            break;
                        }
                        Ok(Message::Ping(data)) => {
                            if let Err(e) = socket.send(Message::Pong(data)).await {
                                error!(error = %e, "Failed to send pong");
                                break;
                            }
                        }
                        Ok(_) => {
                            // Ignore binary, pong messages
                        }
                        Err(e) => {
                            warn!(error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                // Forward radar updates from the engine
                result = update_rx.recv() => {
                    match result {
                        Ok(update) => {
                            if let Some(update) = self.filter_update(update) {
                                if let Err(e) = send(&mut socket, update.into()).await {
                                    error!(error = %e, "Failed to send radar update");
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped = skipped, "WebSocket lagged, skipped updates");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            error!("Radar broadcast channel closed");
                            break;
                        }
                    }
                }

                else => {
                    break;
                }
            }
        }

        info!("WebSocket connection closed");
    }

    async fn handle_client_message(
        &mut self,
        socket: &mut WebSocket,
        text: &str,
        engine: &RadarEngine,
    ) -> anyhow::Result<()> {
        let msg: ClientMessage = match serde_json::from_str(text) {
            Ok(msg) => msg,
            Err(e) => {
                send(socket, ServerMessage::error(format!("invalid message: {}", e))).await?;
                return Ok(());
            }
        };

        match msg {
            ClientMessage::Watch { contact_id } => {
                info!(contact_id = %contact_id, "Client watching contact");
                self.watched.insert(contact_id);
            }
            ClientMessage::Unwatch { contact_id } => {
                info!(contact_id = %contact_id, "Client stopped watching contact");
                self.watched.remove(&contact_id);
            }
            ClientMessage::Snapshot => {
                send(socket, engine.snapshot().into()).await?;
            }
        }

        Ok(())
    }

    /// Narrow an update to the watched contacts.
    ///
    /// Ticks keep only watched entries (an empty tick still goes out so the
    /// client knows they left range); added contacts are dropped unless
    /// watched. Tracking transitions always pass.
    fn filter_update(&self, update: RadarUpdate) -> Option<RadarUpdate> {
        if self.watched.is_empty() {
            return Some(update);
        }

        match update {
            RadarUpdate::Tick {
                tick,
                user_position,
                nearby,
                timestamp,
            } => Some(RadarUpdate::Tick {
                tick,
                user_position,
                nearby: nearby
                    .into_iter()
                    .filter(|n| self.watched.contains(&n.contact.id))
                    .collect(),
                timestamp,
            }),
            RadarUpdate::ContactAdded { contact, timestamp } => {
                if self.watched.contains(&contact.id) {
                    Some(RadarUpdate::ContactAdded { contact, timestamp })
                } else {
                    None
                }
            }
            other => Some(other),
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn send(socket: &mut WebSocket, msg: ServerMessage) -> anyhow::Result<()> {
    let json = serde_json::to_string(&msg)?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
