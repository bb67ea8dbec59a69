//! Event router: turns inbound connection events into registry operations
//! and outbound events.

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};

use super::BroadcastEmitter;
use crate::domain::{
    CommandStatus, EventBus, ServerEvent, Session, SessionInfo, SessionRegistry, SessionSnapshot,
};
use crate::error::HubError;
use crate::ws::messages::{ClientEvent, CommandRequest, CommandResultReport, RegisterRequest};
use crate::ws::peers::{ConnectionContext, PeerRegistry};

/// Maximum number of characters of a command result written to the log.
const RESULT_LOG_PREVIEW: usize = 100;

/// Orchestration layer for all connection events.
///
/// Owns the single [`SessionRegistry`] behind a mutex, the [`PeerRegistry`]
/// used for targeted sends, and the [`BroadcastEmitter`]. Every mutation
/// follows the pattern: lock registry → mutate → acknowledge originator →
/// broadcast snapshot → unlock.
#[derive(Debug)]
pub struct EventRouter {
    sessions: Mutex<SessionRegistry>,
    peers: PeerRegistry,
    emitter: BroadcastEmitter,
}

impl EventRouter {
    /// Creates a router with an empty registry publishing on `event_bus`.
    #[must_use]
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            sessions: Mutex::new(SessionRegistry::new()),
            peers: PeerRegistry::new(),
            emitter: BroadcastEmitter::new(event_bus),
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        self.emitter.event_bus()
    }

    /// Returns the registry of open connections.
    #[must_use]
    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    /// Records a newly accepted connection. No registry effect.
    pub async fn handle_connect(&self, ctx: &ConnectionContext, tx: mpsc::Sender<ServerEvent>) {
        self.peers.add(ctx.id, tx).await;
        tracing::info!(
            conn_id = %ctx.id,
            remote_ip = %ctx.remote_ip,
            user_agent = ctx.user_agent.as_deref().unwrap_or("-"),
            "client connected"
        );
    }

    /// Routes one decoded event, reporting any failure to the originator.
    ///
    /// Failed `command` events are answered with `command_status` (status
    /// `error`); every other failure with an `error` event.
    pub async fn dispatch(&self, ctx: &ConnectionContext, event: ClientEvent) {
        let event_name = event.event_name();
        let is_command = matches!(event, ClientEvent::Command(_));
        let outcome = match event {
            ClientEvent::Register(req) => self.handle_register(ctx, req).await,
            ClientEvent::Command(req) => self.handle_command(ctx, req).await,
            ClientEvent::CommandResult(report) => self.handle_command_result(ctx, report),
        };

        if let Err(err) = outcome {
            tracing::warn!(conn_id = %ctx.id, event = event_name, error = %err, "event rejected");
            let reply = if is_command {
                ServerEvent::CommandStatus(CommandStatus::Error {
                    message: err.to_string(),
                })
            } else {
                ServerEvent::Error {
                    message: err.to_string(),
                }
            };
            let _ = self.peers.send_to(ctx.id, reply).await;
        }
    }

    /// Reports an error that happened before routing (e.g. an undecodable
    /// frame) to the originator.
    pub async fn reject(&self, ctx: &ConnectionContext, err: &HubError) {
        tracing::warn!(conn_id = %ctx.id, error = %err, "frame rejected");
        let _ = self
            .peers
            .send_to(
                ctx.id,
                ServerEvent::Error {
                    message: err.to_string(),
                },
            )
            .await;
    }

    /// Registers (or re-registers) the connection under `req.session_id`.
    ///
    /// On success the originator receives `registered` and every connection
    /// receives a `sessions_update`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidInput`] if `session_id` is missing or empty;
    /// nothing is mutated or broadcast.
    pub async fn handle_register(
        &self,
        ctx: &ConnectionContext,
        req: RegisterRequest,
    ) -> Result<(), HubError> {
        let session_id = req.session_id.unwrap_or_default();
        let info = SessionInfo::new(
            ctx.remote_ip.to_string(),
            ctx.user_agent.as_deref(),
            req.info,
        );

        let mut sessions = self.sessions.lock().await;
        let superseded = sessions.register(&session_id, ctx.id, info)?;
        let _ = self.peers.send_to(ctx.id, ServerEvent::registered()).await;
        let recipients = self.emitter.publish_sessions(&sessions);
        let total = sessions.len();
        drop(sessions);

        if let Some(old) = superseded.filter(|old| old.connection != ctx.id) {
            tracing::info!(
                %session_id,
                old_conn_id = %old.connection,
                new_conn_id = %ctx.id,
                "session superseded by a new connection"
            );
        }
        tracing::info!(
            %session_id,
            conn_id = %ctx.id,
            remote_ip = %ctx.remote_ip,
            sessions = total,
            recipients,
            "agent registered"
        );
        Ok(())
    }

    /// Forwards a command to the target agent's connection.
    ///
    /// The agent receives `command {cmd, payload}`; the sender receives
    /// `command_status {status: "sent"}`. Delivery to the agent is not
    /// confirmed.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidInput`] if `session_id` or `command` is
    /// missing or empty, and [`HubError::SessionNotFound`] if no agent is
    /// registered under `session_id`.
    pub async fn handle_command(
        &self,
        ctx: &ConnectionContext,
        req: CommandRequest,
    ) -> Result<(), HubError> {
        let (Some(session_id), Some(command)) = (non_empty(req.session_id), non_empty(req.command))
        else {
            return Err(HubError::InvalidInput(
                "Missing session_id or command".to_string(),
            ));
        };
        let payload = req.payload.unwrap_or_default();

        let sessions = self.sessions.lock().await;
        let target = sessions
            .lookup(&session_id)
            .map(|s| s.connection)
            .ok_or_else(|| HubError::SessionNotFound(session_id.clone()))?;
        let delivered = self
            .peers
            .send_to(
                target,
                ServerEvent::Command {
                    cmd: command.clone(),
                    payload,
                },
            )
            .await;
        drop(sessions);

        if !delivered {
            tracing::warn!(%session_id, %command, target_conn_id = %target, "command not queued");
        }
        tracing::info!(%session_id, %command, operator_conn_id = %ctx.id, "command sent");

        let _ = self
            .peers
            .send_to(
                ctx.id,
                ServerEvent::CommandStatus(CommandStatus::Sent {
                    session_id,
                    command,
                }),
            )
            .await;
        Ok(())
    }

    /// Broadcasts an agent's result to every connection, verbatim.
    ///
    /// No registry lookup: results for unregistered ids are relayed too.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidInput`] if `session_id` is absent.
    pub fn handle_command_result(
        &self,
        ctx: &ConnectionContext,
        report: CommandResultReport,
    ) -> Result<(), HubError> {
        let Some(session_id) = report.session_id else {
            return Err(HubError::InvalidInput("session_id is required".to_string()));
        };
        let result = report.result.unwrap_or_default();
        let preview: String = result.chars().take(RESULT_LOG_PREVIEW).collect();

        tracing::info!(%session_id, conn_id = %ctx.id, result = %preview, "command result");
        let _ = self.emitter.publish_result(session_id, result);
        Ok(())
    }

    /// Drops everything the closing connection owned.
    ///
    /// Removes its session (broadcasting the new snapshot if one was removed)
    /// and forgets the connection. Returns the removed session id.
    pub async fn handle_disconnect(&self, ctx: &ConnectionContext) -> Option<String> {
        let mut sessions = self.sessions.lock().await;
        let removed = sessions.remove_by_connection(ctx.id);
        if removed.is_some() {
            let _ = self.emitter.publish_sessions(&sessions);
        }
        drop(sessions);

        let _ = self.peers.remove(ctx.id).await;
        let connected_secs = (Utc::now() - ctx.connected_at).num_seconds();
        match &removed {
            Some(session_id) => {
                tracing::info!(%session_id, conn_id = %ctx.id, connected_secs, "agent disconnected");
            }
            None => tracing::debug!(conn_id = %ctx.id, connected_secs, "client disconnected"),
        }
        removed
    }

    /// Returns the current public view of the registry.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.sessions.lock().await.snapshot()
    }

    /// Returns a copy of the session registered under `session_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::SessionNotFound`] if no such session exists.
    pub async fn lookup(&self, session_id: &str) -> Result<Session, HubError> {
        self.sessions
            .lock()
            .await
            .lookup(session_id)
            .cloned()
            .ok_or_else(|| HubError::SessionNotFound(session_id.to_string()))
    }

    /// Returns the number of registered sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Treats empty strings the same as absent fields.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
