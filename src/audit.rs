//! Fire-and-forget audit trail.
//!
//! Mutating handlers emit [`AuditEvent`]s onto a bounded channel and move
//! on; a background writer persists them to the activity_logs table. A full
//! queue or a failed insert drops the event with a warning and never fails
//! the request that produced it.

use crate::api::models::users::CurrentUser;
use crate::db::{handlers::ActivityLogs, models::activity_logs::ActivityLogCreateDBRequest};
use crate::types::{BranchId, Operation, UserId};
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// One recordable action, captured at the request boundary.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub user_id: UserId,
    pub user_name: String,
    pub operation: Operation,
    pub entity: &'static str,
    pub entity_id: Option<String>,
    pub changes: Option<serde_json::Value>,
    pub branch_id: Option<BranchId>,
}

impl AuditEvent {
    /// Capture an action by the current user against one entity.
    pub fn new(user: &CurrentUser, operation: Operation, entity: &'static str) -> Self {
        Self {
            user_id: user.id,
            user_name: user.display_name.clone(),
            operation,
            entity,
            entity_id: None,
            changes: None,
            branch_id: user.branch_id,
        }
    }

    pub fn entity_id(mut self, id: impl ToString) -> Self {
        self.entity_id = Some(id.to_string());
        self
    }

    pub fn changes(mut self, changes: serde_json::Value) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = Some(branch_id);
        self
    }
}

impl From<AuditEvent> for ActivityLogCreateDBRequest {
    fn from(event: AuditEvent) -> Self {
        Self {
            user_id: event.user_id,
            user_name: event.user_name,
            action: event.operation.to_string(),
            entity: event.entity.to_string(),
            entity_id: event.entity_id,
            changes: event.changes,
            branch_id: event.branch_id,
        }
    }
}

/// Cheap cloneable handle handlers use to emit events.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    tx: mpsc::Sender<AuditEvent>,
}

impl AuditLogger {
    /// Create a logger and the receiver the writer task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<AuditEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Queue an event without waiting. Dropped events are logged, never
    /// surfaced to the caller.
    pub fn emit(&self, event: AuditEvent) {
        if let Err(e) = self.tx.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(event) => {
                    warn!(entity = event.entity, "Audit queue full, dropping event");
                }
                mpsc::error::TrySendError::Closed(event) => {
                    warn!(entity = event.entity, "Audit writer gone, dropping event");
                }
            }
        }
    }
}

/// Spawn the writer task. It drains the channel until cancellation, then
/// flushes whatever is still queued before exiting.
pub fn spawn_audit_writer(
    db: PgPool,
    mut rx: mpsc::Receiver<AuditEvent>,
    cancellation_token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => write_event(&db, event).await,
                    None => break,
                },
                _ = cancellation_token.cancelled() => {
                    rx.close();
                    while let Some(event) = rx.recv().await {
                        write_event(&db, event).await;
                    }
                    break;
                }
            }
        }
        debug!("Audit writer stopped");
    })
}

async fn write_event(db: &PgPool, event: AuditEvent) {
    let entity = event.entity;
    let request = ActivityLogCreateDBRequest::from(event);
    let mut conn = match db.acquire().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(entity, error = %e, "Audit write skipped, no connection");
            return;
        }
    };
    if let Err(e) = ActivityLogs::new(&mut conn).create(&request).await {
        warn!(entity, error = %e, "Audit write failed");
    }
}
