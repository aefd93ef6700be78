//! Best-effort activity logging for administrative actions.

use std::sync::Arc;

use herp_core::error::best_effort;
use herp_core::result::AppResult;
use herp_core::types::{Page, PageRequest};
use herp_database::store::AuditStore;
use herp_entity::audit::{ActivityLog, CreateActivityLog, LoginHistory};
use herp_entity::principal::PrincipalRef;

use crate::context::RequestContext;

/// Writes activity log entries on behalf of services.
#[derive(Clone)]
pub struct ActivityRecorder {
    audit: Arc<dyn AuditStore>,
}

impl std::fmt::Debug for ActivityRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityRecorder").finish()
    }
}

impl ActivityRecorder {
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self { audit }
    }

    /// Record `action` on a target. Failures are logged and dropped.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        action: &str,
        target_type: &str,
        target_id: Option<String>,
        details: Option<serde_json::Value>,
    ) {
        let entry = CreateActivityLog {
            actor_kind: ctx.principal.kind,
            actor_id: ctx.principal.id,
            action: action.to_string(),
            target_type: target_type.to_string(),
            target_id,
            details,
            ip_address: ctx.ip_address.clone(),
        };
        best_effort("record_activity", self.audit.record_activity(entry)).await;
    }

    /// Activity performed by `actor`, newest first.
    pub async fn list_for(&self, actor: PrincipalRef, page: PageRequest) -> AppResult<Page<ActivityLog>> {
        self.audit.list_activity(actor, page).await
    }

    /// Login attempts across all principals, newest first.
    pub async fn login_history(&self, page: PageRequest) -> AppResult<Page<LoginHistory>> {
        self.audit.list_login_history(page).await
    }
}
