//! Generation status service.

use std::sync::Arc;

use tracing::info;

use tutor_core::{
    parse_subject_id, parse_user_id, GenerationAck, GenerationStatus, GenerationStatusRepository,
    Result, StatusLookup, StatusUpdate,
};

use super::log_failure;

const COMPONENT: &str = "generation";

/// Generation status contract consumed by the client poller.
#[derive(Clone)]
pub struct GenerationService {
    repo: Arc<dyn GenerationStatusRepository>,
}

impl GenerationService {
    pub fn new(repo: Arc<dyn GenerationStatusRepository>) -> Self {
        Self { repo }
    }

    fn ids(op: &'static str, user_id: &str, subject_id: &str) -> Result<(i64, i64)> {
        let parsed = parse_user_id(user_id).and_then(|u| Ok((u, parse_subject_id(subject_id)?)));
        parsed.inspect_err(|e| log_failure(COMPONENT, op, e))
    }

    /// Queue (or re-queue) generation for one subject.
    pub async fn start(&self, user_id: &str, subject_id: &str) -> Result<GenerationStatus> {
        let (user_id, subject_id) = Self::ids("start", user_id, subject_id)?;
        let status = self
            .repo
            .start(user_id, subject_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "start", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "start",
            user_id,
            subject_id,
            "Generation queued"
        );
        Ok(status)
    }

    /// Queue generation for every enrolled subject that has none or whose last run failed.
    pub async fn start_all(&self, user_id: &str) -> Result<GenerationAck> {
        let user_id =
            parse_user_id(user_id).inspect_err(|e| log_failure(COMPONENT, "start_all", e))?;
        let queued = self
            .repo
            .start_all(user_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "start_all", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "start_all",
            user_id,
            result_count = queued,
            "Bulk generation queued"
        );
        Ok(GenerationAck { queued })
    }

    pub async fn status(&self, user_id: &str, subject_id: &str) -> Result<StatusLookup> {
        let (user_id, subject_id) = Self::ids("status", user_id, subject_id)?;
        let status = self
            .repo
            .get(user_id, subject_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "status", e))?;
        Ok(StatusLookup::from(status))
    }

    pub async fn list(&self, user_id: &str) -> Result<Vec<GenerationStatus>> {
        let user_id = parse_user_id(user_id).inspect_err(|e| log_failure(COMPONENT, "list", e))?;
        self.repo
            .list_for_user(user_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "list", e))
    }

    /// Progress hook for the generation worker.
    pub async fn update(
        &self,
        user_id: &str,
        subject_id: &str,
        update: StatusUpdate,
    ) -> Result<GenerationStatus> {
        let (user_id, subject_id) = Self::ids("update", user_id, subject_id)?;
        let status = self
            .repo
            .update(user_id, subject_id, update)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "update", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "update",
            user_id,
            subject_id,
            status = %status.status,
            "Generation status updated"
        );
        Ok(status)
    }

    /// Delete generated chapters and topics along with the status record.
    pub async fn reset(&self, user_id: &str, subject_id: &str) -> Result<()> {
        let (user_id, subject_id) = Self::ids("reset", user_id, subject_id)?;
        self.repo
            .reset(user_id, subject_id)
            .await
            .inspect_err(|e| log_failure(COMPONENT, "reset", e))?;
        info!(
            subsystem = "api",
            component = COMPONENT,
            op = "reset",
            user_id,
            subject_id,
            "Generation reset"
        );
        Ok(())
    }
}
