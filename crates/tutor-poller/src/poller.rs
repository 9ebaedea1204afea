//! Generation status poller.
//!
//! One tokio task per subject being generated. Each task checks the backend on
//! a fixed period, records progress in the shared view, and ends on a terminal
//! status, the polling ceiling, too many failed fetches, or cancellation. The
//! poller owns every task handle; dropping it aborts them all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use tutor_core::{defaults, Error, GenerationApi, GenerationState, GenerationStatus, Result};

use crate::config::PollerConfig;
use crate::state::{FailureReason, SubjectState, SubjectView};

/// Event emitted by the poller.
#[derive(Debug, Clone, PartialEq)]
pub enum PollerEvent {
    /// A start request was issued for a subject.
    Requested { subject_id: i64 },
    /// A non-terminal status was observed.
    Progress {
        subject_id: i64,
        status: GenerationStatus,
    },
    /// Generation finished successfully.
    Completed {
        subject_id: i64,
        status: GenerationStatus,
    },
    /// Monitoring ended without completion.
    Failed {
        subject_id: i64,
        reason: FailureReason,
    },
    /// Generated content for a subject was deleted.
    Reset { subject_id: i64 },
}

impl PollerEvent {
    pub fn subject_id(&self) -> i64 {
        match self {
            PollerEvent::Requested { subject_id }
            | PollerEvent::Progress { subject_id, .. }
            | PollerEvent::Completed { subject_id, .. }
            | PollerEvent::Failed { subject_id, .. }
            | PollerEvent::Reset { subject_id } => *subject_id,
        }
    }

    /// Completed or Failed: no further events follow for this poll.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollerEvent::Completed { .. } | PollerEvent::Failed { .. }
        )
    }
}

struct PollTask {
    token: u64,
    handle: JoinHandle<()>,
}

enum Outcome {
    Finished(GenerationStatus),
    TimedOut,
    PollError(String),
}

struct Inner {
    api: Arc<dyn GenerationApi>,
    user_id: i64,
    config: PollerConfig,
    views: RwLock<HashMap<i64, SubjectView>>,
    tasks: Mutex<HashMap<i64, PollTask>>,
    next_token: AtomicU64,
    event_tx: broadcast::Sender<PollerEvent>,
}

/// Tracks content generation for the subjects of one user.
pub struct GenerationPoller {
    inner: Arc<Inner>,
}

impl GenerationPoller {
    pub fn new(api: Arc<dyn GenerationApi>, user_id: i64, config: PollerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(defaults::EVENT_BUS_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                api,
                user_id,
                config,
                views: RwLock::new(HashMap::new()),
                tasks: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(1),
                event_tx,
            }),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.inner.user_id
    }

    /// Subscribe to poller events.
    pub fn events(&self) -> broadcast::Receiver<PollerEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Request generation for one subject and start polling it.
    ///
    /// Fails with `Conflict` when the subject is already requested or polling.
    /// When the start request fails the subject returns to idle and the error
    /// is passed through.
    pub async fn start(&self, subject_id: i64) -> Result<()> {
        {
            let mut views = self.inner.views.write().await;
            let view = views
                .entry(subject_id)
                .or_insert_with(|| SubjectView::idle(subject_id));
            if view.state.is_active() {
                return Err(Error::Conflict(format!(
                    "Generation for subject {} is already in progress",
                    subject_id
                )));
            }
            view.state = SubjectState::Requested;
            view.fetch_count = 0;
        }
        self.inner.emit(PollerEvent::Requested { subject_id });

        if let Err(e) = self
            .inner
            .api
            .start_generation(self.inner.user_id, subject_id)
            .await
        {
            warn!(
                subsystem = "poller",
                op = "start",
                user_id = self.inner.user_id,
                subject_id,
                error = %e,
                "Start request failed"
            );
            if let Some(view) = self.inner.views.write().await.get_mut(&subject_id) {
                view.state = SubjectState::Idle;
            }
            return Err(e);
        }

        self.inner.begin_polling(subject_id, None).await;
        Ok(())
    }

    /// Start each subject independently. One failure never affects the others.
    pub async fn start_many(&self, subject_ids: &[i64]) -> Vec<(i64, Result<()>)> {
        let mut results = Vec::with_capacity(subject_ids.len());
        for &subject_id in subject_ids {
            results.push((subject_id, self.start(subject_id).await));
        }
        results
    }

    /// Request generation for every subject of the user, then poll each
    /// subject whose status is not terminal. Returns the subjects now polled.
    pub async fn start_all(&self) -> Result<Vec<i64>> {
        self.inner
            .api
            .start_all_generation(self.inner.user_id)
            .await?;
        let started = self.sync_statuses().await?;
        info!(
            subsystem = "poller",
            op = "start_all",
            user_id = self.inner.user_id,
            result_count = started.len(),
            "Bulk generation requested"
        );
        Ok(started)
    }

    /// Re-read all statuses. Subjects with a non-terminal status that are not
    /// being polled start polling; idle and terminal views are replaced.
    pub async fn refresh(&self) -> Result<Vec<SubjectView>> {
        self.sync_statuses().await?;
        Ok(self.snapshot().await)
    }

    /// Delete a subject's generated content, then re-read all statuses.
    ///
    /// Rejected with `Conflict` while the subject is requested, polling or
    /// already resetting. The subject stays `Resetting` until the backend
    /// answers, so a concurrent `start` is rejected too. A failed status
    /// refresh after a successful reset is logged and does not fail the call.
    pub async fn reset(&self, subject_id: i64) -> Result<()> {
        let previous = {
            let mut views = self.inner.views.write().await;
            let known = views.contains_key(&subject_id);
            let view = views
                .entry(subject_id)
                .or_insert_with(|| SubjectView::idle(subject_id));
            if view.state.is_active() {
                return Err(Error::Conflict(format!(
                    "Cannot reset subject {} while generation is in progress",
                    subject_id
                )));
            }
            let prior = std::mem::replace(&mut view.state, SubjectState::Resetting);
            known.then_some(prior)
        };

        if let Err(e) = self
            .inner
            .api
            .reset_generation(self.inner.user_id, subject_id)
            .await
        {
            let mut views = self.inner.views.write().await;
            match previous {
                Some(state) => {
                    if let Some(view) = views.get_mut(&subject_id) {
                        view.state = state;
                    }
                }
                None => {
                    views.remove(&subject_id);
                }
            }
            return Err(e);
        }

        self.inner.abort(subject_id);
        self.inner.views.write().await.remove(&subject_id);
        self.inner.emit(PollerEvent::Reset { subject_id });
        info!(
            subsystem = "poller",
            op = "reset",
            user_id = self.inner.user_id,
            subject_id,
            "Generation reset"
        );

        if let Err(e) = self.sync_statuses().await {
            warn!(
                subsystem = "poller",
                op = "reset",
                user_id = self.inner.user_id,
                subject_id,
                error = %e,
                "Status refresh after reset failed"
            );
        }
        Ok(())
    }

    /// Stop polling a subject. Returns whether a poll was running.
    pub async fn cancel(&self, subject_id: i64) -> bool {
        let cancelled = self.inner.abort(subject_id);
        if cancelled {
            if let Some(view) = self.inner.views.write().await.get_mut(&subject_id) {
                view.state = SubjectState::Idle;
            }
            debug!(subsystem = "poller", op = "cancel", subject_id, "Polling cancelled");
        }
        cancelled
    }

    /// Stop every poll.
    pub fn shutdown(&self) {
        self.inner.abort_all();
    }

    /// Current view of every known subject, ordered by subject id.
    pub async fn snapshot(&self) -> Vec<SubjectView> {
        let mut views: Vec<SubjectView> = self.inner.views.read().await.values().cloned().collect();
        views.sort_by_key(|v| v.subject_id);
        views
    }

    /// Views of the given subjects that reached a terminal state. Lets a
    /// subscriber that lagged behind the event stream catch up.
    pub async fn settled(&self, subject_ids: &[i64]) -> Vec<SubjectView> {
        let views = self.inner.views.read().await;
        let mut settled: Vec<SubjectView> = subject_ids
            .iter()
            .filter_map(|id| views.get(id))
            .filter(|view| view.state.is_terminal())
            .cloned()
            .collect();
        settled.sort_by_key(|v| v.subject_id);
        settled
    }

    pub async fn view(&self, subject_id: i64) -> Option<SubjectView> {
        self.inner.views.read().await.get(&subject_id).cloned()
    }

    /// Whether a poll task currently exists for the subject.
    pub fn is_polling(&self, subject_id: i64) -> bool {
        self.inner.lock_tasks().contains_key(&subject_id)
    }

    /// Number of live poll tasks.
    pub fn active_polls(&self) -> usize {
        self.inner.lock_tasks().len()
    }

    async fn sync_statuses(&self) -> Result<Vec<i64>> {
        let statuses = self
            .inner
            .api
            .fetch_all_statuses(self.inner.user_id)
            .await?;

        let mut resume = Vec::new();
        {
            let mut views = self.inner.views.write().await;
            let seen: Vec<i64> = statuses.iter().map(|s| s.subject_id).collect();
            views.retain(|id, view| view.state.is_active() || seen.contains(id));

            for status in statuses {
                let view = views
                    .entry(status.subject_id)
                    .or_insert_with(|| SubjectView::idle(status.subject_id));
                if view.state.is_active() {
                    continue;
                }
                if !status.is_terminal() {
                    view.state = SubjectState::Polling;
                    view.fetch_count = 0;
                    resume.push((status.subject_id, status.clone()));
                } else {
                    view.state = SubjectState::from_status(&status);
                }
                view.last_status = Some(status);
            }
        }

        let mut started = Vec::with_capacity(resume.len());
        for (subject_id, status) in resume {
            self.inner.begin_polling(subject_id, Some(status)).await;
            started.push(subject_id);
        }
        Ok(started)
    }
}

impl Drop for GenerationPoller {
    fn drop(&mut self) {
        self.inner.abort_all();
    }
}

impl Inner {
    fn emit(&self, event: PollerEvent) {
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    async fn begin_polling(self: &Arc<Self>, subject_id: i64, last: Option<GenerationStatus>) {
        {
            let mut views = self.views.write().await;
            let view = views
                .entry(subject_id)
                .or_insert_with(|| SubjectView::idle(subject_id));
            view.state = SubjectState::Polling;
            if last.is_some() {
                view.last_status = last;
            }
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        {
            let mut tasks = self.lock_tasks();
            // Spawned under the lock so the task cannot finish before it is registered.
            let handle = tokio::spawn(poll_subject(Arc::clone(self), subject_id, token));
            if let Some(previous) = tasks.insert(subject_id, PollTask { token, handle }) {
                previous.handle.abort();
            }
        }
        debug!(
            subsystem = "poller",
            op = "begin",
            user_id = self.user_id,
            subject_id,
            "Polling started"
        );
    }

    /// Task map guard. The map stays consistent even if a holder panicked.
    fn lock_tasks(&self) -> MutexGuard<'_, HashMap<i64, PollTask>> {
        self.tasks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn abort(&self, subject_id: i64) -> bool {
        match self.lock_tasks().remove(&subject_id) {
            Some(task) => {
                task.handle.abort();
                true
            }
            None => false,
        }
    }

    fn abort_all(&self) {
        for (_, task) in self.lock_tasks().drain() {
            task.handle.abort();
        }
    }

    async fn record_progress(&self, subject_id: i64, status: GenerationStatus, fetches: u32) {
        if let Some(view) = self.views.write().await.get_mut(&subject_id) {
            view.last_status = Some(status.clone());
            view.fetch_count = fetches;
        }
        self.emit(PollerEvent::Progress { subject_id, status });
    }

    /// Record the end of a poll. The task entry is removed before the final
    /// event is sent; a superseded or cancelled task changes nothing.
    async fn finish(&self, subject_id: i64, token: u64, outcome: Outcome, fetches: u32) {
        let owned = {
            let mut tasks = self.lock_tasks();
            match tasks.get(&subject_id) {
                Some(task) if task.token == token => {
                    tasks.remove(&subject_id);
                    true
                }
                _ => false,
            }
        };
        if !owned {
            return;
        }

        let event = {
            let mut views = self.views.write().await;
            let view = views
                .entry(subject_id)
                .or_insert_with(|| SubjectView::idle(subject_id));
            view.fetch_count = fetches;

            match outcome {
                Outcome::Finished(status) => {
                    view.state = SubjectState::from_status(&status);
                    view.last_status = Some(status.clone());
                    let state = status.status;
                    match state {
                        GenerationState::Completed => PollerEvent::Completed { subject_id, status },
                        _ => PollerEvent::Failed {
                            subject_id,
                            reason: FailureReason::Generation {
                                message: status.error_message,
                            },
                        },
                    }
                }
                Outcome::TimedOut => {
                    view.state = SubjectState::Failed(FailureReason::TimedOut);
                    PollerEvent::Failed {
                        subject_id,
                        reason: FailureReason::TimedOut,
                    }
                }
                Outcome::PollError(message) => {
                    let reason = FailureReason::PollError { message };
                    view.state = SubjectState::Failed(reason.clone());
                    PollerEvent::Failed { subject_id, reason }
                }
            }
        };

        info!(
            subsystem = "poller",
            op = "finish",
            user_id = self.user_id,
            subject_id,
            fetch_count = fetches,
            event = ?event,
            "Polling ended"
        );
        self.emit(event);
    }
}

async fn poll_subject(inner: Arc<Inner>, subject_id: i64, token: u64) {
    let period = inner.config.poll_interval();
    let deadline = Instant::now() + inner.config.timeout();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut fetches: u32 = 0;
    let mut consecutive_errors: u32 = 0;

    let outcome = loop {
        tokio::select! {
            biased;
            _ = tokio::time::sleep_until(deadline) => break Outcome::TimedOut,
            _ = ticker.tick() => {}
        }

        fetches += 1;
        let fetched = timeout_at(deadline, inner.api.fetch_status(inner.user_id, subject_id)).await;
        let Ok(fetched) = fetched else {
            break Outcome::TimedOut;
        };

        match fetched {
            Ok(lookup) => {
                consecutive_errors = 0;
                match lookup.status {
                    Some(status) if status.is_terminal() => break Outcome::Finished(status),
                    Some(status) => inner.record_progress(subject_id, status, fetches).await,
                    None => debug!(
                        subsystem = "poller",
                        subject_id,
                        "No status recorded yet"
                    ),
                }
            }
            Err(e) => {
                consecutive_errors += 1;
                warn!(
                    subsystem = "poller",
                    op = "fetch_status",
                    user_id = inner.user_id,
                    subject_id,
                    consecutive_errors,
                    error = %e,
                    "Status fetch failed"
                );
                if consecutive_errors >= inner.config.error_limit() {
                    break Outcome::PollError(e.to_string());
                }
            }
        }
    };

    inner.finish(subject_id, token, outcome, fetches).await;
}
