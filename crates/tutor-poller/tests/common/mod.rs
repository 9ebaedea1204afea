//! Scripted generation API for poller tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tutor_core::{
    Error, GenerationApi, GenerationState, GenerationStatus, Result, StatusLookup,
};

pub const USER: i64 = 7;

/// One scripted answer to a status fetch.
#[derive(Clone)]
pub enum Step {
    Status(GenerationState),
    Missing,
    Fail,
}

#[derive(Default)]
struct Script {
    steps: HashMap<i64, VecDeque<Step>>,
    sticky: HashMap<i64, Step>,
    fetches: HashMap<i64, u32>,
    failing_starts: HashSet<i64>,
    all_statuses: Vec<GenerationStatus>,
    starts: Vec<i64>,
    start_all_calls: u32,
    resets: Vec<i64>,
    reset_delay: Option<Duration>,
    failing_reset: bool,
    failing_list: bool,
}

/// Plays back per-subject status sequences. The last step repeats once a
/// sequence runs out.
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<Script>,
}

pub fn status(subject_id: i64, state: GenerationState) -> GenerationStatus {
    let mut status = GenerationStatus::pending(USER, subject_id);
    status.status = state;
    if state == GenerationState::Failed {
        status.error_message = Some("generation failed".into());
    }
    status
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, subject_id: i64, steps: Vec<Step>) {
        self.script
            .lock()
            .unwrap()
            .steps
            .insert(subject_id, steps.into());
    }

    pub fn states(&self, subject_id: i64, states: &[GenerationState]) {
        self.script(
            subject_id,
            states.iter().copied().map(Step::Status).collect(),
        );
    }

    pub fn fail_start(&self, subject_id: i64) {
        self.script.lock().unwrap().failing_starts.insert(subject_id);
    }

    /// Make reset requests take `delay` before the backend answers.
    pub fn slow_reset(&self, delay: Duration) {
        self.script.lock().unwrap().reset_delay = Some(delay);
    }

    pub fn fail_reset(&self, failing: bool) {
        self.script.lock().unwrap().failing_reset = failing;
    }

    pub fn fail_list(&self, failing: bool) {
        self.script.lock().unwrap().failing_list = failing;
    }

    pub fn set_all_statuses(&self, statuses: Vec<GenerationStatus>) {
        self.script.lock().unwrap().all_statuses = statuses;
    }

    pub fn fetch_count(&self, subject_id: i64) -> u32 {
        self.script
            .lock()
            .unwrap()
            .fetches
            .get(&subject_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn starts(&self) -> Vec<i64> {
        self.script.lock().unwrap().starts.clone()
    }

    pub fn start_all_calls(&self) -> u32 {
        self.script.lock().unwrap().start_all_calls
    }

    pub fn resets(&self) -> Vec<i64> {
        self.script.lock().unwrap().resets.clone()
    }
}

#[async_trait]
impl GenerationApi for ScriptedApi {
    async fn start_generation(&self, _user_id: i64, subject_id: i64) -> Result<()> {
        let mut script = self.script.lock().unwrap();
        script.starts.push(subject_id);
        if script.failing_starts.contains(&subject_id) {
            return Err(Error::Request("HTTP 500: upstream unavailable".into()));
        }
        Ok(())
    }

    async fn start_all_generation(&self, _user_id: i64) -> Result<()> {
        self.script.lock().unwrap().start_all_calls += 1;
        Ok(())
    }

    async fn fetch_status(&self, _user_id: i64, subject_id: i64) -> Result<StatusLookup> {
        let mut script = self.script.lock().unwrap();
        *script.fetches.entry(subject_id).or_insert(0) += 1;

        let next = script
            .steps
            .get_mut(&subject_id)
            .and_then(|steps| steps.pop_front());
        let step = match next {
            Some(step) => {
                script.sticky.insert(subject_id, step.clone());
                step
            }
            None => script
                .sticky
                .get(&subject_id)
                .cloned()
                .unwrap_or(Step::Missing),
        };

        match step {
            Step::Status(state) => Ok(StatusLookup::from(Some(status(subject_id, state)))),
            Step::Missing => Ok(StatusLookup::from(None)),
            Step::Fail => Err(Error::Request("connection reset".into())),
        }
    }

    async fn fetch_all_statuses(&self, _user_id: i64) -> Result<Vec<GenerationStatus>> {
        let script = self.script.lock().unwrap();
        if script.failing_list {
            return Err(Error::Request("HTTP 503: list unavailable".into()));
        }
        Ok(script.all_statuses.clone())
    }

    async fn reset_generation(&self, _user_id: i64, subject_id: i64) -> Result<()> {
        let delay = self.script.lock().unwrap().reset_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut script = self.script.lock().unwrap();
        if script.failing_reset {
            return Err(Error::Request("HTTP 500: reset failed".into()));
        }
        script.resets.push(subject_id);
        script.all_statuses.retain(|s| s.subject_id != subject_id);
        Ok(())
    }
}
