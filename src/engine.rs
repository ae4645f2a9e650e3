// Generation engine: plans a run, drives the write loop on a blocking worker,
// and publishes progress snapshots (broadcast for push, `latest()` for polling).

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::cancel::CancellationToken;
use crate::disk_repo::FreeSpaceProbe;
use crate::error::GenerationError;
use crate::models::{RunProgress, RunRequest, RunState};
use crate::namer;
use crate::planner::{self, GenerationPlan};
use crate::random_source::{RandomByteSource, ThreadRngSource};
use crate::writer::{self, DEFAULT_CHUNK_SIZE_BYTES, WriteOutcome};

/// Engine lifecycle; a terminal state lasts until the next `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl From<RunState> for EngineState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Running => EngineState::Running,
            RunState::Completed => EngineState::Completed,
            RunState::Cancelled => EngineState::Cancelled,
            RunState::Failed => EngineState::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub chunk_size_bytes: u64,
    /// Snapshots buffered per subscriber; slow subscribers lag and skip ahead.
    pub broadcast_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            broadcast_capacity: 64,
        }
    }
}

/// Seconds left at the average rate observed so far. `None` until something was written.
pub fn estimate_remaining_seconds(bytes_written: u64, bytes_goal: u64, elapsed_seconds: f64) -> Option<f64> {
    if bytes_written == 0 || elapsed_seconds <= 0.0 {
        return None;
    }
    let bytes_per_second = bytes_written as f64 / elapsed_seconds;
    Some(bytes_goal.saturating_sub(bytes_written) as f64 / bytes_per_second)
}

/// Everything one run needs; borrowed so tests can drive it without a runtime.
pub struct RunContext<'a> {
    pub request: &'a RunRequest,
    pub plan: GenerationPlan,
    pub chunk_size_bytes: u64,
    pub probe: &'a dyn FreeSpaceProbe,
    pub source: &'a mut dyn RandomByteSource,
    pub cancel: &'a CancellationToken,
}

struct Tracker {
    started: Instant,
    plan: GenerationPlan,
    files_completed: u64,
    bytes_written: u64,
    free_bytes: u64,
}

impl Tracker {
    fn snapshot(&self, state: RunState, error: Option<String>) -> RunProgress {
        let elapsed_seconds = self.started.elapsed().as_secs_f64();
        RunProgress {
            files_completed: self.files_completed,
            files_target: self.plan.files_target,
            total_bytes_written: self.bytes_written,
            total_bytes_goal: self.plan.total_bytes_goal,
            elapsed_seconds,
            estimated_remaining_seconds: estimate_remaining_seconds(
                self.bytes_written,
                self.plan.total_bytes_goal,
                elapsed_seconds,
            ),
            current_free_space_bytes: self.free_bytes,
            state,
            error,
        }
    }
}

/// Runs the write loop to a terminal state on the calling thread.
///
/// `publish` sees a `Running` snapshot after every chunk and every finished file, then
/// exactly one terminal snapshot, which is also returned.
pub fn run_blocking(ctx: RunContext<'_>, mut publish: impl FnMut(RunProgress)) -> RunProgress {
    let RunContext {
        request,
        plan,
        chunk_size_bytes,
        probe,
        source,
        cancel,
    } = ctx;
    let dir = request.target_directory.as_path();

    let mut tracker = Tracker {
        started: Instant::now(),
        plan,
        files_completed: 0,
        bytes_written: 0,
        free_bytes: probe.free_bytes(dir),
    };

    let run_span = tracing::span!(
        tracing::Level::DEBUG,
        "run",
        dir = %dir.display(),
        mode = ?plan.mode
    );
    let _enter = run_span.enter();

    let outcome = write_files(
        dir,
        chunk_size_bytes,
        probe,
        source,
        cancel,
        &mut tracker,
        &mut publish,
    );

    // Final probe so the last snapshot never carries stale free space.
    tracker.free_bytes = probe.free_bytes(dir);
    let last = match outcome {
        Ok(state) => tracker.snapshot(state, None),
        Err(e) => {
            tracing::warn!(error = %e, operation = "generate", "run failed");
            tracker.snapshot(RunState::Failed, Some(e.to_string()))
        }
    };
    tracing::info!(
        state = ?last.state,
        files = last.files_completed,
        bytes = last.total_bytes_written,
        elapsed_secs = last.elapsed_seconds,
        "run finished"
    );
    publish(last.clone());
    last
}

fn write_files(
    dir: &Path,
    chunk_size_bytes: u64,
    probe: &dyn FreeSpaceProbe,
    source: &mut dyn RandomByteSource,
    cancel: &CancellationToken,
    tracker: &mut Tracker,
    publish: &mut impl FnMut(RunProgress),
) -> Result<RunState, GenerationError> {
    let mut index = namer::find_start_index(dir)?;
    tracing::debug!(start_index = index, "resolved start index");

    loop {
        if !planner::should_continue(
            tracker.free_bytes,
            tracker.files_completed,
            tracker.plan.files_target,
        ) {
            return Ok(RunState::Completed);
        }
        if cancel.is_cancelled() {
            return Ok(RunState::Cancelled);
        }
        let file_size = tracker.plan.next_file_size(tracker.bytes_written, tracker.free_bytes);
        if file_size == 0 {
            return Ok(RunState::Completed);
        }

        let (name, next_index) = namer::next_available_name(dir, index)?;
        let path = dir.join(&name);
        tracing::debug!(file = %name, bytes = file_size, "writing file");

        let outcome = writer::write_file(&path, file_size, chunk_size_bytes, source, cancel, |n| {
            tracker.bytes_written += n;
            tracker.free_bytes = probe.free_bytes(dir);
            publish(tracker.snapshot(RunState::Running, None));
        });
        match outcome {
            WriteOutcome::Completed => {
                tracker.files_completed += 1;
                index = next_index;
                publish(tracker.snapshot(RunState::Running, None));
            }
            WriteOutcome::Cancelled => return Ok(RunState::Cancelled),
            WriteOutcome::Failed(e) => return Err(e),
        }
    }
}

struct Shared {
    state: Mutex<EngineState>,
    latest: Mutex<Option<RunProgress>>,
    active: Mutex<Option<CancellationToken>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn publish(&self, tx: &broadcast::Sender<RunProgress>, snapshot: RunProgress) {
        if snapshot.state.is_terminal() {
            *lock(&self.state) = snapshot.state.into();
        }
        *lock(&self.latest) = Some(snapshot.clone());
        if tx.send(snapshot).is_err() {
            tracing::trace!(operation = "broadcast_progress", "no progress subscribers");
        }
    }
}

/// Releases the run slot when the worker exits. A run that died without a terminal
/// snapshot (panic) is published as failed so subscribers waiting for the end wake up.
struct RunGuard {
    shared: Arc<Shared>,
    tx: broadcast::Sender<RunProgress>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let died = *lock(&self.shared.state) == EngineState::Running;
        *lock(&self.shared.active) = None;
        if !died {
            return;
        }

        tracing::error!(operation = "generate", "generation worker panicked");
        let last = lock(&self.shared.latest).clone();
        match last {
            Some(mut last) => {
                last.state = RunState::Failed;
                last.estimated_remaining_seconds = None;
                last.error = Some(WORKER_PANICKED.into());
                self.shared.publish(&self.tx, last);
            }
            None => *lock(&self.shared.state) = EngineState::Failed,
        }
    }
}

const WORKER_PANICKED: &str = "generation worker panicked";

pub struct GenerationEngine {
    probe: Arc<dyn FreeSpaceProbe>,
    config: EngineConfig,
    tx: broadcast::Sender<RunProgress>,
    shared: Arc<Shared>,
}

impl GenerationEngine {
    pub fn new(probe: Arc<dyn FreeSpaceProbe>, config: EngineConfig) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            probe,
            config,
            tx,
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState::Idle),
                latest: Mutex::new(None),
                active: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunProgress> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> Option<RunProgress> {
        lock(&self.shared.latest).clone()
    }

    pub fn state(&self) -> EngineState {
        *lock(&self.shared.state)
    }

    /// Requests cancellation of the active run; the worker stops at the next chunk boundary.
    pub fn cancel(&self) {
        if let Some(token) = lock(&self.shared.active).as_ref() {
            tracing::info!("cancellation requested");
            token.cancel();
        }
    }

    /// Validates and plans `request`, then runs it on a blocking worker.
    ///
    /// Planning performs one blocking free-space query on the caller's thread, outside
    /// the run slot lock, so `cancel()` and `state()` never wait on it. Rejections (bad
    /// request, nothing to write, run already active) leave the engine untouched. Must be
    /// called from within a tokio runtime.
    pub fn start(&self, request: RunRequest) -> Result<RunHandle, GenerationError> {
        request.validate()?;
        if self.config.chunk_size_bytes == 0 {
            return Err(GenerationError::Validation(
                "chunk size must be greater than 0 bytes".into(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| GenerationError::Runtime(e.to_string()))?;

        let initial_free = self.probe.free_bytes(&request.target_directory);
        let plan = planner::plan(&request, initial_free)?;

        let mut active = lock(&self.shared.active);
        if active.is_some() {
            return Err(GenerationError::AlreadyRunning);
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        drop(active);
        *lock(&self.shared.state) = EngineState::Running;

        tracing::info!(
            dir = %request.target_directory.display(),
            mode = ?plan.mode,
            files_target = plan.files_target,
            bytes_goal = plan.total_bytes_goal,
            free_bytes = initial_free,
            "generation started"
        );
        self.shared.publish(
            &self.tx,
            RunProgress {
                files_completed: 0,
                files_target: plan.files_target,
                total_bytes_written: 0,
                total_bytes_goal: plan.total_bytes_goal,
                elapsed_seconds: 0.0,
                estimated_remaining_seconds: None,
                current_free_space_bytes: initial_free,
                state: RunState::Running,
                error: None,
            },
        );

        let probe = self.probe.clone();
        let chunk_size_bytes = self.config.chunk_size_bytes;
        let tx = self.tx.clone();
        let shared = self.shared.clone();
        let worker_token = token.clone();
        let task = runtime.spawn_blocking(move || {
            let _guard = RunGuard {
                shared: shared.clone(),
                tx: tx.clone(),
            };
            let mut source = ThreadRngSource;
            run_blocking(
                RunContext {
                    request: &request,
                    plan,
                    chunk_size_bytes,
                    probe: probe.as_ref(),
                    source: &mut source,
                    cancel: &worker_token,
                },
                |snapshot| shared.publish(&tx, snapshot),
            )
        });

        Ok(RunHandle { token, task })
    }
}

/// Handle to a started run.
pub struct RunHandle {
    token: CancellationToken,
    task: JoinHandle<RunProgress>,
}

impl RunHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the worker and returns the terminal snapshot.
    pub async fn join(self) -> Result<RunProgress, GenerationError> {
        self.task
            .await
            .map_err(|e| GenerationError::Runtime(e.to_string()))
    }
}
