use crate::compress::{compress, Job};
use crate::constants::{ERROR_PREFIX, SUCCESS_PREFIX, SUMMARY_PREFIX};
use crate::converter::Converter;
use crate::error::{CompressionError, Result};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Outcome of one compression task.
#[derive(Debug)]
pub struct JobReport {
    pub input: PathBuf,
    /// Output path on success
    pub outcome: Result<PathBuf>,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Everything a batch run produced, returned by [`TaskCoordinator::wait_all`].
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub registered: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub reports: Vec<JobReport>,
}

impl BatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &JobReport> {
        self.reports.iter().filter(|report| !report.succeeded())
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} Batch Compression Summary:", SUMMARY_PREFIX)?;
        writeln!(f, "  📁 Files seen: {}", self.registered)?;
        writeln!(f, "  {} Compressed: {}", SUCCESS_PREFIX, self.succeeded)?;
        write!(f, "  {} Failed: {}", ERROR_PREFIX, self.failed)
    }
}

struct Shared {
    outstanding: Mutex<usize>,
    idle: Condvar,
    registered: AtomicUsize,
    reports: Mutex<Vec<JobReport>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking task is already reported as a failure; keep counting.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn complete(&self, report: JobReport) {
        lock(&self.reports).push(report);

        let mut outstanding = lock(&self.outstanding);
        *outstanding -= 1;
        if *outstanding == 0 {
            self.idle.notify_all();
        }
    }
}

/// Runs compression jobs on a bounded worker pool and waits for all of them.
///
/// Every [`register`](Self::register) must be matched by exactly one
/// [`complete`](Self::complete); [`dispatch`](Self::dispatch) does both.
pub struct TaskCoordinator {
    pool: rayon::ThreadPool,
    converter: Arc<dyn Converter>,
    shared: Arc<Shared>,
}

impl TaskCoordinator {
    /// `workers` is the maximum number of conversions running at once.
    pub fn new(workers: usize, converter: Arc<dyn Converter>) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.max(1))
            .thread_name(|index| format!("squeeze-worker-{}", index))
            .build()?;

        Ok(Self {
            pool,
            converter,
            shared: Arc::new(Shared {
                outstanding: Mutex::new(0),
                idle: Condvar::new(),
                registered: AtomicUsize::new(0),
                reports: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Tasks registered and not yet completed.
    pub fn outstanding(&self) -> usize {
        *lock(&self.shared.outstanding)
    }

    /// Tasks registered since the coordinator was created.
    pub fn registered(&self) -> usize {
        self.shared.registered.load(Ordering::SeqCst)
    }

    pub fn register(&self) {
        *lock(&self.shared.outstanding) += 1;
        self.shared.registered.fetch_add(1, Ordering::SeqCst);
    }

    pub fn complete(&self, report: JobReport) {
        self.shared.complete(report);
    }

    /// Registers `job` and queues it on the pool.
    pub fn dispatch(&self, job: Job) {
        self.register();

        let shared = Arc::clone(&self.shared);
        let converter = Arc::clone(&self.converter);
        self.pool.spawn(move || {
            let input = job.input_path();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| compress(&job, converter.as_ref())))
                .unwrap_or_else(|payload| Err(CompressionError::TaskPanicked(panic_message(payload.as_ref()))));

            match &outcome {
                Ok(output) => log::info!("{} Compressed: {:?} -> {:?}", SUCCESS_PREFIX, input, output),
                Err(e) => log::error!("{} Failed to compress {:?}: {}", ERROR_PREFIX, input, e),
            }
            shared.complete(JobReport { input, outcome });
        });
    }

    /// Registers and immediately completes a task that failed before it could be queued.
    pub fn record_failure(&self, input: &Path, error: CompressionError) {
        log::error!("{} Failed to compress {:?}: {}", ERROR_PREFIX, input, error);
        self.register();
        self.complete(JobReport {
            input: input.to_path_buf(),
            outcome: Err(error),
        });
    }

    /// Blocks until the outstanding count reaches zero, then summarises.
    pub fn wait_all(self) -> BatchSummary {
        {
            let mut outstanding = lock(&self.shared.outstanding);
            while *outstanding > 0 {
                outstanding = self
                    .shared
                    .idle
                    .wait(outstanding)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }

        let reports = std::mem::take(&mut *lock(&self.shared.reports));
        let succeeded = reports.iter().filter(|report| report.succeeded()).count();
        BatchSummary {
            registered: self.registered(),
            succeeded,
            failed: reports.len() - succeeded,
            reports,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
