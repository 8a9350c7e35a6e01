//! [`JobQueue`]: admission, the worker pool, and drain.

use std::{
  sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
  },
  time::Instant,
};

use kplan_core::{AnalyzeItem, Job};
use tokio::{
  sync::{Mutex as AsyncMutex, mpsc},
  task::JoinHandle,
};
use tracing::{debug, error, info, warn};

use crate::{
  config::QueueConfig, error::EnqueueError, handler::JobHandler, item_slots::ItemSlots,
};

// ─── Channel ─────────────────────────────────────────────────────────────────

enum Sender {
  Unbounded(mpsc::UnboundedSender<Job>),
  Bounded(mpsc::Sender<Job>),
}

enum Receiver {
  Unbounded(mpsc::UnboundedReceiver<Job>),
  Bounded(mpsc::Receiver<Job>),
}

impl Receiver {
  async fn recv(&mut self) -> Option<Job> {
    match self {
      Self::Unbounded(rx) => rx.recv().await,
      Self::Bounded(rx) => rx.recv().await,
    }
  }
}

fn channel(capacity: Option<usize>) -> (Sender, Receiver) {
  match capacity {
    None => {
      let (tx, rx) = mpsc::unbounded_channel();
      (Sender::Unbounded(tx), Receiver::Unbounded(rx))
    }
    Some(capacity) => {
      let (tx, rx) = mpsc::channel(capacity.max(1));
      (Sender::Bounded(tx), Receiver::Bounded(rx))
    }
  }
}

// ─── Queue ───────────────────────────────────────────────────────────────────

/// Handle to a running job queue.
///
/// Cheap to clone; every clone admits into the same buffer and worker pool.
/// Safe to use from any number of request handlers without extra locking.
#[derive(Clone)]
pub struct JobQueue {
  inner: Arc<Inner>,
}

struct Inner {
  /// `None` once draining has begun.
  sender:  Mutex<Option<Sender>>,
  /// Jobs admitted but not yet finished (waiting plus running).
  size:    Arc<AtomicUsize>,
  workers: Mutex<Vec<JoinHandle<()>>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl JobQueue {
  /// Spawn `config.concurrency` workers executing jobs with `handler`.
  ///
  /// Must be called from within a tokio runtime.
  pub fn start<H: JobHandler>(config: &QueueConfig, handler: H) -> Self {
    let concurrency = config.concurrency.max(1);
    let (tx, rx) = channel(config.capacity);
    let size = Arc::new(AtomicUsize::new(0));

    let executor = Arc::new(Executor {
      handler:    Arc::new(handler),
      item_slots: config
        .serialize_per_item
        .then(ItemSlots::default),
    });
    let rx = Arc::new(AsyncMutex::new(rx));

    let workers = (0..concurrency)
      .map(|worker| {
        tokio::spawn(run_worker(
          worker,
          rx.clone(),
          executor.clone(),
          size.clone(),
        ))
      })
      .collect();

    info!(
      concurrency,
      capacity = ?config.capacity,
      serialize_per_item = config.serialize_per_item,
      "job queue started",
    );

    Self {
      inner: Arc::new(Inner {
        sender: Mutex::new(Some(tx)),
        size,
        workers: Mutex::new(workers),
      }),
    }
  }

  /// Admit `job` for eventual execution and return immediately.
  ///
  /// Never waits for the job to run and never reports its outcome. With an
  /// unbounded buffer this only fails once the queue is draining; with a
  /// bounded one it also fails when the buffer is full.
  pub fn enqueue(&self, job: Job) -> Result<(), EnqueueError> {
    let sender = lock(&self.inner.sender);
    let Some(sender) = sender.as_ref() else {
      return Err(EnqueueError::Closed(job));
    };

    self.inner.size.fetch_add(1, Ordering::SeqCst);
    let sent = match sender {
      Sender::Unbounded(tx) => tx.send(job).map_err(|e| EnqueueError::Closed(e.0)),
      Sender::Bounded(tx) => tx.try_send(job).map_err(|e| match e {
        mpsc::error::TrySendError::Full(job) => EnqueueError::Full(job),
        mpsc::error::TrySendError::Closed(job) => EnqueueError::Closed(job),
      }),
    };
    if sent.is_err() {
      self.inner.size.fetch_sub(1, Ordering::SeqCst);
    }
    sent
  }

  /// Like [`enqueue`](Self::enqueue), but waits for buffer space instead of
  /// refusing when a bounded buffer is full.
  pub async fn enqueue_wait(&self, job: Job) -> Result<(), EnqueueError> {
    let tx = {
      let sender = lock(&self.inner.sender);
      match sender.as_ref() {
        None => return Err(EnqueueError::Closed(job)),
        Some(Sender::Unbounded(_)) => None,
        Some(Sender::Bounded(tx)) => Some(tx.clone()),
      }
    };
    let Some(tx) = tx else {
      return self.enqueue(job);
    };

    self.inner.size.fetch_add(1, Ordering::SeqCst);
    tx.send(job).await.map_err(|e| {
      self.inner.size.fetch_sub(1, Ordering::SeqCst);
      EnqueueError::Closed(e.0)
    })
  }

  /// Jobs waiting for a worker plus jobs currently executing.
  ///
  /// For observability only; the value may be stale by the time it is read.
  pub fn size(&self) -> usize { self.inner.size.load(Ordering::SeqCst) }

  pub fn is_closed(&self) -> bool { lock(&self.inner.sender).is_none() }

  /// Stop admitting jobs, let every admitted job finish, and wait for the
  /// workers to exit.
  ///
  /// Subsequent calls return immediately.
  pub async fn drain(&self) {
    let sender = lock(&self.inner.sender).take();
    if sender.is_some() {
      info!(size = self.size(), "draining job queue");
    }
    drop(sender);

    let workers = std::mem::take(&mut *lock(&self.inner.workers));
    for worker in workers {
      if let Err(e) = worker.await {
        error!(error = %e, "queue worker exited abnormally");
      }
    }
    debug!("job queue drained");
  }
}

// ─── Workers ─────────────────────────────────────────────────────────────────

struct Executor<H> {
  handler:    Arc<H>,
  item_slots: Option<ItemSlots>,
}

async fn run_worker<H: JobHandler>(
  worker: usize,
  rx: Arc<AsyncMutex<Receiver>>,
  executor: Arc<Executor<H>>,
  size: Arc<AtomicUsize>,
) {
  loop {
    // Idle workers queue on the (fair) mutex, so jobs start in arrival order.
    let job = rx.lock().await.recv().await;
    let Some(job) = job else { break };

    executor.dispatch(worker, job, &size).await;
  }
  debug!(worker, "queue worker stopped");
}

impl<H: JobHandler> Executor<H> {
  /// Run `job`, then any jobs parked behind it for the same item.
  ///
  /// A parked job returns control to the worker at once and stays counted in
  /// `size` until whichever worker holds its item runs it.
  async fn dispatch(&self, worker: usize, job: Job, size: &AtomicUsize) {
    let job = match job {
      Job::AnalyzeItem(job) => job,
      Job::Unknown => {
        warn!(worker, "unknown job kind, dropped");
        size.fetch_sub(1, Ordering::SeqCst);
        return;
      }
    };

    let mut next = match &self.item_slots {
      Some(slots) => slots.claim(job),
      None => Some(job),
    };
    if next.is_none() {
      debug!(worker, "item busy, job parked");
    }

    while let Some(job) = next {
      let item_id = job.item_id;
      self.execute(worker, job).await;
      size.fetch_sub(1, Ordering::SeqCst);
      next = self
        .item_slots
        .as_ref()
        .and_then(|slots| slots.finish(item_id));
    }
  }

  /// Run one job to completion. Failures end here.
  async fn execute(&self, worker: usize, job: AnalyzeItem) {
    let item_id = job.item_id;

    // The job runs in its own task so a panic is contained to it.
    let handler = self.handler.clone();
    let started = Instant::now();
    let task = tokio::spawn(async move { handler.analyze_item(job).await });

    match task.await {
      Ok(Ok(())) => {
        debug!(worker, %item_id, elapsed = ?started.elapsed(), "job completed");
      }
      Ok(Err(e)) => {
        error!(worker, %item_id, error = %e, "job failed, dropped");
      }
      Err(e) => {
        error!(worker, %item_id, error = %e, "job aborted, dropped");
      }
    }
  }
}
