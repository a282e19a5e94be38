use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use weave_collab::Clock;
use weave_model::Continuation;

use crate::store::ContinuationStore;

/// Default tick interval for the delay scheduler worker loop (§4.3).
pub const TICK_INTERVAL: StdDuration = StdDuration::from_secs(1);

/// Default max continuations fetched per tick.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Synchronous-sleep vs durable-continuation cutover (§4.3). Kept local to
/// the scheduler rather than depending on `weave-nodes` so the crate stays
/// usable without pulling in every node executor.
pub const DEFAULT_SYNC_THRESHOLD: StdDuration = StdDuration::from_secs(30);

pub fn should_use_async(delay: StdDuration, sync_threshold: StdDuration) -> bool {
  delay > sync_threshold
}

/// The engine-side entry point a resumed continuation is handed to. Kept as
/// a trait here (rather than depending on `weave-engine`) to avoid a
/// scheduler -> engine -> scheduler dependency cycle.
#[async_trait]
pub trait ResumeHandler: Send + Sync {
  async fn resume(&self, continuation: Continuation);
}

/// Polls the due index on a fixed tick, claims due entries, and hands each
/// to the `ResumeHandler` on its own task. A claimed entry whose resume
/// fails is left un-deleted — the next process restart (or an operator
/// replay) can still load it by id, trading at-most-once-after-claim
/// delivery for never silently losing a paused workflow (§4.3, §7).
pub struct DelayScheduler<S: ContinuationStore> {
  store: Arc<S>,
  handler: Arc<dyn ResumeHandler>,
  clock: Arc<dyn Clock>,
  batch_size: usize,
  tick_interval: StdDuration,
}

impl<S: ContinuationStore + 'static> DelayScheduler<S> {
  pub fn new(store: Arc<S>, handler: Arc<dyn ResumeHandler>, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      handler,
      clock,
      batch_size: DEFAULT_BATCH_SIZE,
      tick_interval: TICK_INTERVAL,
    }
  }

  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size;
    self
  }

  pub fn with_tick_interval(mut self, interval: StdDuration) -> Self {
    self.tick_interval = interval;
    self
  }

  /// Runs until `cancel` is signalled. One tick processes at most
  /// `batch_size` due entries; each claimed entry is resumed on its own
  /// spawned task so a slow resume never delays the next tick.
  pub async fn run(&self, cancel: CancellationToken) {
    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          tracing::info!("delay scheduler shutting down");
          return;
        }
        _ = tokio::time::sleep(self.tick_interval) => {
          self.tick().await;
        }
      }
    }
  }

  async fn tick(&self) {
    let due = match self.store.fetch_due(self.clock.now(), self.batch_size).await {
      Ok(ids) => ids,
      Err(e) => {
        tracing::error!(error = %e, "failed to fetch due continuations");
        return;
      }
    };

    for id in due {
      let claimed = match self.store.claim(&id).await {
        Ok(claimed) => claimed,
        Err(e) => {
          tracing::error!(error = %e, continuation_id = %id, "failed to claim continuation");
          continue;
        }
      };
      if !claimed {
        continue;
      }

      let continuation = match self.store.load(&id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
          tracing::warn!(continuation_id = %id, "claimed continuation has no blob");
          continue;
        }
        Err(e) => {
          tracing::error!(error = %e, continuation_id = %id, "failed to load claimed continuation");
          continue;
        }
      };

      let handler = self.handler.clone();
      let store = self.store.clone();
      let id_for_log = id.clone();
      tokio::spawn(async move {
        handler.resume(continuation).await;
        if let Err(e) = store.delete(&id_for_log).await {
          tracing::error!(error = %e, continuation_id = %id_for_log, "failed to delete resumed continuation");
        }
      });
    }
  }
}
