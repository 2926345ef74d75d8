use std::time::{Duration, Instant};

/// A search the scheduler has released for execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
  pub generation: u64,
  pub query: String,
}

/// Cancellable one-shot timer for search-as-you-type.
///
/// Every `schedule` replaces the pending query and bumps the generation, so
/// a run started for an older generation can be recognised and dropped when
/// it completes. Time is passed in by the caller; nothing here sleeps.
#[derive(Debug, Clone)]
pub struct SearchScheduler {
  delay: Duration,
  generation: u64,
  pending: Option<(PendingSearch, Instant)>,
}

impl SearchScheduler {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      generation: 0,
      pending: None,
    }
  }

  pub fn delay(&self) -> Duration {
    self.delay
  }

  pub fn generation(&self) -> u64 {
    self.generation
  }

  pub fn schedule(&mut self, query: impl Into<String>, now: Instant) -> u64 {
    self.generation += 1;
    self.pending = Some((
      PendingSearch {
        generation: self.generation,
        query: query.into(),
      },
      now,
    ));
    self.generation
  }

  /// Skip the quiescence delay: supersede anything pending and release
  /// `query` right away.
  pub fn run_now(&mut self, query: impl Into<String>) -> PendingSearch {
    self.generation += 1;
    self.pending = None;
    PendingSearch {
      generation: self.generation,
      query: query.into(),
    }
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// When the pending query becomes due, if any.
  pub fn deadline(&self) -> Option<Instant> {
    self.pending.as_ref().map(|(_, at)| *at + self.delay)
  }

  pub fn take_due(&mut self, now: Instant) -> Option<PendingSearch> {
    let due = self.deadline()?;
    if now < due {
      return None;
    }
    self.pending.take().map(|(pending, _)| pending)
  }

  pub fn is_current(&self, generation: u64) -> bool {
    generation == self.generation
  }

  /// Drop the pending query and invalidate any run already handed out.
  pub fn cancel(&mut self) {
    self.pending = None;
    self.generation += 1;
  }
}
