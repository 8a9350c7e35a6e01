//! Per-item ordering for `serialize_per_item`.
//!
//! A job whose item already has a job running is parked instead of holding a
//! worker. The worker running that item picks parked jobs up, in arrival
//! order, once its current job finishes.

use std::{
  collections::{HashMap, VecDeque},
  sync::{Mutex, MutexGuard, PoisonError},
};

use kplan_core::AnalyzeItem;
use uuid::Uuid;

/// Items with a job in flight, each with the jobs parked behind it.
#[derive(Default)]
pub(crate) struct ItemSlots {
  busy: Mutex<HashMap<Uuid, VecDeque<AnalyzeItem>>>,
}

impl ItemSlots {
  fn busy(&self) -> MutexGuard<'_, HashMap<Uuid, VecDeque<AnalyzeItem>>> {
    self.busy.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Claim the job's item. Returns the job if the caller should run it now,
  /// or `None` if it was parked behind a running job for the same item.
  pub(crate) fn claim(&self, job: AnalyzeItem) -> Option<AnalyzeItem> {
    let mut busy = self.busy();
    match busy.get_mut(&job.item_id) {
      Some(parked) => {
        parked.push_back(job);
        None
      }
      None => {
        busy.insert(job.item_id, VecDeque::new());
        Some(job)
      }
    }
  }

  /// Called when the running job for `item_id` finishes. Hands back the next
  /// parked job for the caller to run, or frees the item.
  pub(crate) fn finish(&self, item_id: Uuid) -> Option<AnalyzeItem> {
    let mut busy = self.busy();
    let next = busy.get_mut(&item_id).and_then(VecDeque::pop_front);
    if next.is_none() {
      busy.remove(&item_id);
    }
    next
  }

  #[cfg(test)]
  pub(crate) fn tracked(&self) -> usize { self.busy().len() }
}
