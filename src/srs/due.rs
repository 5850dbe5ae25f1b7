//! Due-card selection.
//!
//! Picks the cards whose review time has passed and orders them so the most
//! overdue come first:
//! - earlier `next_review` first
//! - then fewer consecutive successes (less mastered)
//! - then lower card id, so the order is fully deterministic

use chrono::{DateTime, Utc};

use crate::domain::{FlashcardId, FlashcardSchedule};

/// Ordered, finite sequence of due card ids.
///
/// Clone it before iterating to walk the same selection again.
#[derive(Debug, Clone)]
pub struct DueQueue {
  ids: std::vec::IntoIter<FlashcardId>,
}

impl Iterator for DueQueue {
  type Item = FlashcardId;

  fn next(&mut self) -> Option<Self::Item> {
    self.ids.next()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.ids.size_hint()
  }
}

impl ExactSizeIterator for DueQueue {}

/// Select the cards due at `now`, most overdue first, truncated to `limit`.
pub fn select_due(
  cards: &[(FlashcardId, FlashcardSchedule)],
  now: DateTime<Utc>,
  limit: Option<usize>,
) -> DueQueue {
  let mut due: Vec<(DateTime<Utc>, i64, FlashcardId)> = cards
    .iter()
    .filter(|(_, schedule)| schedule.is_due(now))
    .map(|(id, schedule)| (schedule.next_review, schedule.repetitions, *id))
    .collect();

  due.sort_unstable();

  if let Some(limit) = limit {
    due.truncate(limit);
  }

  DueQueue {
    ids: due
      .into_iter()
      .map(|(_, _, id)| id)
      .collect::<Vec<_>>()
      .into_iter(),
  }
}
