pub mod card;
pub mod profile;
pub mod review;
pub mod schedule;
pub mod subject;

pub use card::{Difficulty, Flashcard, FlashcardId, UnknownDifficulty};
pub use profile::{DailyEntry, Preferences};
pub use review::{Quality, QualityOutOfRange, ReviewLog};
pub use schedule::{
  FlashcardSchedule, ScheduleViolation, DEFAULT_EASINESS_FACTOR, MAX_INTERVAL_DAYS,
  MIN_EASINESS_FACTOR,
};
pub use subject::{Subject, Topic};
