//! Request payload validation.
//!
//! Each `*Input` is the raw JSON body; `validate()` trims and checks it and
//! produces the matching `New*` value that the storage layer accepts.

use serde::Deserialize;

use chrono::NaiveTime;

use crate::domain::{Difficulty, Preferences};

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2_000;
pub const MAX_TOPIC_CONTENT_LEN: usize = 100_000;
pub const MAX_CARD_TEXT_LEN: usize = 2_000;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_DISPLAY_NAME_LEN: usize = 100;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_DAILY_TOPIC_LEN: usize = 500;

/// Minutes in a day
pub const MAX_STUDY_GOAL: i64 = 1_440;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
  pub field: &'static str,
  pub message: String,
}

impl ValidationError {
  fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self {
      field,
      message: message.into(),
    }
  }
}

/// Trimmed, non-empty, at most `max` characters
fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(ValidationError::new(field, "must not be empty"));
  }
  bounded_text(field, trimmed, max)
}

fn bounded_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
  if value.chars().count() > max {
    return Err(ValidationError::new(
      field,
      format!("must be at most {} characters", max),
    ));
  }
  Ok(value.to_string())
}

fn difficulty(value: Option<&str>) -> Result<Difficulty, ValidationError> {
  match value {
    None => Ok(Difficulty::default()),
    Some(s) => Difficulty::from_str(s.trim())
      .ok_or_else(|| ValidationError::new("difficulty", "must be Easy, Medium or Hard")),
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSubject {
  pub name: String,
  pub description: Option<String>,
  pub difficulty: Difficulty,
}

impl SubjectInput {
  pub fn validate(&self) -> Result<NewSubject, ValidationError> {
    let name = required_text("name", &self.name, MAX_NAME_LEN)?;
    let description = match self.description.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(d) => Some(bounded_text("description", d, MAX_DESCRIPTION_LEN)?),
    };
    Ok(NewSubject {
      name,
      description,
      difficulty: difficulty(self.difficulty.as_deref())?,
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicInput {
  pub title: String,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTopic {
  pub title: String,
  pub content: String,
  pub difficulty: Difficulty,
}

impl TopicInput {
  pub fn validate(&self) -> Result<NewTopic, ValidationError> {
    Ok(NewTopic {
      title: required_text("title", &self.title, MAX_NAME_LEN)?,
      content: bounded_text("content", &self.content, MAX_TOPIC_CONTENT_LEN)?,
      difficulty: difficulty(self.difficulty.as_deref())?,
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardInput {
  pub subject_id: i64,
  pub question: String,
  pub answer: String,
  #[serde(default)]
  pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFlashcard {
  pub subject_id: i64,
  pub question: String,
  pub answer: String,
  pub difficulty: Difficulty,
}

impl FlashcardInput {
  pub fn validate(&self) -> Result<NewFlashcard, ValidationError> {
    Ok(NewFlashcard {
      subject_id: self.subject_id,
      question: required_text("question", &self.question, MAX_CARD_TEXT_LEN)?,
      answer: required_text("answer", &self.answer, MAX_CARD_TEXT_LEN)?,
      difficulty: difficulty(self.difficulty.as_deref())?,
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationInput {
  pub email: String,
  pub name: String,
  pub password: String,
}

/// Validated sign-up data; the password is still plain text here
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
  pub email: String,
  pub name: String,
  pub password: String,
}

impl RegistrationInput {
  pub fn validate(&self) -> Result<Registration, ValidationError> {
    Ok(Registration {
      email: normalize_email(&self.email)?,
      name: required_text("name", &self.name, MAX_DISPLAY_NAME_LEN)?,
      password: validate_password(&self.password)?,
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesInput {
  pub reminder_time: String,
  pub study_goal: i64,
}

impl PreferencesInput {
  /// Full replacement; the reminder time is normalized to zero-padded `HH:MM`
  pub fn validate(&self) -> Result<Preferences, ValidationError> {
    let reminder_time = NaiveTime::parse_from_str(self.reminder_time.trim(), "%H:%M")
      .map_err(|_| ValidationError::new("reminderTime", "must be a time like 09:00"))?;
    if !(1..=MAX_STUDY_GOAL).contains(&self.study_goal) {
      return Err(ValidationError::new(
        "studyGoal",
        format!("must be between 1 and {} minutes", MAX_STUDY_GOAL),
      ));
    }
    Ok(Preferences {
      reminder_time: reminder_time.format("%H:%M").to_string(),
      study_goal: self.study_goal,
    })
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyEntryInput {
  pub topic: String,
}

impl DailyEntryInput {
  /// The trimmed topic text
  pub fn validate(&self) -> Result<String, ValidationError> {
    required_text("topic", &self.topic, MAX_DAILY_TOPIC_LEN)
  }
}

/// Lowercased address with exactly one `@` and non-empty local and domain parts
pub fn normalize_email(raw: &str) -> Result<String, ValidationError> {
  let email = raw.trim().to_lowercase();
  if email.is_empty() {
    return Err(ValidationError::new("email", "must not be empty"));
  }
  if email.len() > MAX_EMAIL_LEN {
    return Err(ValidationError::new(
      "email",
      format!("must be at most {} characters", MAX_EMAIL_LEN),
    ));
  }
  let mut parts = email.split('@');
  let valid = matches!(
    (parts.next(), parts.next(), parts.next()),
    (Some(local), Some(domain), None)
      if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
  );
  if !valid {
    return Err(ValidationError::new("email", "is not a valid address"));
  }
  Ok(email)
}

fn validate_password(password: &str) -> Result<String, ValidationError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ValidationError::new(
      "password",
      format!("must be at least {} characters", MIN_PASSWORD_LEN),
    ));
  }
  Ok(password.to_string())
}
