use chrono::NaiveDate;
use tracing::trace;

use crate::task::Task;

#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub enum FilterCriteria {
  #[default]
  None,
  Text(String),
  DateRange {
    from: Option<NaiveDate>,
    to:   Option<NaiveDate>
  }
}

impl FilterCriteria {
  pub fn text(query: &str) -> Self {
    let trimmed = query.trim();
    if trimmed.is_empty() {
      Self::None
    } else {
      Self::Text(trimmed.to_string())
    }
  }

  pub fn date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>
  ) -> Self {
    if from.is_none() && to.is_none() {
      Self::None
    } else {
      Self::DateRange {
        from,
        to
      }
    }
  }

  pub fn is_none(&self) -> bool {
    matches!(self, Self::None)
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    match self {
      | Self::None => true,
      | Self::Text(query) => task
        .text
        .to_lowercase()
        .contains(
          &query.to_lowercase()
        ),
      | Self::DateRange {
        from,
        to
      } => {
        let Some(date) =
          task.created_date()
        else {
          return false;
        };
        if from
          .is_some_and(|f| date < f)
        {
          return false;
        }
        if to.is_some_and(|t| date > t)
        {
          return false;
        }
        true
      }
    }
  }

  pub fn apply<'a>(
    &self,
    tasks: &'a [Task]
  ) -> Vec<&'a Task> {
    let out: Vec<&Task> = tasks
      .iter()
      .filter(|t| self.matches(t))
      .collect();
    trace!(
      total = tasks.len(),
      matched = out.len(),
      "applied filter"
    );
    out
  }
}
