use chrono::{
  DateTime,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;

pub const STAMP_FORMAT: &str =
  "%Y-%m-%d %H:%M:%S";

pub fn stamp_local(
  now: DateTime<Utc>,
  tz: Tz
) -> String {
  now
    .with_timezone(&tz)
    .format(STAMP_FORMAT)
    .to_string()
}

pub fn date_component(
  raw: &str
) -> Option<NaiveDate> {
  let token =
    raw.split_whitespace().next()?;
  NaiveDate::parse_from_str(
    token, "%Y-%m-%d"
  )
  .ok()
}
