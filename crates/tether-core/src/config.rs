use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use tracing::{
  debug,
  info,
  warn
};

const CONFIG_ENV_VAR: &str =
  "TETHER_CONFIG";
const CONFIG_FILE: &str =
  "config.toml";

const DEFAULT_API_URL: &str =
  "https://dummyjson.com";
const DEFAULT_OWNER_ID: &str = "5";
const DEFAULT_TIMEZONE: &str =
  "Asia/Kolkata";

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.map.insert(
      "api.url".to_string(),
      DEFAULT_API_URL.to_string()
    );
    cfg.map.insert(
      "api.owner".to_string(),
      DEFAULT_OWNER_ID.to_string()
    );
    cfg.map.insert(
      "time.zone".to_string(),
      DEFAULT_TIMEZONE.to_string()
    );
    cfg.map.insert(
      "color".to_string(),
      "on".to_string()
    );

    if let Some(path) =
      resolve_config_path(
        config_override
      )
    {
      info!(config = %path.display(), "loading config file");
      cfg.load_file(&path)?;
    } else {
      warn!(
        "no config file found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(self))]
  fn load_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let raw = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed reading {}",
          path.display()
        )
      })?;
    let table: toml::Table =
      raw.parse().with_context(|| {
        format!(
          "failed parsing {}",
          path.display()
        )
      })?;

    flatten_into(
      &mut self.map,
      "",
      &table
    );
    self
      .loaded_files
      .push(path.to_path_buf());
    Ok(())
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (key, value) in overrides {
      debug!(key = %key, value = %value, "applying override");
      self.map.insert(key, value);
    }
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self.map.get(key).cloned()
  }

  pub fn api_url(&self) -> String {
    self.get("api.url").unwrap_or_else(
      || DEFAULT_API_URL.to_string()
    )
  }

  pub fn owner_id(
    &self
  ) -> anyhow::Result<u64> {
    let raw = self
      .get("api.owner")
      .unwrap_or_else(|| {
        DEFAULT_OWNER_ID.to_string()
      });
    raw.parse().map_err(|_| {
      anyhow!(
        "invalid api.owner setting: \
         {raw}"
      )
    })
  }

  pub fn timezone(
    &self
  ) -> anyhow::Result<Tz> {
    let raw = self
      .get("time.zone")
      .unwrap_or_else(|| {
        DEFAULT_TIMEZONE.to_string()
      });
    raw.parse().map_err(|_| {
      anyhow!(
        "invalid time.zone setting: \
         {raw}"
      )
    })
  }
}

fn flatten_into(
  map: &mut HashMap<String, String>,
  prefix: &str,
  table: &toml::Table
) {
  for (key, value) in table {
    let full_key = if prefix.is_empty()
    {
      key.clone()
    } else {
      format!("{prefix}.{key}")
    };

    match value {
      | toml::Value::Table(nested) => {
        flatten_into(
          map, &full_key, nested
        );
      }
      | toml::Value::String(s) => {
        map.insert(
          full_key,
          s.clone()
        );
      }
      | other => {
        map.insert(
          full_key,
          other.to_string()
        );
      }
    }
  }
}

fn resolve_config_path(
  config_override: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = config_override {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV_VAR)
  {
    if !env_path.trim().is_empty() {
      return Some(PathBuf::from(
        env_path
      ));
    }
  }

  let candidate = dirs::config_dir()?
    .join("tether")
    .join(CONFIG_FILE);
  if candidate.exists() {
    Some(candidate)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tempfile::NamedTempFile;

  use super::Config;

  #[test]
  fn defaults_without_a_file() {
    let file = NamedTempFile::new()
      .expect("tempfile");
    let cfg =
      Config::load(Some(file.path()))
        .expect("defaults load");

    assert_eq!(
      cfg.api_url(),
      "https://dummyjson.com"
    );
    assert_eq!(
      cfg.owner_id().expect("owner"),
      5
    );
    assert_eq!(
      cfg
        .timezone()
        .expect("timezone")
        .name(),
      "Asia/Kolkata"
    );
  }

  #[test]
  fn file_values_flatten_to_dotted_keys()
   {
    let mut file = NamedTempFile::new()
      .expect("tempfile");
    writeln!(
      file,
      "color = \"off\"\n\n[api]\nurl \
       = \"http://localhost:9000\"\n\
       owner = 42\n"
    )
    .expect("write config");

    let cfg =
      Config::load(Some(file.path()))
        .expect("load config");
    assert_eq!(
      cfg.api_url(),
      "http://localhost:9000"
    );
    assert_eq!(
      cfg.owner_id().expect("owner"),
      42
    );
    assert_eq!(
      cfg.get("color").as_deref(),
      Some("off")
    );
    assert_eq!(
      cfg.loaded_files,
      vec![file.path().to_path_buf()]
    );
  }

  #[test]
  fn overrides_win_over_file_and_defaults()
   {
    let mut file = NamedTempFile::new()
      .expect("tempfile");
    writeln!(
      file,
      "[api]\nurl = \
       \"http://localhost:9000\"\n"
    )
    .expect("write config");

    let mut cfg =
      Config::load(Some(file.path()))
        .expect("load config");
    cfg.apply_overrides(vec![
      (
        "api.url".to_string(),
        "http://localhost:1234"
          .to_string()
      ),
      (
        "time.zone".to_string(),
        "Europe/Stockholm".to_string()
      ),
    ]);

    assert_eq!(
      cfg.api_url(),
      "http://localhost:1234"
    );
    assert_eq!(
      cfg
        .timezone()
        .expect("timezone")
        .name(),
      "Europe/Stockholm"
    );
  }

  #[test]
  fn bad_settings_surface_as_errors() {
    let file = NamedTempFile::new()
      .expect("tempfile");
    let mut cfg =
      Config::load(Some(file.path()))
        .expect("defaults load");
    cfg.apply_overrides(vec![
      (
        "api.owner".to_string(),
        "not-a-number".to_string()
      ),
      (
        "time.zone".to_string(),
        "Atlantis/Nowhere".to_string()
      ),
    ]);

    assert!(cfg.owner_id().is_err());
    assert!(cfg.timezone().is_err());
  }
}
