pub mod cli;
pub mod collection;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod error;
pub mod filter;
pub mod page;
pub mod remote;
pub mod render;
pub mod session;
pub mod task;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tracing::instrument(skip_all)]
pub async fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli = cli::GlobalCli::parse_from(
    raw_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting tether CLI"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );

  let store =
    remote::http::HttpTaskStore::new(
      cfg.api_url()
    )
    .context(
      "failed to build HTTP task \
       store"
    )?;
  let mut renderer =
    render::Renderer::new(&cfg)?;
  let mut session =
    session::Session::new(
      store,
      cfg.owner_id()?,
      cfg.timezone()?
    );

  commands::dispatch(
    &mut session,
    &mut renderer,
    cli.command
  )
  .await?;

  info!("done");
  Ok(())
}
