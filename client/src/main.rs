//! `remiseria` entry-point: wires settings, adapters and the session manager.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

use remiseria_client::config::ClientSettings;
use remiseria_client::domain::SessionManager;
use remiseria_client::domain::ports::{FixtureTokenAuthority, SessionStore, TokenAuthority};
use remiseria_client::inbound::cli::{self, Cli};
use remiseria_client::outbound::authority::HttpTokenAuthority;
use remiseria_client::outbound::store::{FileSessionStore, InMemorySessionStore};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Cli::parse();
    let settings = ClientSettings::load_from_iter([OsString::from("remiseria")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;

    let store = build_store(&settings)?;
    let authority = build_authority(&settings, args.offline)?;
    let manager = SessionManager::new(store, authority);

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    let mut stdout = io::stdout().lock();
    runtime.block_on(cli::run(&manager, args.command, &mut stdout))?;
    Ok(())
}

fn build_store(settings: &ClientSettings) -> Result<Arc<dyn SessionStore>> {
    if settings.ephemeral {
        debug!("using in-memory session store");
        return Ok(Arc::new(InMemorySessionStore::new()));
    }
    let dir = settings.store_dir();
    let store = FileSessionStore::open(&dir)
        .wrap_err_with(|| format!("open session store at {}", dir.display()))?;
    Ok(Arc::new(store))
}

fn build_authority(settings: &ClientSettings, offline: bool) -> Result<Arc<dyn TokenAuthority>> {
    if offline {
        debug!("using fixture authority");
        return Ok(Arc::new(FixtureTokenAuthority));
    }
    let base = settings.api_base_url()?;
    debug!(%base, "using HTTP authority");
    let authority = HttpTokenAuthority::new(base, settings.request_timeout())
        .wrap_err("build HTTP authority")?;
    Ok(Arc::new(authority))
}
