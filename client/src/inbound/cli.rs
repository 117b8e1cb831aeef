//! Command-line driving adapter for the session core.
//!
//! Each invocation owns one [`SessionManager`]: it restores the persisted
//! session, runs a single command against it, and writes a short
//! human-readable report. Page access goes through the same [`RouteGate`]
//! every screen uses.

use std::io::{self, Write};

use clap::{Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::{SessionStore, TokenAuthority};
use crate::domain::{
    CredentialsValidationError, GateAction, LOGIN_ROUTE, LoginCredentials, PAGES, Profile,
    RestoreOutcome, RouteGate, SessionError, SessionManager, find_page,
};

/// `remiseria` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "remiseria",
    about = "Session and route-access client for the remisería administration API",
    version
)]
pub struct Cli {
    /// Use the built-in fixture authority instead of the HTTP API.
    #[arg(long, global = true)]
    pub offline: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the client.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Exchange credentials for a session and persist it.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password; read from `REMISERIA_PASSWORD` when the flag is
        /// omitted so the secret stays out of the process arguments.
        #[arg(long, env = "REMISERIA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the current session.
    Logout,
    /// Show the current identity.
    Whoami,
    /// Check whether the current identity may open a page.
    Open {
        /// Route path, for example `/duenio/vehiculos`.
        route: String,
    },
    /// Merge fields into the current identity's profile.
    UpdateProfile {
        /// Field as `key=value`; values that parse as JSON are stored as JSON.
        #[arg(
            long = "set",
            value_name = "key=value",
            value_parser = parse_profile_field,
            required = true
        )]
        fields: Vec<(String, Value)>,
    },
    /// List protected pages and whether the current identity may open them.
    Pages,
}

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Session operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Login input was incomplete.
    #[error(transparent)]
    Credentials(#[from] CredentialsValidationError),
    /// No page is registered at the requested route.
    #[error("no page registered at `{route}`")]
    UnknownRoute { route: String },
    /// Report could not be written.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Restore the session and run `command`, reporting to `out`.
///
/// # Errors
///
/// Returns [`CliError`] when the command fails; restore failures are never
/// errors and only change what the command sees.
pub async fn run<S, A>(
    manager: &SessionManager<S, A>,
    command: Command,
    out: &mut impl Write,
) -> Result<(), CliError>
where
    S: SessionStore + ?Sized,
    A: TokenAuthority + ?Sized,
{
    if let RestoreOutcome::Discarded(reason) = manager.initialize().await {
        writeln!(out, "stored session discarded: {reason}")?;
    }

    match command {
        Command::Login { email, password } => {
            let credentials = LoginCredentials::try_from_parts(&email, &password)?;
            let identity = manager.authenticate(&credentials).await?;
            writeln!(
                out,
                "logged in as {} ({}); home: {}",
                identity.email(),
                identity.role(),
                identity.role().home_route()
            )?;
        }
        Command::Logout => {
            manager.logout()?;
            writeln!(out, "logged out")?;
        }
        Command::Whoami => match manager.current_identity() {
            Some(identity) => writeln!(
                out,
                "{} ({}) id={}",
                identity.email(),
                identity.role(),
                identity.id()
            )?,
            None => writeln!(out, "not logged in")?,
        },
        Command::Open { route } => {
            let page = find_page(&route).ok_or(CliError::UnknownRoute { route })?;
            let mut gate = RouteGate::new(page.required, manager.subscribe());
            let action = gate
                .settled()
                .await
                .unwrap_or(GateAction::Redirect { to: LOGIN_ROUTE });
            debug!(path = page.path, ?action, "route gate settled");
            match action {
                GateAction::Render => writeln!(out, "render {} ({})", page.path, page.title)?,
                GateAction::Redirect { to } => writeln!(out, "redirect {to}")?,
                GateAction::Wait | GateAction::Hold => writeln!(out, "blank")?,
            }
        }
        Command::UpdateProfile { fields } => {
            let fields: Profile = fields.into_iter().collect();
            let identity = manager.update_profile(fields)?;
            let profile = identity
                .profile()
                .map(|profile| Value::Object(profile.clone()))
                .unwrap_or(Value::Null);
            writeln!(out, "profile updated: {profile}")?;
        }
        Command::Pages => {
            let role = manager.current_identity().map(|identity| identity.role());
            for page in PAGES {
                let marker = match role {
                    Some(role) if page.required.contains(&role) => '*',
                    _ => ' ',
                };
                writeln!(out, "{marker} {:<24} {}", page.path, page.title)?;
            }
        }
    }
    Ok(())
}

fn parse_profile_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("profile field name must not be empty".to_owned());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}
