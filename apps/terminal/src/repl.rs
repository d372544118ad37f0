//! # Terminal Loop
//!
//! Line-oriented front end. Every line is one command; the route guard picks
//! which view answers it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  read line                                                              │
//! │    ├── idle past the limit? ──► logout, back to login view              │
//! │    ├── authenticated?       ──► update_last_activity                    │
//! │    ├── parse Command                                                    │
//! │    ├── guard(session)                                                   │
//! │    │     RedirectToLogin ──► LoginView  (login, help, quit)             │
//! │    │     Allow           ──► SaleView   (everything else)               │
//! │    └── sync: start/stop monitor, mount sale view on first Allow         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, warn};

use tally_core::guard::{guard, GuardOutcome};
use tally_core::types::ItemId;
use tally_core::validation::{parse_delta, parse_item_id};

use crate::monitor::{self, MonitorExit, MonitorHandle};
use crate::state::AppState;
use crate::views::{LoginOutcome, LoginView, SaleView, StepOutcome};
use crate::workflows::auth;

pub const HELP: &str = "\
Commands:
  login [username]     sign in (prompts for the password; input is not masked)
  logout [--server]    sign out; --server also revokes the refresh token
  items [term]         list items, optionally filtered by name
  refresh              re-fetch the item list
  add <id>             add one unit to the cart
  inc <id> / dec <id>  change a cart line by one
  qty <id> <delta>     change a cart line by delta (never below 1)
  rm <id>              remove a cart line
  cart                 show the cart
  checkout             record the sale and update stock
  whoami               show the signed-in user
  help                 show this help
  quit                 exit
";

// =============================================================================
// Commands
// =============================================================================

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: Option<String> },
    Logout { remote: bool },
    Items(Option<String>),
    Refresh,
    Add(ItemId),
    Qty { item_id: ItemId, delta: i64 },
    Remove(ItemId),
    Cart,
    Checkout,
    Whoami,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut parts = line.split_whitespace();
        let name = match parts.next() {
            Some(name) => name.to_lowercase(),
            None => return Err("Type `help` for commands.".to_string()),
        };
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "login" => Command::Login {
                username: args.first().map(|s| s.to_string()),
            },
            "logout" => Command::Logout {
                remote: args.first() == Some(&"--server"),
            },
            "items" | "search" => {
                if args.is_empty() {
                    Command::Items(None)
                } else {
                    Command::Items(Some(args.join(" ")))
                }
            }
            "refresh" => Command::Refresh,
            "add" => Command::Add(item_arg(&args)?),
            "inc" => Command::Qty {
                item_id: item_arg(&args)?,
                delta: 1,
            },
            "dec" => Command::Qty {
                item_id: item_arg(&args)?,
                delta: -1,
            },
            "qty" => {
                let item_id = item_arg(&args)?;
                let raw = args.get(1).ok_or("Usage: qty <id> <delta>")?;
                let delta = parse_delta(raw).map_err(|e| e.to_string())?;
                Command::Qty { item_id, delta }
            }
            "rm" | "remove" => Command::Remove(item_arg(&args)?),
            "cart" => Command::Cart,
            "checkout" => Command::Checkout,
            "whoami" => Command::Whoami,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{}'. Type `help`.", other)),
        };

        Ok(command)
    }

    /// Commands available without a session.
    fn is_public(&self) -> bool {
        matches!(
            self,
            Command::Login { .. } | Command::Help | Command::Quit
        )
    }
}

fn item_arg(args: &[&str]) -> Result<ItemId, String> {
    let raw = args.first().ok_or("An item id is required.")?;
    parse_item_id(raw).map_err(|e| e.to_string())
}

// =============================================================================
// Terminal
// =============================================================================

/// The running front end.
pub struct Terminal {
    state: Arc<AppState>,
    login: LoginView,
    sale: SaleView,
    mounted: bool,
    monitor: Option<MonitorHandle>,
    poll_interval: Duration,
}

impl Terminal {
    pub fn new(state: Arc<AppState>, currency: impl Into<String>, poll_interval: Duration) -> Self {
        Terminal {
            state,
            login: LoginView::new(),
            sale: SaleView::new(currency),
            mounted: false,
            monitor: None,
            poll_interval,
        }
    }

    /// Reads commands until `quit` or end of input.
    pub async fn run<R, W>(&mut self, reader: R, mut out: W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        // A restored session may already be past the limit.
        self.state.logout_if_idle().await;
        self.sync(&mut out).await?;
        if guard(&self.state.session().await) == GuardOutcome::RedirectToLogin {
            write(&mut out, &self.login.render()).await?;
        }

        loop {
            write(&mut out, "> ").await?;
            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if self.state.logout_if_idle().await {
                self.sync(&mut out).await?;
                continue;
            }
            if self.state.session().await.is_authenticated {
                auth::update_last_activity(&self.state).await;
            }

            let command = match Command::parse(line) {
                Ok(command) => command,
                Err(message) => {
                    write(&mut out, &format!("{}\n", message)).await?;
                    continue;
                }
            };
            if command == Command::Quit {
                break;
            }

            self.execute(command, &mut lines, &mut out).await?;
            self.sync(&mut out).await?;
        }

        self.stop_monitor().await;
        debug!("Terminal loop finished");
        Ok(())
    }

    async fn execute<R, W>(
        &mut self,
        command: Command,
        lines: &mut Lines<R>,
        out: &mut W,
    ) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let session = self.state.session().await;
        match guard(&session) {
            GuardOutcome::Loading => {
                return write(out, "Loading...\n").await;
            }
            GuardOutcome::RedirectToLogin if !command.is_public() => {
                return write(out, "Please log in first. Type `login`.\n").await;
            }
            GuardOutcome::Allow if matches!(command, Command::Login { .. }) => {
                let who = session.user.map(|u| u.display_name()).unwrap_or_default();
                return write(out, &format!("Already logged in as {}.\n", who)).await;
            }
            _ => {}
        }

        match command {
            Command::Login { username } => {
                let username = match username {
                    Some(name) => name,
                    None => prompt(lines, out, "Username: ").await?,
                };
                let password = prompt(lines, out, "Password: ").await?;
                self.login.username = username;
                self.login.password = password;

                match self.login.submit(&self.state).await {
                    LoginOutcome::LoggedIn(user) => {
                        write(out, &format!("Welcome, {}.\n", user.display_name())).await?;
                    }
                    LoginOutcome::Invalid | LoginOutcome::Failed => {
                        write(out, &self.login.render()).await?;
                    }
                }
            }
            Command::Logout { remote } => {
                if remote {
                    if let Err(e) = auth::logout_user(&self.state).await {
                        write(out, &format!("Server logout failed: {}\n", e)).await?;
                        return Ok(());
                    }
                } else {
                    self.sale.logout(&self.state).await;
                }
            }
            Command::Items(term) => {
                self.sale.search(term.as_deref().unwrap_or_default());
                self.render_sale(out).await?;
            }
            Command::Refresh => {
                if let Err(e) = self.sale.refresh_inventory(&self.state).await {
                    warn!(error = %e, "Refresh failed");
                }
                self.render_sale(out).await?;
            }
            Command::Add(item_id) => {
                self.sale.add_to_cart(&self.state, item_id).await;
                self.render_sale(out).await?;
            }
            Command::Qty { item_id, delta } => {
                self.sale.update_quantity(&self.state, item_id, delta).await;
                self.render_sale(out).await?;
            }
            Command::Remove(item_id) => {
                self.sale.remove_item(&self.state, item_id).await;
                self.render_sale(out).await?;
            }
            Command::Cart => {
                self.render_sale(out).await?;
            }
            Command::Checkout => {
                let report = self.sale.handle_both_actions(&self.state).await;
                if let StepOutcome::Failed(err) = &report.stock {
                    debug!(error = %err, "Stock step failed");
                }
                self.render_sale(out).await?;
            }
            Command::Whoami => {
                let text = match session.user {
                    Some(user) => format!("{} (id {})\n", user.display_name(), user.user_id),
                    None => "Not logged in.\n".to_string(),
                };
                write(out, &text).await?;
            }
            Command::Help => write(out, HELP).await?,
            Command::Quit => {}
        }

        Ok(())
    }

    /// Starts or stops the monitor and mounts the sale view as the session
    /// changes.
    async fn sync<W>(&mut self, out: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let session = self.state.session().await;
        match guard(&session) {
            GuardOutcome::Loading => {}
            GuardOutcome::RedirectToLogin => {
                if self.monitor.is_some() || self.mounted {
                    if self.stop_monitor().await == Some(MonitorExit::IdleLogout) {
                        write(out, "Logged out after inactivity.\n").await?;
                    } else {
                        write(out, "Logged out.\n").await?;
                    }
                    self.mounted = false;
                    self.login = LoginView::new();
                }
            }
            GuardOutcome::Allow => {
                if self.monitor.as_ref().map_or(true, MonitorHandle::is_finished) {
                    self.monitor = Some(monitor::spawn(self.state.clone(), self.poll_interval));
                }
                if !self.mounted {
                    self.mounted = true;
                    if let Err(e) = self.sale.mount(&self.state).await {
                        warn!(error = %e, "Failed to load items");
                    }
                    self.render_sale(out).await?;
                }
            }
        }
        Ok(())
    }

    async fn stop_monitor(&mut self) -> Option<MonitorExit> {
        match self.monitor.take() {
            Some(handle) if handle.is_finished() => Some(handle.join().await),
            Some(handle) => Some(handle.shutdown().await),
            None => None,
        }
    }

    async fn render_sale<W>(&mut self, out: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut text = self.sale.render(&self.state).await;
        if let Some(alert) = self.sale.take_alert() {
            text.push_str(&format!("! {}\n", alert));
        }
        write(out, &text).await
    }
}

async fn write<W>(out: &mut W, text: &str) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

/// Writes `label` and reads one line.
///
/// Input is read as a plain line, so a terminal in echo mode shows what is
/// typed, passwords included. Nothing read here is written back to `out`.
async fn prompt<R, W>(lines: &mut Lines<R>, out: &mut W, label: &str) -> io::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write(out, label).await?;
    Ok(lines.next_line().await?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("add 7"), Ok(Command::Add(7)));
        assert_eq!(
            Command::parse("qty 7 +3"),
            Ok(Command::Qty { item_id: 7, delta: 3 })
        );
        assert_eq!(
            Command::parse("dec 2"),
            Ok(Command::Qty { item_id: 2, delta: -1 })
        );
        assert_eq!(
            Command::parse("items orange juice"),
            Ok(Command::Items(Some("orange juice".into())))
        );
        assert_eq!(
            Command::parse("logout --server"),
            Ok(Command::Logout { remote: true })
        );
        assert_eq!(Command::parse("QUIT"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse("add").is_err());
        assert!(Command::parse("add x").is_err());
        assert!(Command::parse("qty 1").is_err());
        assert!(Command::parse("dance").unwrap_err().contains("Unknown command"));
    }

    #[test]
    fn test_public_commands() {
        assert!(Command::Help.is_public());
        assert!(Command::Login { username: None }.is_public());
        assert!(!Command::Checkout.is_public());
    }
}
