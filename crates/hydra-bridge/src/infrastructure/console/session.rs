//! Executes parsed console commands against the dongle link.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::{ConsoleCommand, CONSOLE_HELP};
use crate::application::forward_input::{ForwardError, ForwardInputUseCase};
use crate::application::manage_peers::{NamedPeer, PeerDirectory, PeerError};
use crate::application::type_text::{type_text, TypingDelays};
use crate::infrastructure::serial::{DongleLink, LinkError};
use crate::infrastructure::storage::config::{save_to, AppConfig};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Peer(#[from] PeerError),
    #[error(transparent)]
    Forward(#[from] ForwardError),
}

/// What the console should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this text (may be empty).
    Text(String),
    Quit,
}

pub struct ConsoleSession<S> {
    link: Arc<DongleLink<S>>,
    directory: PeerDirectory,
    forward: Arc<Mutex<ForwardInputUseCase>>,
    delays: TypingDelays,
    config: AppConfig,
    /// Where nickname changes are saved; `None` keeps them in memory only.
    config_path: Option<PathBuf>,
}

impl<S> ConsoleSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(
        link: Arc<DongleLink<S>>,
        forward: Arc<Mutex<ForwardInputUseCase>>,
        config: AppConfig,
        config_path: Option<PathBuf>,
    ) -> Self {
        let directory = PeerDirectory::new(link.clone(), config.peer_name_map());
        Self {
            link,
            directory,
            forward,
            delays: config.bridge.typing_delays(),
            config,
            config_path,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs one command.
    ///
    /// # Errors
    ///
    /// Returns the first link, peer, or forwarding error; the session stays
    /// usable afterwards.
    pub async fn execute(&mut self, command: ConsoleCommand) -> Result<Reply, SessionError> {
        let text = match command {
            ConsoleCommand::List => format_peers(&self.directory.list().await?),
            ConsoleCommand::Select(address) => {
                let peer = self.directory.select(address).await?;
                format!("active: {}\n", peer.display_name())
            }
            ConsoleCommand::Rename { address, name } => {
                self.directory.rename(address, &name);
                self.persist_names();
                if name.is_empty() {
                    format!("nickname for {address} removed\n")
                } else {
                    format!("{address} is now {name:?}\n")
                }
            }
            ConsoleCommand::Advertise(enabled) => self.link.set_advertising(enabled).await?,
            ConsoleCommand::Stats => self.link.dashboard_show().await?.format(),
            ConsoleCommand::ResetStats => self.link.dashboard_reset().await?.format(),
            ConsoleCommand::Verbose => self.link.toggle_verbose().await?,
            ConsoleCommand::Type(text) => {
                let summary = type_text(self.link.as_ref(), &text, self.delays).await?;
                if summary.skipped > 0 {
                    format!(
                        "typed {} characters, skipped {}\n",
                        summary.typed, summary.skipped
                    )
                } else {
                    format!("typed {} characters\n", summary.typed)
                }
            }
            ConsoleCommand::Flush => {
                self.forward.lock().await.leave().await?;
                "released all keys and buttons\n".to_string()
            }
            ConsoleCommand::Capture => {
                let mut forward = self.forward.lock().await;
                forward.toggle().await?;
                if forward.is_capturing() {
                    "capture on\n".to_string()
                } else {
                    "capture off\n".to_string()
                }
            }
            ConsoleCommand::Restart => {
                self.link.restart().await?;
                "dongle restarting\n".to_string()
            }
            ConsoleCommand::Unpair => {
                self.link.unpair().await?;
                "bonds removed, dongle restarting\n".to_string()
            }
            ConsoleCommand::Help => CONSOLE_HELP.to_string(),
            ConsoleCommand::DongleHelp => self.link.help().await?,
            ConsoleCommand::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    fn persist_names(&mut self) {
        self.config.set_peer_names(self.directory.names());
        let Some(path) = &self.config_path else {
            return;
        };
        match save_to(&self.config, path) {
            Ok(()) => info!(path = %path.display(), "peer names saved"),
            Err(e) => warn!(error = %e, "could not save peer names"),
        }
    }
}

fn format_peers(peers: &[NamedPeer]) -> String {
    if peers.is_empty() {
        return "no centrals connected\n".to_string();
    }
    let mut out = String::new();
    for peer in peers {
        let marker = if peer.row.is_active { '*' } else { ' ' };
        let _ = write!(
            out,
            "{marker} {}  {}  {:<6}  handle {}",
            peer.row.index, peer.row.address, peer.row.address_kind, peer.row.handle.0
        );
        if let Some(name) = &peer.name {
            let _ = write!(out, "  {name}");
        }
        out.push('\n');
    }
    out
}
