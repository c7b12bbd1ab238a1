use std::{process::Stdio, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use gamehub_core::{
    config::PlayerConfig,
    player::{EmbeddedPlayer, LoadOutcome, LoadRequest, LoadTicket},
};
use reqwest::{Client, Url};
use tokio::{process::Command, spawn, sync::mpsc, task::JoinHandle, time::sleep};
use tracing::{debug, error, info};

/// Completion of one load attempt, delivered back to the app loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerEvent {
    pub ticket: LoadTicket,
    pub outcome: LoadOutcome,
}

/// Program used to show a game outside the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opener {
    program: String,
    args: Vec<String>,
}

impl Opener {
    /// Use `custom` (a command line, split on whitespace) or the platform
    /// opener.
    pub fn from_config(custom: Option<&str>) -> Self {
        let mut parts = custom.unwrap_or_default().split_whitespace();
        if let Some(program) = parts.next() {
            return Self {
                program: program.to_string(),
                args: parts.map(str::to_string).collect(),
            };
        }
        if cfg!(target_os = "macos") {
            Self::program("open", &[])
        } else if cfg!(target_os = "windows") {
            Self::program("cmd", &["/C", "start", ""])
        } else {
            Self::program("xdg-open", &[])
        }
    }

    fn program(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    async fn open(&self, url: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .with_context(|| format!("failed to launch {}", self.program))?;
        if !status.success() {
            bail!("{} exited with {status}", self.program);
        }
        Ok(())
    }
}

/// Player that confirms a game address responds and then hands it to the
/// system browser. One load runs at a time; clearing aborts it.
pub struct BrowserPlayer {
    client: Client,
    opener: Opener,
    events: mpsc::Sender<PlayerEvent>,
    task: Option<JoinHandle<()>>,
}

impl BrowserPlayer {
    pub fn new(config: &PlayerConfig, events: mpsc::Sender<PlayerEvent>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.probe_timeout())
            .build()
            .context("failed to build HTTP client for the player")?;
        Ok(Self {
            client,
            opener: Opener::from_config(config.open_command.as_deref()),
            events,
            task: None,
        })
    }
}

impl EmbeddedPlayer for BrowserPlayer {
    fn load(&mut self, request: LoadRequest) {
        self.clear();
        let client = self.client.clone();
        let opener = self.opener.clone();
        let events = self.events.clone();
        debug!(
            ticket = %request.ticket,
            sandbox = %request.sandbox.attribute(),
            "Scheduling game load"
        );
        self.task = Some(spawn(async move {
            let outcome = run_load(&client, &opener, &request.url, request.delay).await;
            let event = PlayerEvent {
                ticket: request.ticket,
                outcome,
            };
            if events.send(event).await.is_err() {
                debug!(ticket = %request.ticket, "Player events closed before completion");
            }
        }));
    }

    fn clear(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn open_external(&mut self, url: &str) {
        let opener = self.opener.clone();
        let url = url.to_string();
        spawn(async move {
            if let Err(err) = opener.open(&url).await {
                error!(%url, "Failed to open game externally: {err:#}");
            }
        });
    }
}

async fn run_load(client: &Client, opener: &Opener, url: &str, delay: Duration) -> LoadOutcome {
    sleep(delay).await;
    let result = async {
        probe(client, url).await?;
        opener.open(url).await
    }
    .await;
    match result {
        Ok(()) => {
            info!(%url, "Game handed to the browser");
            LoadOutcome::Succeeded
        }
        Err(err) => LoadOutcome::Failed(format!("{err:#}")),
    }
}

/// Check that `url` points at something loadable.
async fn probe(client: &Client, url: &str) -> Result<()> {
    let parsed = Url::parse(url).with_context(|| format!("invalid game address {url}"))?;
    match parsed.scheme() {
        "file" => {
            let path = parsed
                .to_file_path()
                .map_err(|_| anyhow!("invalid file address {url}"))?;
            tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("{} is not readable", path.display()))?;
        }
        "http" | "https" => {
            let response = client
                .get(parsed)
                .send()
                .await
                .context("game server did not respond")?;
            if !response.status().is_success() {
                bail!("game server answered HTTP {}", response.status());
            }
        }
        other => bail!("unsupported address scheme {other}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamehub_core::player::SandboxPolicy;
    use tempfile::tempdir;

    #[test]
    fn custom_opener_splits_arguments() {
        let opener = Opener::from_config(Some("firefox --new-window"));
        assert_eq!(opener.program, "firefox");
        assert_eq!(opener.args, vec!["--new-window".to_string()]);

        let blank = Opener::from_config(Some("   "));
        assert_eq!(blank, Opener::from_config(None));
    }

    #[tokio::test]
    async fn probe_checks_local_files() -> Result<()> {
        let dir = tempdir()?;
        let page = dir.path().join("index.html");
        std::fs::write(&page, "<html></html>")?;
        let client = Client::new();

        let present = Url::from_file_path(&page).map_err(|_| anyhow!("file url"))?;
        probe(&client, present.as_str()).await?;

        let absent = Url::from_file_path(dir.path().join("missing.html"))
            .map_err(|_| anyhow!("file url"))?;
        assert!(probe(&client, absent.as_str()).await.is_err());
        assert!(probe(&client, "./index.html").await.is_err());
        assert!(probe(&client, "ftp://example.com/game").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn failed_probe_reports_failure_with_ticket() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(1);
        let mut player = BrowserPlayer::new(&PlayerConfig::default(), tx)?;
        player.load(LoadRequest {
            ticket: LoadTicket(7),
            url: "./not-resolved.html".into(),
            sandbox: SandboxPolicy::RESTRICTED,
            delay: Duration::from_millis(1),
        });
        let event = rx.recv().await.ok_or_else(|| anyhow!("no event"))?;
        assert_eq!(event.ticket, LoadTicket(7));
        assert!(matches!(event.outcome, LoadOutcome::Failed(_)));
        Ok(())
    }

    #[tokio::test]
    async fn clear_cancels_pending_load() -> Result<()> {
        let (tx, mut rx) = mpsc::channel(1);
        let mut player = BrowserPlayer::new(&PlayerConfig::default(), tx)?;
        player.load(LoadRequest {
            ticket: LoadTicket(1),
            url: "./never.html".into(),
            sandbox: SandboxPolicy::RESTRICTED,
            delay: Duration::from_secs(60),
        });
        player.clear();
        drop(player);
        assert!(rx.recv().await.is_none());
        Ok(())
    }
}
