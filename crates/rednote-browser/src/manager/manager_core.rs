//! Chrome discovery, launch and the shared CDP connection.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::CdpClient;

const DEVTOOLS_WAIT: Duration = Duration::from_secs(6);
const DEVTOOLS_POLL: Duration = Duration::from_millis(200);

#[cfg(target_os = "macos")]
const INSTALL_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

#[cfg(target_os = "windows")]
const INSTALL_PATHS: &[&str] = &[
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const INSTALL_PATHS: &[&str] = &["/opt/google/chrome/chrome", "/snap/bin/chromium"];

/// Executable names looked up on `PATH`.
const PATH_NAMES: &[&str] = &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"];

/// Owns the CDP connection and, when it started Chrome itself, the process.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    pub(super) client: RwLock<Option<Arc<CdpClient>>>,
    chrome: Mutex<Option<Child>>,
}

impl BrowserManager {
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            chrome: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// First Chrome found in the usual install locations or on `PATH`.
    pub fn find_chrome() -> Option<PathBuf> {
        let installed = INSTALL_PATHS.iter().map(PathBuf::from);
        let on_path = std::env::var_os("PATH")
            .map(|paths| {
                std::env::split_paths(&paths)
                    .flat_map(|dir| PATH_NAMES.iter().map(move |name| dir.join(name)))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        installed.chain(on_path).find(|p| p.is_file())
    }

    fn chrome_binary(&self) -> Result<PathBuf, BrowserError> {
        match &self.config.chrome_path {
            Some(path) if path.exists() => Ok(path.clone()),
            Some(path) => Err(BrowserError::MissingBinary(path.clone())),
            None => Self::find_chrome().ok_or(BrowserError::ChromeNotFound),
        }
    }

    async fn devtools_up(&self) -> bool {
        let url = format!("{}/json/version", self.config.devtools_http());
        matches!(reqwest::get(&url).await, Ok(resp) if resp.status().is_success())
    }

    /// Flags for a Chrome this manager starts.
    pub(super) fn chrome_args(&self) -> Vec<String> {
        let profile = self.config.profile_dir();
        let mut args = vec![
            format!("--remote-debugging-port={}", self.config.debug_port),
            format!("--user-data-dir={}", profile.display()),
            format!("--window-size={},{}", self.config.viewport_width, self.config.viewport_height),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--disable-sync".to_string(),
        ];
        if self.config.headless {
            args.push("--headless=new".to_string());
        }
        args
    }

    async fn spawn_chrome(&self, binary: &Path) -> Result<Child, BrowserError> {
        let profile = self.config.profile_dir();
        if let Err(e) = tokio::fs::create_dir_all(&profile).await {
            warn!("Cannot create Chrome profile dir {}: {}", profile.display(), e);
        }
        let child = Command::new(binary)
            .args(self.chrome_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(BrowserError::Launch)?;
        info!(
            pid = ?child.id(),
            headless = self.config.headless,
            "Started Chrome with profile {}",
            profile.display()
        );
        Ok(child)
    }

    async fn wait_for_devtools(&self) -> Result<(), BrowserError> {
        let ready = tokio::time::timeout(DEVTOOLS_WAIT, async {
            while !self.devtools_up().await {
                tokio::time::sleep(DEVTOOLS_POLL).await;
            }
        })
        .await;
        ready.map_err(|_| BrowserError::DevtoolsTimeout {
            port: self.config.debug_port,
            waited: DEVTOOLS_WAIT,
        })
    }

    /// Attach to Chrome on the debug port, starting it first if nothing
    /// answers there.
    pub async fn connect(&self) -> Result<(), BrowserError> {
        let mut slot = self.client.write().await;
        if slot.as_ref().is_some_and(|c| c.is_alive()) {
            return Ok(());
        }

        if self.devtools_up().await {
            info!("Attaching to Chrome already listening on {}", self.config.debug_port);
        } else {
            let binary = self.chrome_binary()?;
            let child = self.spawn_chrome(&binary).await?;
            *self.chrome.lock().await = Some(child);
            self.wait_for_devtools().await?;
        }

        let client = CdpClient::connect(&self.config.devtools_http()).await?;
        *slot = Some(Arc::new(client));
        debug!("CDP connection established");
        Ok(())
    }

    /// Reconnect when the socket has died.
    pub async fn ensure_connected(&self) -> Result<(), BrowserError> {
        let alive = matches!(self.client.read().await.as_ref(), Some(c) if c.is_alive());
        if alive { Ok(()) } else { self.connect().await }
    }

    pub(super) async fn client(&self) -> Result<Arc<CdpClient>, BrowserError> {
        self.client.read().await.clone().ok_or(BrowserError::NotConnected)
    }

    /// Drop the CDP connection; Chrome keeps running.
    pub async fn close(&self) -> Result<(), BrowserError> {
        if self.client.write().await.take().is_some() {
            info!("CDP connection closed");
        }
        Ok(())
    }

    /// Close the connection and stop Chrome if this manager started it.
    pub async fn shutdown_chrome(&self) -> Result<(), BrowserError> {
        self.close().await?;
        if let Some(mut child) = self.chrome.lock().await.take() {
            info!("Stopping Chrome");
            if let Err(e) = child.kill().await {
                warn!("Failed to stop Chrome: {}", e);
            }
        }
        Ok(())
    }
}
