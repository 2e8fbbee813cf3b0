//! Navigation boundary: the search core only produces route strings.

use std::process::{Command, Stdio};

use tracing::{debug, warn};

/// Something that can move the application to an internal route.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

/// Records routes; opens them in the admin console when configured to.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNavigator {
    console_url: Option<String>,
    open_browser: bool,
    last_route: Option<String>,
}

impl ConsoleNavigator {
    pub fn new(console_url: Option<String>, open_browser: bool) -> Self {
        Self {
            console_url: console_url.map(|url| url.trim_end_matches('/').to_string()),
            open_browser,
            last_route: None,
        }
    }

    pub fn last_route(&self) -> Option<&str> {
        self.last_route.as_deref()
    }

    /// Absolute console URL for a route; absolute locators are kept as-is.
    pub fn target_url(&self, route: &str) -> Option<String> {
        if route.starts_with("http://") || route.starts_with("https://") {
            return Some(route.to_string());
        }
        self.console_url.as_ref().map(|base| format!("{base}{route}"))
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, route: &str) {
        self.last_route = Some(route.to_string());
        if !self.open_browser {
            return;
        }
        match self.target_url(route) {
            Some(url) => {
                debug!(url = %url, "opening console route");
                if let Err(e) = open_in_browser(&url) {
                    warn!("failed to open {url}: {e}");
                }
            }
            None => debug!(route, "no console url configured; route recorded only"),
        }
    }
}

/// Collects every route it is asked to visit.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    pub routes: Vec<String>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, route: &str) {
        self.routes.push(route.to_string());
    }
}

/// Command that hands `url` to the platform opener.
///
/// Its output is discarded: the opener runs while the terminal UI owns the screen.
pub fn browser_command(url: &str) -> Command {
    let mut cmd = if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", "", url]);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        cmd
    };
    cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
    cmd
}

/// Open a URL in the system's default browser
pub fn open_in_browser(url: &str) -> std::io::Result<()> {
    browser_command(url).spawn()?;
    Ok(())
}
