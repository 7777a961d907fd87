//! Badge and notification delivery

use std::{
    process::{Command, Stdio},
    sync::Mutex,
};

use tracing::{debug, info, warn};

use crate::{
    error::{PomodoroError, Result},
    state::{Badge, Notification},
};

/// Display collaborator: toolbar badge and desktop notifications
pub trait Indicator: Send + Sync {
    fn show_badge(&self, badge: &Badge) -> Result<()>;

    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Reports badge changes and notifications through the log
#[derive(Debug, Default)]
pub struct LogIndicator {
    last_badge: Mutex<Option<Badge>>,
}

impl LogIndicator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indicator for LogIndicator {
    fn show_badge(&self, badge: &Badge) -> Result<()> {
        let mut last = self
            .last_badge
            .lock()
            .map_err(|e| PomodoroError::Indicator(format!("Failed to lock badge: {}", e)))?;
        if last.as_ref() != Some(badge) {
            debug!(
                "Badge: text={:?} color={} icon={}",
                badge.text, badge.color, badge.icon
            );
            *last = Some(badge.clone());
        }
        Ok(())
    }

    fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            "Notification: {} - {} (silent={})",
            notification.title, notification.message, notification.silent
        );
        Ok(())
    }
}

/// Sends notifications through `notify-send`, logging badge changes
#[derive(Debug, Default)]
pub struct DesktopIndicator {
    log: LogIndicator,
}

impl DesktopIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if notify-send is available on the system
    pub fn is_available() -> bool {
        Command::new("notify-send")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Indicator for DesktopIndicator {
    fn show_badge(&self, badge: &Badge) -> Result<()> {
        self.log.show_badge(badge)
    }

    fn notify(&self, notification: &Notification) -> Result<()> {
        self.log.notify(notification)?;

        let mut command = Command::new("notify-send");
        command
            .args(["--app-name", "pomodoro", "--urgency", "critical"])
            .args(["--icon", notification.icon]);
        if notification.silent {
            command.args(["--hint", "boolean:suppress-sound:true"]);
        }
        let mut child = command
            .arg(&notification.title)
            .arg(&notification.message)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PomodoroError::Indicator(format!("Failed to execute notify-send: {}", e)))?;

        // Reap the child off the controller's critical section.
        std::thread::spawn(move || {
            if let Err(e) = child.wait() {
                warn!("notify-send did not exit cleanly: {}", e);
            }
        });
        Ok(())
    }
}

/// Captures every badge and notification in memory
#[derive(Debug, Default)]
pub struct RecordingIndicator {
    badges: Mutex<Vec<Badge>>,
    notifications: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An indicator whose every call fails after recording.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn badges(&self) -> Vec<Badge> {
        self.badges.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    fn outcome(&self) -> Result<()> {
        if self.fail {
            Err(PomodoroError::Indicator("indicator unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

impl Indicator for RecordingIndicator {
    fn show_badge(&self, badge: &Badge) -> Result<()> {
        if let Ok(mut badges) = self.badges.lock() {
            badges.push(badge.clone());
        }
        self.outcome()
    }

    fn notify(&self, notification: &Notification) -> Result<()> {
        if let Ok(mut notifications) = self.notifications.lock() {
            notifications.push(notification.clone());
        }
        self.outcome()
    }
}
