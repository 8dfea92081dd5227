//! OS-level desktop notifications

use notify_rust::Notification;
use serde::Serialize;
use tracing::{debug, info};

const APP_NAME: &str = "pomodoro-timer";
const SUMMARY: &str = "Pomodoro Timer";

/// Whether desktop notifications may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Not asked yet
    Default,
    Granted,
    Denied,
    Unsupported,
}

#[derive(Debug, Clone)]
pub struct DesktopNotifications {
    permission: Permission,
}

impl DesktopNotifications {
    pub fn new() -> Self {
        Self {
            permission: Permission::Default,
        }
    }

    /// Build with the permission already decided, e.g. disabled from the CLI
    pub fn with_permission(permission: Permission) -> Self {
        Self { permission }
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    /// Ask once; later calls keep the first answer. May block briefly on
    /// the session bus, so call it off the async executor.
    pub fn request_permission(&mut self) -> Permission {
        if self.permission != Permission::Default {
            return self.permission;
        }
        self.permission = probe_notification_server();
        info!("Desktop notification permission: {:?}", self.permission);
        self.permission
    }

    /// Show `message` if permitted. Failures are swallowed.
    pub fn show(&self, message: &str) {
        if self.permission != Permission::Granted {
            debug!("Desktop notifications not permitted ({:?})", self.permission);
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No runtime available, skipping desktop notification");
            return;
        };
        let body = message.to_string();
        runtime.spawn_blocking(move || {
            if let Err(e) = Notification::new()
                .summary(SUMMARY)
                .body(&body)
                .appname(APP_NAME)
                .show()
            {
                debug!("Desktop notification failed: {}", e);
            }
        });
    }
}

impl Default for DesktopNotifications {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn probe_notification_server() -> Permission {
    match notify_rust::get_server_information() {
        Ok(server) => {
            debug!("Notification server: {} {}", server.name, server.version);
            Permission::Granted
        }
        Err(e) => {
            debug!("No notification server: {}", e);
            Permission::Unsupported
        }
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn probe_notification_server() -> Permission {
    Permission::Granted
}
