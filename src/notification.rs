//! Desktop notifications
//!
//! Best-effort notifications via notify-send. Used to surface
//! conditions the user must act on (hook install failure); failures
//! here are logged and never propagate.

use std::process::Stdio;
use tokio::process::Command;

/// Send a desktop notification with the given title and body.
pub async fn send(title: &str, body: &str) {
    #[cfg(target_os = "linux")]
    {
        let result = Command::new("notify-send")
            .args(["--app-name=Keyclack", "--expire-time=4000", title, body])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        if let Err(e) = result {
            tracing::debug!("Failed to send notification: {}", e);
        }
    }

    #[cfg(not(target_os = "linux"))]
    {
        tracing::debug!("Notification ({}: {}) suppressed: unsupported platform", title, body);
    }
}
