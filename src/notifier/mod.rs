//! Completion notifications
//!
//! A completed interval is surfaced three ways: an in-app banner, a short
//! audible chime and an OS-level desktop notification. Only the banner is
//! mandatory; sound and desktop notifications degrade silently.

pub mod banner;
pub mod desktop;
pub mod sound;

pub use banner::{Banner, BannerBoard, AUTO_DISMISS};
pub use desktop::{DesktopNotifications, Permission};
pub use sound::{SoundPlayer, ToneSequence};

use tracing::debug;

/// Completion collaborator of the timer engine
pub trait Notifier: Send {
    fn notify_completion(&mut self, message: &str);

    /// One-time request for OS notification permission. Optional.
    fn request_permission(&mut self) {}
}

/// Notifier used by the server: banner plus optional sound and desktop popup
#[derive(Debug, Clone)]
pub struct ShellNotifier {
    banner: BannerBoard,
    sound: Option<SoundPlayer>,
    desktop: Option<DesktopNotifications>,
    chime: ToneSequence,
}

impl ShellNotifier {
    pub fn new(
        banner: BannerBoard,
        sound: Option<SoundPlayer>,
        desktop: Option<DesktopNotifications>,
    ) -> Self {
        Self {
            banner,
            sound,
            desktop,
            chime: ToneSequence::chime(),
        }
    }

    /// Banner only
    pub fn silent(banner: BannerBoard) -> Self {
        Self::new(banner, None, None)
    }
}

impl Notifier for ShellNotifier {
    fn notify_completion(&mut self, message: &str) {
        let generation = self.banner.show(message);
        debug!("Showing completion banner {}: {}", generation, message);

        if let Some(sound) = &self.sound {
            sound.play(&self.chime);
        }
        if let Some(desktop) = &self.desktop {
            desktop.show(message);
        }
    }

    fn request_permission(&mut self) {
        if let Some(desktop) = &mut self.desktop {
            desktop.request_permission();
        }
    }
}
