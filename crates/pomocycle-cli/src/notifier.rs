use notify_rust::Notification;
use pomocycle_core::notify::Notifier;
use tracing::{debug, warn};

/// Desktop notifications through the platform notification service.
pub struct DesktopNotifier {
    sound: bool,
}

impl DesktopNotifier {
    pub fn new(sound: bool) -> Self {
        Self { sound }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str, play_sound: bool) {
        let mut notification = Notification::new();
        notification.summary(title).body(message).appname("pomocycle");
        if play_sound && self.sound {
            notification.sound_name("default");
        }
        match notification.show() {
            Ok(_) => debug!(title, "notification sent"),
            Err(e) => warn!("could not send notification: {e}"),
        }
    }
}
