//! Short-lived toast messages.

use web_time::{Duration, Instant};

/// How long a toast stays on screen.
const TOAST_LIFETIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    /// When the toast becomes visible.
    pub show_at: Instant,
}

impl Toast {
    pub fn is_visible(&self, now: Instant) -> bool {
        now >= self.show_at && now < self.show_at + TOAST_LIFETIME
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.show_at + TOAST_LIFETIME
    }
}

#[derive(Debug, Default)]
pub struct Notifications {
    toasts: Vec<Toast>,
}

impl Notifications {
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Success, Instant::now());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Warning, Instant::now());
    }

    /// Queues a warning that appears after `delay`.
    pub fn warning_after(&mut self, message: impl Into<String>, delay: Duration) {
        self.push(message.into(), ToastLevel::Warning, Instant::now() + delay);
    }

    fn push(&mut self, message: String, level: ToastLevel, show_at: Instant) {
        self.toasts.push(Toast {
            message,
            level,
            show_at,
        });
    }

    /// Drops expired toasts and returns the ones to draw.
    pub fn visible(&mut self, now: Instant) -> Vec<Toast> {
        self.toasts.retain(|t| !t.is_expired(now));
        self.toasts
            .iter()
            .filter(|t| t.is_visible(now))
            .cloned()
            .collect()
    }

    /// True while some toast is shown or waiting to be shown.
    pub fn is_active(&self) -> bool {
        !self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_lifecycle() {
        let mut notifications = Notifications::default();
        notifications.success("Saved");
        notifications.warning_after("Export reminder", Duration::from_secs(2));

        let now = Instant::now();
        let visible = notifications.visible(now);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].level, ToastLevel::Success);

        let later = now + Duration::from_millis(4500);
        let visible = notifications.visible(later);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "Export reminder");

        assert!(notifications.visible(now + Duration::from_secs(10)).is_empty());
        assert!(!notifications.is_active());
    }
}
