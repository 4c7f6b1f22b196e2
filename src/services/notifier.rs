use log::{error, info};

/// User-facing feedback emitted by booking forms: toasts and navigation.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn navigate(&self, path: &str);
}

/// Writes every notification to the log. Used by the CLI and as a
/// fallback when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }

    fn navigate(&self, path: &str) {
        info!("navigate to {}", path);
    }
}
