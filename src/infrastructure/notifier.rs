use crate::domain::errors::DomainError;
use crate::domain::ports::Notifier;

/// Notification sink that writes through the `log` facade instead of
/// talking to a mail provider. Real delivery is an external collaborator;
/// swapping it in only means another `Notifier` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to_email: &str, subject: &str, body: &str) -> Result<(), DomainError> {
        log::info!("notification to {}: {}", to_email, subject);
        log::debug!("notification body for {}:\n{}", to_email, body);
        Ok(())
    }
}
