use relay_api::{Email, Notifier, Record};

use crate::error::IngestError;

/// What a single fan-out did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifySummary {
    pub subscribers: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Email every subscriber about `record`.
///
/// Only a failed subscriber listing is returned as an error; a failed send
/// is logged and the fan-out moves on to the next address. With `dry_run`
/// the emails are logged and nothing is sent.
pub async fn notify_all(
    notifier: &dyn Notifier,
    record: &Record,
    dry_run: bool,
) -> Result<NotifySummary, IngestError> {
    let subscribers = notifier
        .subscribers()
        .await
        .map_err(IngestError::NotifierUnavailable)?;

    let mut summary = NotifySummary {
        subscribers: subscribers.len(),
        ..Default::default()
    };

    for subscriber in &subscribers {
        let email = Email::for_record(&subscriber.email_address, record);
        if dry_run {
            tracing::info!(to = %email.to, subject = %email.subject, "dry run, email not sent");
            continue;
        }
        match notifier.send(&email).await {
            Ok(()) => summary.sent += 1,
            Err(e) => {
                summary.failed += 1;
                tracing::warn!(to = %email.to, error = %e, "email send failed");
            }
        }
    }

    tracing::debug!(
        subscribers = summary.subscribers,
        sent = summary.sent,
        failed = summary.failed,
        "notified subscribers"
    );
    Ok(summary)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use relay_api::{PluginError, Subscriber};

    use super::*;

    /// Notifier double: fixed subscriber list, records every send.
    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub addresses: Vec<String>,
        pub fail_listing: bool,
        pub fail_to: Option<String>,
        pub sent: Mutex<Vec<Email>>,
        pub listings: Mutex<usize>,
    }

    impl RecordingNotifier {
        pub(crate) fn with(addresses: &[&str]) -> Self {
            Self {
                addresses: addresses.iter().map(|a| a.to_string()).collect(),
                ..Default::default()
            }
        }

        pub(crate) fn sent(&self) -> Vec<Email> {
            self.sent.lock().unwrap().clone()
        }

        pub(crate) fn listings(&self) -> usize {
            *self.listings.lock().unwrap()
        }
    }

    impl Notifier for RecordingNotifier {
        fn subscribers(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<Subscriber>, PluginError>> + Send + '_>> {
            Box::pin(async move {
                *self.listings.lock().unwrap() += 1;
                if self.fail_listing {
                    return Err(PluginError::io("profiles: 503"));
                }
                Ok(self
                    .addresses
                    .iter()
                    .map(|a| Subscriber { email_address: a.clone() })
                    .collect())
            })
        }

        fn send(&self, email: &Email) -> Pin<Box<dyn Future<Output = Result<(), PluginError>> + Send + '_>> {
            let email = email.clone();
            Box::pin(async move {
                if self.fail_to.as_deref() == Some(email.to.as_str()) {
                    return Err(PluginError::io("mailbox unavailable"));
                }
                self.sent.lock().unwrap().push(email);
                Ok(())
            })
        }
    }

    fn reading() -> Record {
        Record::new("Location:Lab", "Machine:armv6l", "2015-11-26 08:05:56.060697")
    }

    #[tokio::test]
    async fn emails_every_subscriber() {
        let notifier = RecordingNotifier::with(&["a@example.com", "b@example.com"]);
        let summary = notify_all(&notifier, &reading(), false).await.unwrap();

        assert_eq!(summary, NotifySummary { subscribers: 2, sent: 2, failed: 0 });
        let sent = notifier.sent();
        assert_eq!(sent[0], Email::for_record("a@example.com", &reading()));
        assert_eq!(sent[1].to, "b@example.com");
    }

    #[tokio::test]
    async fn failed_send_does_not_stop_fanout() {
        let mut notifier = RecordingNotifier::with(&["a@example.com", "b@example.com", "c@example.com"]);
        notifier.fail_to = Some("a@example.com".into());

        let summary = notify_all(&notifier, &reading(), false).await.unwrap();
        assert_eq!(summary, NotifySummary { subscribers: 3, sent: 2, failed: 1 });
        let to: Vec<String> = notifier.sent().into_iter().map(|e| e.to).collect();
        assert_eq!(to, vec!["b@example.com", "c@example.com"]);
    }

    #[tokio::test]
    async fn listing_failure_is_notifier_unavailable() {
        let notifier = RecordingNotifier {
            fail_listing: true,
            ..RecordingNotifier::with(&["a@example.com"])
        };
        let err = notify_all(&notifier, &reading(), false).await.unwrap_err();
        assert!(matches!(err, IngestError::NotifierUnavailable(_)));
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let notifier = RecordingNotifier::with(&["a@example.com"]);
        let summary = notify_all(&notifier, &reading(), true).await.unwrap();
        assert_eq!(summary, NotifySummary { subscribers: 1, sent: 0, failed: 0 });
        assert_eq!(notifier.listings(), 1);
        assert!(notifier.sent().is_empty());
    }
}
