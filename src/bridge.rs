//! Event bridge
//!
//! The bridge owns the registration record and the per-event dispatch
//! pipeline: look up the operator template for the fired event, render it
//! against the payload, and post the result to Slack if credentials are
//! configured. Each event is handled independently; a failed post never
//! affects later events.

use crate::chat::ChatPoster;
use crate::config::{self, ConfigSource, PostSettings};
use crate::error::{Error, Result};
use crate::event::{EventKind, EventPayload};
use crate::host::{EventSource, Subscription};
use crate::template;
use std::sync::Arc;
use tracing::{debug, info};

/// Notification bridge between the host's lifecycle events and Slack.
pub struct EventBridge {
    config: Arc<dyn ConfigSource>,
    chat: Arc<dyn ChatPoster>,
    subscriptions: Vec<Subscription>,
}

impl EventBridge {
    /// Attach a handler for every event kind and return the live bridge.
    ///
    /// Handlers attach in [`EventKind::ALL`] order. Registration is
    /// all-or-nothing: on the first attach failure the handles acquired so
    /// far are dropped (detaching their handlers) and the error propagates.
    pub fn register(
        source: &mut dyn EventSource,
        config: Arc<dyn ConfigSource>,
        chat: Arc<dyn ChatPoster>,
    ) -> Result<Self> {
        let mut subscriptions = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            subscriptions.push(source.attach(kind)?);
        }

        info!(count = subscriptions.len(), "Event handlers attached");

        Ok(Self {
            config,
            chat,
            subscriptions,
        })
    }

    /// Detach all handlers, last-registered-first.
    ///
    /// Calling this on an already-torn-down bridge is a no-op.
    pub fn teardown(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }

        while let Some(subscription) = self.subscriptions.pop() {
            drop(subscription);
        }

        info!("Event handlers detached");
    }

    /// Number of currently attached handlers.
    #[must_use]
    pub fn registered_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the bridge currently holds any registrations.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Handle one fired event.
    ///
    /// Looks up the operator template for `kind`, renders it against
    /// `payload`, and posts the result. An unset template or missing
    /// credentials skip the post silently; a failed Slack call propagates
    /// to the host unrecovered.
    pub async fn handle(&self, kind: EventKind, payload: EventPayload) -> Result<()> {
        if payload.shape() != kind.shape() {
            return Err(Error::Payload(format!(
                "{} fires with {} payloads, got {}",
                kind,
                kind.shape(),
                payload.shape()
            )));
        }

        let template = self
            .config
            .get_string_or(&config::message_key(kind), "");
        if template.is_empty() {
            debug!(event = %kind, "No message template configured, skipping");
            return Ok(());
        }

        let text = template::render(&template, &payload.fields());
        self.post(kind, &text).await
    }

    /// Post rendered text, unless notifications are disabled.
    async fn post(&self, kind: EventKind, text: &str) -> Result<()> {
        let Some(settings) = PostSettings::load(self.config.as_ref()) else {
            debug!(event = %kind, "Slack credentials not configured, notifications disabled");
            return Ok(());
        };

        self.chat.post_message(&settings, text).await?;

        info!(event = %kind, channel = %settings.channel, "Notification posted");
        Ok(())
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge")
            .field("registered", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::MockChatPoster;
    use crate::event::{JobInfo, ReportInfo, TaskInfo, WorkerInfo};
    use crate::host::{cleanup_listener, create_listener};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Event source that records attach/detach order.
    struct RecordingSource {
        log: Arc<Mutex<Vec<String>>>,
        fail_after: Option<usize>,
        attached: usize,
    }

    impl RecordingSource {
        fn new(log: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                log,
                fail_after: None,
                attached: 0,
            }
        }

        fn failing_after(log: Arc<Mutex<Vec<String>>>, n: usize) -> Self {
            Self {
                log,
                fail_after: Some(n),
                attached: 0,
            }
        }
    }

    impl EventSource for RecordingSource {
        fn attach(&mut self, kind: EventKind) -> Result<Subscription> {
            if let Some(limit) = self.fail_after {
                if self.attached >= limit {
                    return Err(Error::Registration(format!("{} slot unavailable", kind)));
                }
            }
            self.attached += 1;
            self.log.lock().unwrap().push(format!("attach:{}", kind));

            let log = Arc::clone(&self.log);
            Ok(Subscription::new(kind, move || {
                log.lock().unwrap().push(format!("detach:{}", kind));
            }))
        }
    }

    struct MapConfig(HashMap<String, String>);

    impl MapConfig {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            )
        }

        fn with_credentials(entries: &[(&str, &str)]) -> Self {
            let mut config = Self::new(entries);
            config
                .0
                .insert(config::API_KEY.to_string(), "xoxp-test".to_string());
            config
                .0
                .insert(config::CHANNEL.to_string(), "#farm".to_string());
            config
        }
    }

    impl ConfigSource for MapConfig {
        fn get_string_or(&self, key: &str, default: &str) -> String {
            self.0.get(key).cloned().unwrap_or_else(|| default.to_string())
        }

        fn get_bool_or(&self, key: &str, default: bool) -> bool {
            self.0
                .get(key)
                .map(|v| v == "true" || v == "1")
                .unwrap_or(default)
        }
    }

    fn bridge_with(config: MapConfig, chat: MockChatPoster) -> EventBridge {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut source = RecordingSource::new(log);
        EventBridge::register(&mut source, Arc::new(config), Arc::new(chat)).unwrap()
    }

    fn job_payload(name: &str) -> EventPayload {
        EventPayload::Job(JobInfo::new("1", name))
    }

    #[test]
    fn test_register_attaches_all_kinds() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut source = RecordingSource::new(Arc::clone(&log));

        let bridge = create_listener(
            &mut source,
            Arc::new(MapConfig::new(&[])),
            Arc::new(MockChatPoster::new()),
        )
        .unwrap();

        assert!(bridge.is_registered());
        assert_eq!(bridge.registered_count(), EventKind::ALL.len());

        let attached: Vec<String> = EventKind::ALL
            .iter()
            .map(|k| format!("attach:{}", k))
            .collect();
        assert_eq!(*log.lock().unwrap(), attached);
    }

    #[test]
    fn test_teardown_detaches_in_reverse_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut source = RecordingSource::new(Arc::clone(&log));

        let bridge = create_listener(
            &mut source,
            Arc::new(MapConfig::new(&[])),
            Arc::new(MockChatPoster::new()),
        )
        .unwrap();
        cleanup_listener(bridge);

        let entries = log.lock().unwrap();
        let detached: Vec<&String> = entries
            .iter()
            .filter(|e| e.starts_with("detach:"))
            .collect();

        assert_eq!(detached.len(), EventKind::ALL.len());
        let expected: Vec<String> = EventKind::ALL
            .iter()
            .rev()
            .map(|k| format!("detach:{}", k))
            .collect();
        assert_eq!(detached, expected.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_teardown_twice_is_noop() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut source = RecordingSource::new(Arc::clone(&log));

        let mut bridge = EventBridge::register(
            &mut source,
            Arc::new(MapConfig::new(&[])),
            Arc::new(MockChatPoster::new()),
        )
        .unwrap();

        bridge.teardown();
        let after_first = log.lock().unwrap().len();
        bridge.teardown();

        assert_eq!(bridge.registered_count(), 0);
        assert_eq!(log.lock().unwrap().len(), after_first);
    }

    #[test]
    fn test_register_rolls_back_on_attach_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut source = RecordingSource::failing_after(Arc::clone(&log), 5);

        let result = EventBridge::register(
            &mut source,
            Arc::new(MapConfig::new(&[])),
            Arc::new(MockChatPoster::new()),
        );

        assert!(matches!(result, Err(Error::Registration(_))));

        // The five attached handlers must have been released again.
        let entries = log.lock().unwrap();
        let attached = entries.iter().filter(|e| e.starts_with("attach:")).count();
        let detached = entries.iter().filter(|e| e.starts_with("detach:")).count();
        assert_eq!(attached, 5);
        assert_eq!(detached, 5);
    }

    #[tokio::test]
    async fn test_empty_template_skips_post() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message().times(0);

        let bridge = bridge_with(MapConfig::with_credentials(&[]), chat);
        bridge
            .handle(EventKind::JobFinished, job_payload("Job42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_semicolon_renders_as_newline() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .withf(|_, text| text.contains('\n') && !text.contains(';'))
            .times(1)
            .returning(|_, _| Ok(()));

        let config = MapConfig::with_credentials(&[(
            "SlackOnJobFinishedMessage",
            "Job {job} done;render away",
        )]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(EventKind::JobFinished, job_payload("Job42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_job_placeholder_substituted() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .withf(|_, text| text == "finished: Job42")
            .times(1)
            .returning(|_, _| Ok(()));

        let config =
            MapConfig::with_credentials(&[("SlackOnJobFinishedMessage", "finished: {job}")]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(EventKind::JobFinished, job_payload("Job42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_api_key_suppresses_post() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message().times(0);

        let config = MapConfig::new(&[
            ("SlackOnJobFinishedMessage", "done"),
            (config::CHANNEL, "#farm"),
        ]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(EventKind::JobFinished, job_payload("Job42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_channel_suppresses_post() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message().times(0);

        let config = MapConfig::new(&[
            ("SlackOnJobFinishedMessage", "done"),
            (config::API_KEY, "xoxp-test"),
        ]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(EventKind::JobFinished, job_payload("Job42"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_as_user_defaults_true() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .withf(|settings, _| settings.as_user)
            .times(1)
            .returning(|_, _| Ok(()));

        let config = MapConfig::with_credentials(&[("SlackOnSlaveIdleMessage", "{slave} idle")]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(
                EventKind::SlaveIdle,
                EventPayload::Worker(WorkerInfo::new("node-01")),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_job_failed_end_to_end() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .withf(|settings, text| {
                settings.channel == "#farm" && text == "Job J1 failed\nsee report"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let config = MapConfig::with_credentials(&[(
            "SlackOnJobFailedMessage",
            "Job {job} failed;see report",
        )]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(EventKind::JobFailed, job_payload("J1"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_job_error_placeholders() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .withf(|_, text| text == "comp_v001 task 7: out of memory")
            .times(1)
            .returning(|_, _| Ok(()));

        let config = MapConfig::with_credentials(&[(
            "SlackOnJobErrorMessage",
            "{job} task {task}: {report}",
        )]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(
                EventKind::JobError,
                EventPayload::JobError {
                    job: JobInfo::new("1", "comp_v001"),
                    task: TaskInfo::new("7"),
                    report: ReportInfo::new("out of memory"),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_worker_job_placeholders() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .withf(|_, text| text == "node-03 rendering Job42")
            .times(1)
            .returning(|_, _| Ok(()));

        let config = MapConfig::with_credentials(&[(
            "SlackOnSlaveRenderingMessage",
            "{slave} rendering {job}",
        )]);

        let bridge = bridge_with(config, chat);
        bridge
            .handle(
                EventKind::SlaveRendering,
                EventPayload::WorkerJob {
                    worker: WorkerInfo::new("node-03"),
                    job: JobInfo::new("42", "Job42"),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_shape_mismatch_rejected() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message().times(0);

        let config = MapConfig::with_credentials(&[("SlackOnSlaveIdleMessage", "{slave} idle")]);

        let bridge = bridge_with(config, chat);
        let result = bridge
            .handle(EventKind::SlaveIdle, job_payload("Job42"))
            .await;

        assert!(matches!(result, Err(Error::Payload(_))));
    }

    #[tokio::test]
    async fn test_chat_failure_propagates() {
        let mut chat = MockChatPoster::new();
        chat.expect_post_message()
            .times(1)
            .returning(|_, _| Err(Error::Slack("channel_not_found".to_string())));

        let config = MapConfig::with_credentials(&[("SlackOnJobFailedMessage", "failed")]);

        let bridge = bridge_with(config, chat);
        let result = bridge.handle(EventKind::JobFailed, job_payload("J1")).await;

        assert!(matches!(result, Err(Error::Slack(_))));
    }
}
