// ── Notification bus ──
//
// Process-wide list of short-lived messages for the front end. The list
// lives inside a `watch` channel so renderers can either poll
// `snapshot()` or await changes on a receiver from `subscribe()`.
// Non-persistent entries remove themselves after their duration on a
// spawned tokio timer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Lifetime of a notification when nothing else is specified.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Millisecond-timestamp identifier, unique and increasing per bus.
pub type NotificationId = u64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    /// Duration used by the per-kind convenience constructors.
    pub fn default_duration(self) -> Duration {
        match self {
            Self::Success | Self::Info => Duration::from_millis(4000),
            Self::Error => Duration::from_millis(6000),
            Self::Warning => Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    #[serde(serialize_with = "as_millis")]
    pub duration: Duration,
    pub persistent: bool,
    pub created_at: DateTime<Utc>,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

/// A notification that has not been shown yet.
///
/// `duration: None` means [`DEFAULT_DURATION`]; the `success`/`error`/...
/// constructors preset the per-kind duration instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub duration: Option<Duration>,
    pub persistent: bool,
}

impl NewNotification {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: None,
            duration: None,
            persistent: false,
        }
    }

    fn preset(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self::new(kind, title).duration(kind.default_duration())
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self::preset(NotificationKind::Success, title)
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::preset(NotificationKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::preset(NotificationKind::Warning, title)
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self::preset(NotificationKind::Info, title)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }
}

// ── Bus ─────────────────────────────────────────────────────────────

struct Inner {
    list: watch::Sender<Vec<Notification>>,
    last_id: AtomicU64,
}

/// Cheaply cloneable handle; clones share one list.
#[derive(Clone)]
pub struct NotificationBus {
    inner: Arc<Inner>,
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBus {
    pub fn new() -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                list,
                last_id: AtomicU64::new(0),
            }),
        }
    }

    /// Append a notification and, unless persistent, schedule its removal.
    ///
    /// Outside a tokio runtime the removal cannot be scheduled and the
    /// entry stays until removed explicitly.
    pub fn show(&self, new: NewNotification) -> NotificationId {
        let id = self.next_id();
        let notification = Notification {
            id,
            kind: new.kind,
            title: new.title,
            message: new.message,
            duration: new.duration.unwrap_or(DEFAULT_DURATION),
            persistent: new.persistent,
            created_at: Utc::now(),
        };
        let expire_after = (!notification.persistent).then_some(notification.duration);

        debug!(id, kind = %notification.kind, title = %notification.title, "notification shown");
        self.inner.list.send_modify(|list| list.push(notification));

        if let Some(after) = expire_after {
            self.schedule_removal(id, after);
        }
        id
    }

    pub fn success(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(with_message(NewNotification::success(title), message))
    }

    pub fn error(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(with_message(NewNotification::error(title), message))
    }

    pub fn warning(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(with_message(NewNotification::warning(title), message))
    }

    pub fn info(&self, title: impl Into<String>, message: Option<String>) -> NotificationId {
        self.show(with_message(NewNotification::info(title), message))
    }

    /// Remove the entry with `id`. Unknown ids are ignored.
    pub fn remove(&self, id: NotificationId) {
        self.inner.list.send_if_modified(|list| {
            match list.iter().position(|n| n.id == id) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            }
        });
    }

    pub fn clear(&self) {
        self.inner.list.send_if_modified(|list| {
            let had_any = !list.is_empty();
            list.clear();
            had_any
        });
    }

    /// Current list, oldest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.list.borrow().clone()
    }

    /// Receiver notified on every change to the list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.list.subscribe()
    }

    /// Remove and return everything currently listed.
    pub fn drain(&self) -> Vec<Notification> {
        let mut drained = Vec::new();
        self.inner.list.send_if_modified(|list| {
            drained = std::mem::take(list);
            !drained.is_empty()
        });
        drained
    }

    fn next_id(&self) -> NotificationId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let previous = self
            .inner
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    fn schedule_removal(&self, id: NotificationId, after: Duration) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(id, "no tokio runtime, notification will not expire");
            return;
        };
        let deadline = tokio::time::Instant::now() + after;
        let bus: Weak<Inner> = Arc::downgrade(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = bus.upgrade() {
                NotificationBus { inner }.remove(id);
            }
        });
    }
}

fn with_message(new: NewNotification, message: Option<String>) -> NewNotification {
    match message {
        Some(message) => new.message(message),
        None => new,
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("notifications", &*self.inner.list.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn kind_defaults() {
        assert_eq!(
            NotificationKind::Success.default_duration(),
            Duration::from_millis(4000)
        );
        assert_eq!(
            NotificationKind::Error.default_duration(),
            Duration::from_millis(6000)
        );
        assert_eq!(
            NotificationKind::Warning.default_duration(),
            Duration::from_millis(5000)
        );
        assert_eq!(
            NotificationKind::Info.default_duration(),
            Duration::from_millis(4000)
        );
    }

    #[test]
    fn ids_strictly_increase() {
        let bus = NotificationBus::new();
        let ids: Vec<_> = (0..50)
            .map(|i| bus.show(NewNotification::info(format!("n{i}")).persistent()))
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn generic_show_uses_base_default() {
        let bus = NotificationBus::new();
        bus.show(NewNotification::new(NotificationKind::Success, "saved").persistent());
        assert_eq!(bus.snapshot()[0].duration, DEFAULT_DURATION);
    }

    #[test]
    fn remove_and_clear() {
        let bus = NotificationBus::new();
        let a = bus.show(NewNotification::info("a").persistent());
        let _b = bus.show(NewNotification::info("b").persistent());
        bus.remove(a);
        bus.remove(a);
        let titles: Vec<_> = bus.snapshot().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, ["b"]);
        bus.clear();
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn success_expires_after_four_seconds() {
        let bus = NotificationBus::new();
        bus.success("Saved", Some("desk updated".into()));

        tokio::time::advance(Duration::from_millis(3999)).await;
        settle().await;
        assert_eq!(bus.snapshot().len(), 1);

        tokio::time::advance(Duration::from_millis(2)).await;
        settle().await;
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn error_outlives_success() {
        let bus = NotificationBus::new();
        bus.success("ok", None);
        bus.error("failed", None);

        tokio::time::advance(Duration::from_millis(4500)).await;
        settle().await;
        let left: Vec<_> = bus.snapshot().into_iter().map(|n| n.kind).collect();
        assert_eq!(left, [NotificationKind::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn duration_override_wins() {
        let bus = NotificationBus::new();
        bus.show(NewNotification::error("quick").duration(Duration::from_millis(100)));

        tokio::time::advance(Duration::from_millis(150)).await;
        settle().await;
        assert!(bus.snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_never_expires() {
        let bus = NotificationBus::new();
        bus.show(NewNotification::warning("sticky").persistent());

        tokio::time::advance(Duration::from_secs(3600)).await;
        settle().await;
        assert_eq!(bus.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let bus = NotificationBus::new();
        let mut rx = bus.subscribe();
        bus.info("hello", None);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()[0].title, "hello");
    }
}
