//! Notification queue.
//!
//! Transient status messages share a single on-screen slot. Messages are
//! shown strictly in the order they were enqueued, each for a fixed
//! duration. Time is passed in by the caller so the queue never reads a
//! clock itself.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    /// Reference to the icon shown beside the message.
    pub icon: String,
}

impl Notification {
    pub fn new(message: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            icon: icon.into(),
        }
    }
}

/// A change of the visible slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissed(Notification),
}

#[derive(Debug, Clone)]
struct Active {
    notification: Notification,
    shown_at: Instant,
}

/// FIFO of pending notifications with at most one active.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    pending: VecDeque<Notification>,
    active: Option<Active>,
    display_for: Duration,
}

impl NotificationQueue {
    pub fn new(display_for: Duration) -> Self {
        Self {
            pending: VecDeque::new(),
            active: None,
            display_for,
        }
    }

    /// Appends `notification` to the queue.
    ///
    /// When nothing is showing it becomes active immediately and the `Shown`
    /// event is returned. While another notification is active this only
    /// appends.
    pub fn enqueue(&mut self, notification: Notification, now: Instant) -> Option<NotificationEvent> {
        tracing::debug!(message = %notification.message, "notification queued");
        self.pending.push_back(notification);
        if self.active.is_some() {
            return None;
        }
        self.show_next(now)
    }

    /// Advances the queue to `now`.
    ///
    /// Every deadline that passed produces a `Dismissed` event followed by
    /// the `Shown` event of the next entry. The next entry is considered
    /// shown at the previous deadline, so a late tick never lengthens the
    /// schedule or skips an entry.
    pub fn tick(&mut self, now: Instant) -> Vec<NotificationEvent> {
        let mut events = Vec::new();
        while let Some(active) = &self.active {
            let deadline = active.shown_at + self.display_for;
            if deadline > now {
                break;
            }
            events.extend(self.dismiss_at(deadline));
        }
        events
    }

    /// Dismisses the active notification early (e.g. it was clicked).
    pub fn dismiss_active(&mut self, now: Instant) -> Vec<NotificationEvent> {
        if self.active.is_none() {
            return Vec::new();
        }
        self.dismiss_at(now)
    }

    fn dismiss_at(&mut self, at: Instant) -> Vec<NotificationEvent> {
        let mut events = Vec::with_capacity(2);
        if let Some(done) = self.active.take() {
            events.push(NotificationEvent::Dismissed(done.notification));
        }
        events.extend(self.show_next(at));
        events
    }

    fn show_next(&mut self, at: Instant) -> Option<NotificationEvent> {
        let notification = self.pending.pop_front()?;
        self.active = Some(Active {
            notification: notification.clone(),
            shown_at: at,
        });
        Some(NotificationEvent::Shown(notification))
    }

    /// The notification currently on screen.
    pub fn active(&self) -> Option<&Notification> {
        self.active.as_ref().map(|a| &a.notification)
    }

    /// Entries waiting behind the active one.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// `true` when nothing is showing and nothing is waiting.
    pub fn is_idle(&self) -> bool {
        self.active.is_none() && self.pending.is_empty()
    }

    /// When the active notification will be dismissed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().map(|a| a.shown_at + self.display_for)
    }

    pub fn display_for(&self) -> Duration {
        self.display_for
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW: Duration = Duration::from_millis(2500);

    fn n(message: &str) -> Notification {
        Notification::new(message, "/images/icon-tick.svg")
    }

    fn shown_order(events: &[NotificationEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                NotificationEvent::Shown(n) => Some(n.message.clone()),
                NotificationEvent::Dismissed(_) => None,
            })
            .collect()
    }

    #[test]
    fn first_enqueue_shows_immediately() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        let event = queue.enqueue(n("A"), t0);
        assert_eq!(event, Some(NotificationEvent::Shown(n("A"))));
        assert_eq!(queue.active(), Some(&n("A")));
    }

    #[test]
    fn enqueue_while_active_only_appends() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        assert_eq!(queue.enqueue(n("B"), t0), None);
        assert_eq!(queue.active(), Some(&n("A")));
        assert_eq!(queue.pending_len(), 1);
    }

    #[test]
    fn fifo_order_including_late_arrival() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        let mut events: Vec<NotificationEvent> = Vec::new();
        events.extend(queue.enqueue(n("A"), t0));
        events.extend(queue.enqueue(n("B"), t0));
        events.extend(queue.enqueue(n("C"), t0));
        events.extend(queue.tick(t0 + Duration::from_millis(1000)));
        events.extend(queue.enqueue(n("D"), t0 + Duration::from_millis(1200)));
        events.extend(queue.tick(t0 + SHOW * 10));

        assert_eq!(shown_order(&events), vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn at_most_one_active_between_events() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        queue.enqueue(n("B"), t0);

        let events = queue.tick(t0 + SHOW);
        assert_eq!(
            events,
            vec![
                NotificationEvent::Dismissed(n("A")),
                NotificationEvent::Shown(n("B")),
            ]
        );
        assert_eq!(queue.active(), Some(&n("B")));
    }

    #[test]
    fn queue_drains_fully() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        queue.enqueue(n("B"), t0);

        queue.tick(t0 + SHOW * 2 + Duration::from_millis(1));
        assert!(queue.is_idle());
        assert_eq!(queue.active(), None);
    }

    #[test]
    fn coarse_tick_keeps_schedule_anchored() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        queue.enqueue(n("B"), t0);
        queue.enqueue(n("C"), t0);

        let events = queue.tick(t0 + SHOW * 2 + Duration::from_millis(10));
        assert_eq!(shown_order(&events), vec!["B", "C"]);
        assert_eq!(queue.next_deadline(), Some(t0 + SHOW * 3));
    }

    #[test]
    fn tick_before_deadline_does_nothing() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        assert!(queue.tick(t0 + Duration::from_millis(2499)).is_empty());
        assert_eq!(queue.active(), Some(&n("A")));
    }

    #[test]
    fn dismiss_active_starts_next_at_now() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        queue.enqueue(n("B"), t0);

        let clicked = t0 + Duration::from_millis(300);
        let events = queue.dismiss_active(clicked);
        assert_eq!(shown_order(&events), vec!["B"]);
        assert_eq!(queue.next_deadline(), Some(clicked + SHOW));
    }

    #[test]
    fn dismiss_with_nothing_active_is_empty() {
        let mut queue = NotificationQueue::new(SHOW);
        assert!(queue.dismiss_active(Instant::now()).is_empty());
        assert!(queue.is_idle());
    }

    #[test]
    fn enqueue_after_idle_restarts_daemon() {
        let t0 = Instant::now();
        let mut queue = NotificationQueue::new(SHOW);
        queue.enqueue(n("A"), t0);
        queue.tick(t0 + SHOW);
        assert!(queue.is_idle());

        let later = t0 + SHOW * 4;
        assert_eq!(
            queue.enqueue(n("B"), later),
            Some(NotificationEvent::Shown(n("B")))
        );
        assert_eq!(queue.next_deadline(), Some(later + SHOW));
    }
}
