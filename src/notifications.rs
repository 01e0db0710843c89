//! Support notifications and email settings.
//!
//! The notifications screen seeds two announcements so it is never empty
//! on first run. An authenticated refresh replaces the list with the
//! backend's; guests only ever see the seeds plus locally added entries.
//! One schema serves both paths.

use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::Mutex;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::Session;
use crate::store::local_id;
use crate::types::{EmailSettings, NotificationKind, SupportNotification};

fn seed_notifications() -> Vec<SupportNotification> {
    vec![
        SupportNotification {
            id: "seed-1".to_string(),
            title: "New Recipe Categories Added!".to_string(),
            message: "We've added new recipe categories including Mediterranean and Asian cuisine."
                .to_string(),
            kind: NotificationKind::Announcement,
            date: Utc::now().to_rfc3339(),
            read: false,
        },
        SupportNotification {
            id: "seed-2".to_string(),
            title: "Scheduled Maintenance".to_string(),
            message:
                "System maintenance scheduled for tonight 2-4 AM EST. App may be temporarily unavailable."
                    .to_string(),
            kind: NotificationKind::Maintenance,
            date: (Utc::now() - Duration::days(1)).to_rfc3339(),
            read: false,
        },
    ]
}

pub struct NotificationCenter {
    session: Arc<Session>,
    api: Arc<ApiClient>,
    items: Mutex<Vec<SupportNotification>>,
    email_settings: Mutex<EmailSettings>,
}

impl NotificationCenter {
    pub fn new(session: Arc<Session>, api: Arc<ApiClient>) -> Self {
        Self {
            session,
            api,
            items: Mutex::new(seed_notifications()),
            email_settings: Mutex::new(EmailSettings::default()),
        }
    }

    /// Newest first.
    pub fn list(&self) -> Vec<SupportNotification> {
        self.items.lock().clone()
    }

    pub fn unread_count(&self) -> usize {
        self.items.lock().iter().filter(|n| !n.read).count()
    }

    /// Mark one notification read. Returns false when the id is unknown.
    pub fn mark_read(&self, id: &str) -> bool {
        let mut items = self.items.lock();
        match items.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    /// Prepend a locally generated notification.
    pub fn add(&self, title: &str, message: &str, kind: NotificationKind) -> SupportNotification {
        let notification = SupportNotification {
            id: local_id("notif"),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            date: Utc::now().to_rfc3339(),
            read: false,
        };
        self.items.lock().insert(0, notification.clone());
        notification
    }

    /// Replace the list with the backend's when authenticated; a guest
    /// refresh is a no-op.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        if !self.session.is_authenticated() {
            return Ok(());
        }
        let items = self.api.get_notifications().await?;
        *self.items.lock() = items;
        Ok(())
    }

    /// Publish a notification through the backend (admin dashboard path).
    pub async fn publish(&self, notification: &SupportNotification) -> Result<(), ApiError> {
        self.api.create_notification(notification).await
    }

    // -- email settings -----------------------------------------------------

    pub fn email_settings(&self) -> EmailSettings {
        self.email_settings.lock().clone()
    }

    pub fn update_email_settings<F>(&self, mutate: F) -> EmailSettings
    where
        F: FnOnce(&mut EmailSettings),
    {
        let mut settings = self.email_settings.lock();
        mutate(&mut settings);
        settings.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalStore, KEY_GUEST_MODE};

    fn guest_center() -> (tempfile::TempDir, NotificationCenter) {
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open_at(dir.path().to_path_buf()).unwrap();
        local.write(KEY_GUEST_MODE, &true).unwrap();
        let session = Arc::new(Session::restore(local.clone()));
        let api = Arc::new(ApiClient::new("http://127.0.0.1:1", local));
        let center = NotificationCenter::new(session, api);
        (dir, center)
    }

    #[test]
    fn starts_with_seeded_announcements() {
        let (_dir, center) = guest_center();
        assert_eq!(center.list().len(), 2);
        assert_eq!(center.unread_count(), 2);
    }

    #[test]
    fn mark_read_is_per_notification() {
        let (_dir, center) = guest_center();
        assert!(center.mark_read("seed-1"));
        assert!(!center.mark_read("nope"));
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn added_notifications_go_on_top() {
        let (_dir, center) = guest_center();
        let added = center.add("Holiday recipes", "Twelve new festive mains.", NotificationKind::Update);
        let list = center.list();
        assert_eq!(list[0].id, added.id);
        assert!(!list[0].read);
    }

    #[tokio::test]
    async fn guest_refresh_keeps_seeds() {
        let (_dir, center) = guest_center();
        center.refresh().await.unwrap();
        assert_eq!(center.list().len(), 2);
    }

    #[test]
    fn email_settings_default_and_update() {
        let (_dir, center) = guest_center();
        let defaults = center.email_settings();
        assert!(defaults.newsletter);
        assert!(!defaults.recipe_updates);

        let updated = center.update_email_settings(|s| s.newsletter = false);
        assert!(!updated.newsletter);
        assert!(!center.email_settings().newsletter);
    }
}
