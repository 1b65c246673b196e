use chrono::Utc;
use uuid::Uuid;

use reelfeed_types::{Notification, NotificationKind};

use crate::db::repositories::{NotificationRepository, ReviewRepository};
use crate::db::{Database, StoreError};

/// What happened to a single fan-out delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// One notification event was written.
    Delivered,
    /// Recipient and actor are the same user; nothing was written.
    SkippedSelf,
    /// The target review vanished before delivery; nothing was written.
    MissingTarget,
}

/// Write-side notification fan-out.
///
/// The `notify_*` entry points detach the delivery onto a task of its own:
/// the primary action (reaction, comment, follow) has already succeeded, and
/// its outcome must not depend on whether the notification write goes
/// through. A failed delivery is logged and dropped.
#[derive(Clone)]
pub struct FanoutDispatcher {
    db: Database,
}

impl FanoutDispatcher {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn notify_follow(&self, follower_id: Uuid, followee_id: Uuid) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.deliver_follow(&follower_id, &followee_id) {
                tracing::warn!("follow fan-out failed: {}", e);
            }
        });
    }

    pub fn notify_reaction(&self, review_id: Uuid, reactor_id: Uuid) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.deliver_reaction(&review_id, &reactor_id) {
                tracing::warn!("reaction fan-out failed: {}", e);
            }
        });
    }

    pub fn notify_comment(&self, review_id: Uuid, commenter_id: Uuid) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.deliver_comment(&review_id, &commenter_id) {
                tracing::warn!("comment fan-out failed: {}", e);
            }
        });
    }

    /// Synchronous delivery core for a follow event.
    pub fn deliver_follow(
        &self,
        follower_id: &Uuid,
        followee_id: &Uuid,
    ) -> Result<DeliveryOutcome, StoreError> {
        self.deliver(followee_id, follower_id, NotificationKind::NewFollower, None)
    }

    /// Synchronous delivery core for a reaction event; resolves the review
    /// author as the recipient.
    pub fn deliver_reaction(
        &self,
        review_id: &Uuid,
        reactor_id: &Uuid,
    ) -> Result<DeliveryOutcome, StoreError> {
        let author = ReviewRepository::new(self.db.pool.clone()).get_author(review_id)?;
        match author {
            None => Ok(DeliveryOutcome::MissingTarget),
            Some(recipient) => self.deliver(
                &recipient,
                reactor_id,
                NotificationKind::NewReaction,
                Some(*review_id),
            ),
        }
    }

    /// Synchronous delivery core for a comment event; resolves the review
    /// author as the recipient.
    pub fn deliver_comment(
        &self,
        review_id: &Uuid,
        commenter_id: &Uuid,
    ) -> Result<DeliveryOutcome, StoreError> {
        let author = ReviewRepository::new(self.db.pool.clone()).get_author(review_id)?;
        match author {
            None => Ok(DeliveryOutcome::MissingTarget),
            Some(recipient) => self.deliver(
                &recipient,
                commenter_id,
                NotificationKind::NewComment,
                Some(*review_id),
            ),
        }
    }

    /// Write exactly one event per call. No dedup across repeated identical
    /// actions: toggling a reaction off and on produces two events.
    fn deliver(
        &self,
        recipient_id: &Uuid,
        sender_id: &Uuid,
        kind: NotificationKind,
        review_id: Option<Uuid>,
    ) -> Result<DeliveryOutcome, StoreError> {
        // Never notify a user about their own action
        if recipient_id == sender_id {
            return Ok(DeliveryOutcome::SkippedSelf);
        }

        let notification = Notification {
            id: Uuid::new_v4(),
            recipient_id: *recipient_id,
            sender_id: *sender_id,
            sender_username: String::new(),
            kind,
            review_id,
            created_at: Utc::now(),
            read: false,
        };
        NotificationRepository::new(self.db.pool.clone()).create(&notification)?;
        Ok(DeliveryOutcome::Delivered)
    }
}
