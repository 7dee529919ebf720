// Mirrors the prize record to a Discord channel or user. Deliveries run on a
// separate task and are rate-limited, so mutations never wait for them.
use std::sync::Arc;
use std::time::Duration;

use crossbeam::atomic::AtomicCell;
use serenity::async_trait;
use serenity::builder::{CreateAttachment, CreateMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::commands::prize::manager::PrizePoolManager;
use crate::config::BackupDestination;
use crate::error::Result;

pub const BACKUP_FILE_NAME: &str = "prizes_data.json";

#[async_trait]
pub trait BackupSink: Send + Sync {
    async fn deliver(&self, contents: String) -> Result<()>;
}

pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> Result<String>;
}

impl SnapshotSource for PrizePoolManager {
    fn snapshot(&self) -> Result<String> {
        PrizePoolManager::snapshot(self)
    }
}

// Cheap to clone, every copy feeds the same scheduler.
#[derive(Clone)]
pub struct BackupHandle {
    sender: Option<UnboundedSender<()>>,
    last_delivery: Arc<AtomicCell<Option<Instant>>>,
}

impl BackupHandle {
    pub fn disabled() -> Self {
        BackupHandle {
            sender: None,
            last_delivery: Arc::new(AtomicCell::new(None)),
        }
    }

    // Never blocks. The scheduler decides when the backup is actually sent.
    pub fn request(&self) {
        match &self.sender {
            Some(sender) => {
                if sender.send(()).is_err() {
                    error!("The backup scheduler has stopped, the request is lost");
                }
            }
            None => debug!("Backups are disabled, ignored the request"),
        }
    }

    pub fn last_delivery(&self) -> Option<Instant> {
        self.last_delivery.load()
    }
}

pub struct BackupScheduler {
    source: Arc<dyn SnapshotSource>,
    sink: Arc<dyn BackupSink>,
    cooldown: Duration,
    receiver: UnboundedReceiver<()>,
    last_delivery: Arc<AtomicCell<Option<Instant>>>,
}

impl BackupScheduler {
    // Starts the worker on the current runtime and returns a handle for
    // queueing requests.
    pub fn spawn(
        source: Arc<dyn SnapshotSource>,
        sink: Arc<dyn BackupSink>,
        cooldown: Duration,
    ) -> BackupHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let last_delivery = Arc::new(AtomicCell::new(None));
        let scheduler = BackupScheduler {
            source,
            sink,
            cooldown,
            receiver,
            last_delivery: last_delivery.clone(),
        };

        tokio::spawn(scheduler.run());
        BackupHandle {
            sender: Some(sender),
            last_delivery,
        }
    }

    async fn run(mut self) {
        while self.receiver.recv().await.is_some() {
            if let Some(last) = self.last_delivery.load() {
                let ready_at = last + self.cooldown;
                if Instant::now() < ready_at {
                    debug!("Backup delayed for {:?}", ready_at - Instant::now());
                    tokio::time::sleep_until(ready_at).await;
                }
            }

            // Everything queued so far is covered by the snapshot taken below.
            let mut coalesced = 0;
            while self.receiver.try_recv().is_ok() {
                coalesced += 1;
            }
            if coalesced > 0 {
                debug!("Coalesced {} backup request(s)", coalesced);
            }

            self.deliver().await;
            self.last_delivery.store(Some(Instant::now()));
        }
        debug!("Backup scheduler stopped");
    }

    async fn deliver(&self) {
        let contents = match self.source.snapshot() {
            Ok(contents) => contents,
            Err(err) => {
                error!("Can't take a snapshot for the backup: {}", err);
                return;
            }
        };

        match self.sink.deliver(contents).await {
            Ok(()) => info!("Backup delivered"),
            Err(err) => error!("Can't deliver the backup: {}", err),
        }
    }
}

pub struct DiscordBackupSink {
    http: Arc<Http>,
    destination: BackupDestination,
}

impl DiscordBackupSink {
    pub fn new(http: Arc<Http>, destination: BackupDestination) -> Self {
        DiscordBackupSink { http, destination }
    }
}

#[async_trait]
impl BackupSink for DiscordBackupSink {
    async fn deliver(&self, contents: String) -> Result<()> {
        let channel_id = match self.destination {
            BackupDestination::Channel(channel_id) => ChannelId::new(channel_id),
            BackupDestination::User(user_id) => {
                UserId::new(user_id)
                    .create_dm_channel(self.http.as_ref())
                    .await?
                    .id
            }
        };

        let attachment = CreateAttachment::bytes(contents.into_bytes(), BACKUP_FILE_NAME);
        let message = CreateMessage::new()
            .content("Prize data backup")
            .add_file(attachment);
        channel_id.send_message(self.http.as_ref(), message).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serenity::async_trait;

    use crate::backup::{BackupHandle, BackupScheduler, BackupSink, SnapshotSource};
    use crate::commands::prize::manager::PrizePoolManager;
    use crate::error::{Error, Result};
    use crate::persistence::MemoryStore;

    const COOLDOWN: Duration = Duration::from_secs(60);

    struct CountingSource {
        calls: AtomicU32,
    }

    impl SnapshotSource for CountingSource {
        fn snapshot(&self) -> Result<String> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("snapshot {}", call))
        }
    }

    struct RecordingSink {
        deliveries: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn deliveries(&self) -> Vec<String> {
            self.deliveries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BackupSink for RecordingSink {
        async fn deliver(&self, contents: String) -> Result<()> {
            self.deliveries.lock().unwrap().push(contents);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl BackupSink for FailingSink {
        async fn deliver(&self, _contents: String) -> Result<()> {
            Err(Error::SerenityError("Missing access".to_string()))
        }
    }

    fn start() -> (BackupHandle, Arc<RecordingSink>) {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
        });
        let sink = Arc::new(RecordingSink {
            deliveries: Mutex::new(Vec::new()),
        });
        let handle = BackupScheduler::spawn(source, sink.clone(), COOLDOWN);
        (handle, sink)
    }

    // Lets the scheduler task catch up.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_delivered_immediately() {
        let (handle, sink) = start();

        handle.request();
        settle().await;

        assert_eq!(sink.deliveries(), vec!["snapshot 1".to_string()]);
        assert_eq!(handle.last_delivery().is_some(), true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_inside_cooldown_is_delayed_not_dropped() {
        let (handle, sink) = start();

        handle.request();
        settle().await;
        handle.request();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sink.deliveries().len(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(sink.deliveries().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_requests_are_coalesced() {
        let (handle, sink) = start();

        handle.request();
        settle().await;
        handle.request();
        handle.request();
        handle.request();

        tokio::time::sleep(COOLDOWN + Duration::from_secs(1)).await;
        assert_eq!(
            sink.deliveries(),
            vec!["snapshot 1".to_string(), "snapshot 2".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_delivery_keeps_scheduler_running() {
        let source = Arc::new(CountingSource {
            calls: AtomicU32::new(0),
        });
        let handle = BackupScheduler::spawn(source.clone(), Arc::new(FailingSink), COOLDOWN);

        handle.request();
        settle().await;
        handle.request();
        tokio::time::sleep(COOLDOWN + Duration::from_secs(1)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manager_snapshot_is_delivered() {
        let manager = Arc::new(PrizePoolManager::new(Arc::new(MemoryStore::new())));
        manager.add_prizes("Keyboard:2").unwrap();
        let sink = Arc::new(RecordingSink {
            deliveries: Mutex::new(Vec::new()),
        });
        let handle = BackupScheduler::spawn(manager.clone(), sink.clone(), COOLDOWN);

        handle.request();
        settle().await;

        assert_eq!(sink.deliveries(), vec![manager.snapshot().unwrap()]);
    }

    #[test]
    fn test_disabled_handle_ignores_requests() {
        let handle = BackupHandle::disabled();

        handle.request();
        assert_eq!(handle.last_delivery(), None);
    }
}
