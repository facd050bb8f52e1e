//! Server-side debounce for editor autosave.
//!
//! Each edit of an existing post bumps that post's generation and waits out the debounce window.
//! Only the edit still holding the newest generation when its window closes is written upstream;
//! older ones report [`AutosaveOutcome::Superseded`]. Writes for one post are serialised behind a
//! per-post lock, which is also what [`Autosaver::discard_pending`] waits on.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use metrics::{counter, gauge};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::admin::posts::{AdminPostService, PostForm};
use crate::application::repos::AccessToken;
use crate::domain::posts::{CLOCK_FORMAT, format_date};
use crate::infra::telemetry::{AUTOSAVE_FLUSH_TOTAL, AUTOSAVE_PENDING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveOutcome {
    Saved { at: OffsetDateTime },
    Superseded,
    Failed(String),
}

impl AutosaveOutcome {
    /// `HH:MM:SS` of a successful save.
    pub fn clock(&self) -> Option<String> {
        match self {
            Self::Saved { at } => Some(format_date(Some(*at), CLOCK_FORMAT)),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct Autosaver {
    posts: AdminPostService,
    debounce: Duration,
    generations: Arc<DashMap<Uuid, u64>>,
    writes: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
    next_generation: Arc<AtomicU64>,
}

impl Autosaver {
    pub fn new(posts: AdminPostService, debounce: Duration) -> Self {
        Self {
            posts,
            debounce,
            generations: Arc::new(DashMap::new()),
            writes: Arc::new(DashMap::new()),
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Queue `form` as the latest state of post `id` and wait for the debounce to settle.
    ///
    /// The flush runs on its own task, so a closed connection does not drop the save.
    pub async fn schedule(&self, token: AccessToken, id: Uuid, form: PostForm) -> AutosaveOutcome {
        let generation = self.bump(id);
        gauge!(AUTOSAVE_PENDING).increment(1.0);
        debug!(
            target = "quire::application::autosave",
            post_id = %id,
            generation,
            "autosave queued"
        );

        let this = self.clone();
        let task = tokio::spawn(async move { this.flush(token, id, form, generation).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    target = "quire::application::autosave",
                    post_id = %id,
                    error = %err,
                    "autosave task aborted"
                );
                AutosaveOutcome::Failed("autosave was interrupted".to_string())
            }
        }
    }

    async fn flush(
        &self,
        token: AccessToken,
        id: Uuid,
        form: PostForm,
        generation: u64,
    ) -> AutosaveOutcome {
        tokio::time::sleep(self.debounce).await;
        gauge!(AUTOSAVE_PENDING).decrement(1.0);

        let lock = self.write_lock(id);
        let outcome = {
            let _write = lock.lock().await;
            self.write_if_current(&token, id, &form, generation).await
        };
        drop(lock);
        self.release_write_lock(id);
        outcome
    }

    async fn write_if_current(
        &self,
        token: &AccessToken,
        id: Uuid,
        form: &PostForm,
        generation: u64,
    ) -> AutosaveOutcome {
        if !self.is_current(id, generation) {
            counter!(AUTOSAVE_FLUSH_TOTAL, "outcome" => "superseded").increment(1);
            debug!(
                target = "quire::application::autosave",
                post_id = %id,
                generation,
                "autosave superseded by a newer edit"
            );
            return AutosaveOutcome::Superseded;
        }

        let result = self.posts.save_draft_silently(token, id, form).await;
        self.generations
            .remove_if(&id, |_, current| *current == generation);

        match result {
            Ok(_) => {
                counter!(AUTOSAVE_FLUSH_TOTAL, "outcome" => "saved").increment(1);
                debug!(
                    target = "quire::application::autosave",
                    post_id = %id,
                    generation,
                    "autosave flushed"
                );
                AutosaveOutcome::Saved {
                    at: OffsetDateTime::now_utc(),
                }
            }
            Err(err) => {
                counter!(AUTOSAVE_FLUSH_TOTAL, "outcome" => "failed").increment(1);
                warn!(
                    target = "quire::application::autosave",
                    post_id = %id,
                    error = %err,
                    "autosave failed"
                );
                AutosaveOutcome::Failed(err.to_string())
            }
        }
    }

    fn write_lock(&self, id: Uuid) -> Arc<Mutex<()>> {
        Arc::clone(self.writes.entry(id).or_default().value())
    }

    /// Drops the lock for `id` once no flush or discard holds a handle to it.
    fn release_write_lock(&self, id: Uuid) {
        self.writes
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Generations are unique across posts and never reused, so a discarded edit can not be
    /// mistaken for a later one.
    fn bump(&self, id: Uuid) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        self.generations.insert(id, generation);
        generation
    }

    /// Forget any edit of `id` still inside its window and wait for a write already in flight.
    /// Called before an explicit save so an older autosave cannot land on top of it.
    pub async fn discard_pending(&self, id: Uuid) {
        if self.generations.remove(&id).is_some() {
            debug!(
                target = "quire::application::autosave",
                post_id = %id,
                "pending autosave discarded"
            );
        }

        let lock = self.write_lock(id);
        drop(lock.lock().await);
        drop(lock);
        self.release_write_lock(id);
    }

    fn is_current(&self, id: Uuid, generation: u64) -> bool {
        self.generations
            .get(&id)
            .is_some_and(|current| *current == generation)
    }

    /// Posts with an edit still inside its debounce window or mid-save.
    pub fn pending_posts(&self) -> usize {
        self.generations.len()
    }
}
