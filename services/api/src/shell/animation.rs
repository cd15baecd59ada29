//! services/api/src/shell/animation.rs
//!
//! Runs the word-bag simulation as a periodic task tied to the lifetime of the
//! view showing it. Frames are published on a `watch` channel.

use rand::{rngs::StdRng, SeedableRng};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;
use word_pocket_core::word_bag::{Particle, WordBag};

/// Roughly sixty frames a second.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub number: u64,
    pub particles: Vec<Particle>,
    pub overflow: usize,
}

impl Frame {
    fn capture(number: u64, bag: &WordBag) -> Self {
        Self {
            number,
            particles: bag.particles().to_vec(),
            overflow: bag.overflow(),
        }
    }
}

pub struct WordBagAnimation {
    bag: Arc<Mutex<WordBag>>,
    frames: watch::Receiver<Frame>,
    cancellation_token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl WordBagAnimation {
    /// Starts stepping `bag` every `frame_interval`. The task stops when
    /// `view_token` (or the animation's own token) is cancelled, or on drop.
    pub fn start(bag: WordBag, frame_interval: Duration, view_token: &CancellationToken) -> Self {
        let cancellation_token = view_token.child_token();
        let (tx, frames) = watch::channel(Frame::capture(0, &bag));
        let bag = Arc::new(Mutex::new(bag));

        let handle = tokio::spawn(run(
            bag.clone(),
            frame_interval,
            tx,
            cancellation_token.clone(),
        ));

        Self {
            bag,
            frames,
            cancellation_token,
            handle: Some(handle),
        }
    }

    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    pub fn latest(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Toggles slow motion for every particle. The task keeps running.
    pub fn set_hovering(&self, hovering: bool) {
        if let Ok(mut bag) = self.bag.lock() {
            bag.set_hovering(hovering);
        }
    }

    /// The word under the pointer in the current frame.
    pub fn pick(&self, x: f64, y: f64) -> Option<Uuid> {
        self.bag.lock().ok().and_then(|bag| bag.pick(x, y))
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancels the task and waits for it to wind down.
    pub async fn stop(mut self) {
        self.cancellation_token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for WordBagAnimation {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}

async fn run(
    bag: Arc<Mutex<WordBag>>,
    frame_interval: Duration,
    tx: watch::Sender<Frame>,
    cancellation_token: CancellationToken,
) {
    let mut rng = StdRng::from_entropy();
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut number = 0;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            _ = ticker.tick() => {
                number += 1;
                let frame = match bag.lock() {
                    Ok(mut bag) => {
                        bag.step(&mut rng);
                        Frame::capture(number, &bag)
                    }
                    Err(_) => break,
                };
                tx.send_replace(frame);
            }
        }
    }
    debug!(frames = number, "Word bag animation stopped");
}
