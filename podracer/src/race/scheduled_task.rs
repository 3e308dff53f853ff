use futures::future::FutureExt;
use log::*;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use thiserror::Error;
use tokio::{
    task::{self, JoinError, JoinHandle},
    time::{Duration, Instant, MissedTickBehavior, interval_at},
};

/// What a scheduled task should do after a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick<T> {
    Continue,
    Done(T),
}

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("The scheduled task failed: {0}")]
    Failed(#[from] JoinError),
}

/// A periodic task running on the tokio runtime.
///
/// The tick function runs once per `period`, starting after `delay`. A tick that takes longer
/// than `period` pushes the following ticks back rather than bunching them up. The task ends when
/// a tick returns `Tick::Done`, when it is cancelled, or when the `ScheduledTask` (or the future
/// returned by `finished`) is dropped.
#[derive(Debug)]
pub struct ScheduledTask<T> {
    join: AbortOnDrop<T>,
}

impl<T: Send + 'static> ScheduledTask<T> {
    pub fn start<F, Fut>(delay: Duration, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Tick<T>> + Send + 'static,
    {
        let join = task::spawn(async move {
            let mut interval = interval_at(Instant::now() + delay, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Tick::Done(value) = tick().await {
                    return value;
                }
            }
        });

        Self {
            join: AbortOnDrop(join),
        }
    }

    pub fn cancel(&self) {
        trace!("Cancelling scheduled task");
        self.join.0.abort();
    }

    /// Resolves once the task ends. A cancelled task resolves to `Ok(None)`.
    pub async fn finished(self) -> Result<Option<T>, TaskError> {
        match self.join.await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => Err(TaskError::from(e)),
        }
    }
}

#[derive(Debug)]
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Future for AbortOnDrop<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.poll_unpin(cx)
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}
