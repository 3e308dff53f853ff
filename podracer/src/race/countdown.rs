use super::scheduled_task::{ScheduledTask, TaskError, Tick};
use crate::app::render::{Region, RenderTarget};
use log::*;
use std::sync::Arc;
use tokio::time::Duration;

/// Shows `from`, `from - 1`, ..., `0` in the big numbers region, one value per `period`, and
/// resolves one period after `0` was shown. The first value appears one period after `lead_in`
/// has passed.
pub async fn run_countdown<R: RenderTarget>(
    renderer: Arc<R>,
    from: u8,
    lead_in: Duration,
    period: Duration,
) -> Result<(), TaskError> {
    debug!("Starting countdown from {from}");
    let mut next = Some(from);
    let task = ScheduledTask::start(lead_in + period, period, move || {
        let tick = match next {
            Some(value) => {
                renderer.render(Region::BigNumbers, value.to_string());
                next = value.checked_sub(1);
                Tick::Continue
            }
            None => Tick::Done(()),
        };
        std::future::ready(tick)
    });

    if task.finished().await?.is_none() {
        warn!("Countdown was cancelled");
    }
    Ok(())
}
