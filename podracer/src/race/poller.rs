use super::scheduled_task::{ScheduledTask, TaskError, Tick};
use crate::app::{
    render::{Region, RenderTarget},
    view_builders,
};
use log::*;
use podracer_common::api::{Race, RaceApi, RaceId, RacerId, Track};
use std::sync::Arc;
use tokio::time::Duration;

/// Fetches the race every `period` and renders the leaderboard while it is in progress. Once any
/// other status is seen the results are rendered and the final snapshot is returned. Failed
/// fetches are logged and the next tick tries again.
///
/// Returns `Ok(None)` if the polling was cancelled.
pub async fn poll_until_finished<A: RaceApi, R: RenderTarget>(
    api: Arc<A>,
    renderer: Arc<R>,
    race_id: RaceId,
    player: Option<RacerId>,
    track: Track,
    period: Duration,
) -> Result<Option<Race>, TaskError> {
    info!("Polling race {race_id} every {period:?}");
    let task = ScheduledTask::start(period, period, move || {
        let api = api.clone();
        let renderer = renderer.clone();
        let track = track.clone();
        async move {
            match api.get_race(race_id).await {
                Ok(race) if race.status.is_terminal() => {
                    info!("Race {race_id} ended with status {}", race.status);
                    renderer.render(
                        Region::Race,
                        view_builders::results_view(&race.positions, player),
                    );
                    Tick::Done(race)
                }
                Ok(race) => {
                    renderer.render(
                        Region::LeaderBoard,
                        view_builders::leaderboard_view(&race.positions, player, &track),
                    );
                    Tick::Continue
                }
                Err(e) => {
                    warn!("Failed to get the status of race {race_id}: {e}");
                    Tick::Continue
                }
            }
        }
    });

    task.finished().await
}
