use crate::app::{
    message::Message,
    render::{Region, RenderTarget},
    view_builders,
};
use log::*;
use podracer_common::{
    api::{Race, RaceApi, RacerId, TrackId},
    config::Race as RaceSettings,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub mod countdown;
pub mod poller;
pub mod scheduled_task;

#[derive(Debug, Clone, PartialEq)]
pub enum RaceOutcome {
    Finished(Race),
    CreateFailed,
    Cancelled,
}

/// Runs one race from creation to results: create, show the start view, count down, start, then
/// poll until the race ends. Failures are logged and never retried.
pub struct RaceDriver<A, R> {
    api: Arc<A>,
    renderer: Arc<R>,
    settings: RaceSettings,
    tx: mpsc::Sender<Message>,
}

impl<A: RaceApi, R: RenderTarget> RaceDriver<A, R> {
    pub fn new(
        api: Arc<A>,
        renderer: Arc<R>,
        settings: RaceSettings,
        tx: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            api,
            renderer,
            settings,
            tx,
        }
    }

    pub async fn run(self, player_id: RacerId, track_id: TrackId) -> RaceOutcome {
        let created = match self.api.create_race(player_id, track_id).await {
            Ok(created) => created,
            Err(e) => {
                error!("Failed to create a race for racer {player_id} on track {track_id}: {e}");
                return RaceOutcome::CreateFailed;
            }
        };

        let race_id = created.id.with_offset(self.settings.race_id_offset);
        if self.tx.send(Message::RaceCreated(race_id)).await.is_err() {
            warn!("Nobody is listening for race {race_id}");
        }

        self.renderer.render(
            Region::Race,
            view_builders::race_start_view(&created.track, self.settings.countdown_from),
        );

        if let Err(e) = countdown::run_countdown(
            self.renderer.clone(),
            self.settings.countdown_from,
            self.settings.countdown_lead_in(),
            self.settings.countdown_period(),
        )
        .await
        {
            error!("Countdown for race {race_id} failed: {e}");
        }

        if let Err(e) = self.api.start_race(race_id).await {
            error!("Failed to start race {race_id}: {e}");
        }

        match poller::poll_until_finished(
            self.api.clone(),
            self.renderer.clone(),
            race_id,
            Some(player_id),
            created.track,
            self.settings.poll_interval(),
        )
        .await
        {
            Ok(Some(race)) => RaceOutcome::Finished(race),
            Ok(None) => RaceOutcome::Cancelled,
            Err(e) => {
                error!("Polling race {race_id} failed: {e}");
                RaceOutcome::Cancelled
            }
        }
    }
}
