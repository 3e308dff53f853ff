use crate::race::{RaceDriver, RaceOutcome};
use log::*;
use podracer_common::{
    api::{RaceApi, RacerId, TrackId},
    config::Race as RaceSettings,
};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};

pub mod input;
pub mod message;
pub mod render;
pub mod store;
pub mod view_builders;

use message::{Message, UiEvents};
use render::{Region, RenderTarget};
use store::{Catalog, Store};

const CHANNEL_LEN: usize = 16;

/// Owns the selection state and reacts to user input and race progress
pub struct PodRacerApp<A, R> {
    api: Arc<A>,
    renderer: Arc<R>,
    settings: RaceSettings,
    store: Store,
    catalog: Catalog,
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
    race_task: Option<JoinHandle<()>>,
}

impl<A: RaceApi, R: RenderTarget> PodRacerApp<A, R> {
    pub fn new(api: Arc<A>, renderer: Arc<R>, settings: RaceSettings) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_LEN);
        Self {
            api,
            renderer,
            settings,
            store: Store::default(),
            catalog: Catalog::default(),
            tx,
            rx,
            race_task: None,
        }
    }

    pub fn sender(&self) -> mpsc::Sender<Message> {
        self.tx.clone()
    }

    pub fn store(&self) -> Store {
        self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Stays `true` until the race's `RaceEnded` has been handled, even if its task is done
    pub fn is_racing(&self) -> bool {
        self.race_task.is_some()
    }

    /// Fetches the tracks and racers and renders both catalogs
    pub async fn load(&mut self) {
        let (tracks, racers) = futures::join!(self.api.get_tracks(), self.api.get_racers());

        match tracks {
            Ok(tracks) => self.catalog.tracks = tracks,
            Err(e) => error!("Problem getting tracks: {e}"),
        }
        match racers {
            Ok(racers) => self.catalog.racers = racers,
            Err(e) => error!("Problem getting racers: {e}"),
        }

        self.render_tracks();
        self.render_racers();
    }

    pub async fn next_message(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Processes messages until a `Quit` arrives, then returns the final selection state
    pub async fn run(mut self) -> Store {
        info!("Waiting for input");
        while let Some(message) = self.next_message().await {
            if !self.update(message) {
                break;
            }
        }
        self.store
    }

    /// Returns `false` once the app should stop
    pub fn update(&mut self, message: Message) -> bool {
        trace!("Handling {message:?}");
        match message {
            Message::SelectTrack(id) => self.on_select_track(id),
            Message::SelectRacer(id) => self.on_select_racer(id),
            Message::Submit => self.on_submit(),
            Message::Accelerate => self.on_accelerate(),
            Message::InvalidInput(reason) => self.renderer.render(Region::Error, reason),
            Message::RaceCreated(race_id) => {
                self.store = self.store.with_race(Some(race_id));
            }
            Message::RaceEnded(outcome) => {
                match outcome {
                    RaceOutcome::Finished(_) => info!("Race finished"),
                    RaceOutcome::CreateFailed => warn!("The race could not be created"),
                    RaceOutcome::Cancelled => warn!("The race was cancelled"),
                }
                self.store = self.store.with_race(None);
                self.race_task = None;
            }
            Message::Quit => {
                info!("Quitting");
                if let Some(task) = self.race_task.take() {
                    task.abort();
                }
                return false;
            }
        }
        true
    }

    fn render_tracks(&self) {
        self.renderer.render(
            Region::Tracks,
            view_builders::tracks_view(&self.catalog.tracks, self.store.track_id()),
        );
    }

    fn render_racers(&self) {
        self.renderer.render(
            Region::Racers,
            view_builders::racers_view(&self.catalog.racers, self.store.player_id()),
        );
    }
}

impl<A: RaceApi, R: RenderTarget> UiEvents for PodRacerApp<A, R> {
    fn on_select_track(&mut self, id: TrackId) {
        match self.catalog.select_track(self.store, id) {
            Ok(store) => {
                debug!("Selected track {id}");
                self.store = store;
                self.render_tracks();
            }
            Err(e) => {
                warn!("Track selection rejected: {e}");
                self.renderer.render(Region::Error, e.to_string());
            }
        }
    }

    fn on_select_racer(&mut self, id: RacerId) {
        match self.catalog.select_racer(self.store, id) {
            Ok(store) => {
                debug!("Selected racer {id}");
                self.store = store;
                self.render_racers();
            }
            Err(e) => {
                warn!("Racer selection rejected: {e}");
                self.renderer.render(Region::Error, e.to_string());
            }
        }
    }

    fn on_submit(&mut self) {
        if self.is_racing() {
            warn!("Ignoring submit, a race is already running");
            return;
        }

        let (player_id, track_id) = match self.store.race_request() {
            Ok(request) => request,
            Err(e) => {
                warn!("Not creating a race: {e}");
                self.renderer.render(Region::Error, e.to_string());
                return;
            }
        };

        info!("Creating a race for racer {player_id} on track {track_id}");
        let driver = RaceDriver::new(
            self.api.clone(),
            self.renderer.clone(),
            self.settings.clone(),
            self.tx.clone(),
        );
        let tx = self.tx.clone();
        self.race_task = Some(tokio::spawn(async move {
            let outcome = driver.run(player_id, track_id).await;
            if tx.send(Message::RaceEnded(outcome)).await.is_err() {
                warn!("Race ended after the app stopped");
            }
        }));
    }

    fn on_accelerate(&mut self) {
        let Some(race_id) = self.store.race_id() else {
            debug!("No race to accelerate in");
            return;
        };

        let api = self.api.clone();
        tokio::spawn(async move {
            if let Err(e) = api.accelerate(race_id).await {
                warn!("Failed to accelerate in race {race_id}: {e}");
            }
        });
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support::{CREATED_RACE_ID, Call, FakeApi, RecordingRenderer, race};
    use podracer_common::api::RaceStatus;
    use store::SelectError;
    use tokio::time::{Duration, sleep};

    type TestApp = PodRacerApp<FakeApi, RecordingRenderer>;

    fn race_id() -> podracer_common::api::RaceId {
        CREATED_RACE_ID.with_offset(RaceSettings::default().race_id_offset)
    }

    fn create_calls(api: &FakeApi) -> usize {
        api.calls()
            .iter()
            .filter(|c| matches!(c, Call::CreateRace(..)))
            .count()
    }

    async fn loaded_app(api: FakeApi) -> (TestApp, Arc<FakeApi>, Arc<RecordingRenderer>) {
        let api = Arc::new(api);
        let renderer = Arc::new(RecordingRenderer::default());
        let mut app = PodRacerApp::new(api.clone(), renderer.clone(), RaceSettings::default());
        app.load().await;
        (app, api, renderer)
    }

    #[tokio::test]
    async fn test_load() {
        let (app, api, renderer) = loaded_app(FakeApi::with_catalog()).await;

        assert_eq!(app.catalog().tracks.len(), 2);
        assert_eq!(app.catalog().racers.len(), 2);
        assert_eq!(api.calls(), vec![Call::GetTracks, Call::GetRacers]);
        assert!(renderer.rendered(Region::Tracks)[0].contains("Track 2"));
        assert!(renderer.rendered(Region::Racers)[0].contains("Racer 4"));
    }

    #[tokio::test]
    async fn test_load_failure_shows_placeholders() {
        let api = FakeApi::with_catalog();
        api.fail_catalog();
        let (app, _, renderer) = loaded_app(api).await;

        assert!(app.catalog().tracks.is_empty());
        assert_eq!(
            renderer.rendered(Region::Tracks),
            vec![view_builders::LOADING_TRACKS]
        );
        assert_eq!(
            renderer.rendered(Region::Racers),
            vec![view_builders::LOADING_RACERS]
        );
        assert!(renderer.rendered(Region::Error).is_empty());
    }

    #[tokio::test]
    async fn test_selection_moves_marker() {
        let (mut app, _, renderer) = loaded_app(FakeApi::with_catalog()).await;

        app.on_select_track(TrackId(1));
        app.on_select_track(TrackId(2));

        let latest = renderer.rendered(Region::Tracks).pop().unwrap();
        let marked: Vec<_> = latest.lines().filter(|l| l.contains('>')).collect();
        assert_eq!(marked.len(), 1);
        assert!(marked[0].contains("Track 2"));
        assert_eq!(app.store().track_id(), Some(TrackId(2)));
    }

    #[tokio::test]
    async fn test_unknown_selection_keeps_store() {
        let (mut app, _, renderer) = loaded_app(FakeApi::with_catalog()).await;

        app.on_select_racer(RacerId(4));
        app.on_select_racer(RacerId(99));

        assert_eq!(app.store().player_id(), Some(RacerId(4)));
        assert_eq!(
            renderer.rendered(Region::Error),
            vec![SelectError::UnknownRacer(RacerId(99)).to_string()]
        );
    }

    #[tokio::test]
    async fn test_submit_without_selection() {
        let (mut app, api, renderer) = loaded_app(FakeApi::with_catalog()).await;

        app.on_submit();
        app.on_select_track(TrackId(1));
        app.on_submit();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(
            renderer.rendered(Region::Error),
            vec![SelectError::MissingSelection.to_string(); 2]
        );
        assert_eq!(api.calls(), vec![Call::GetTracks, Call::GetRacers]);
        assert!(!app.is_racing());
    }

    #[tokio::test]
    async fn test_accelerate_without_race() {
        let (mut app, api, _) = loaded_app(FakeApi::with_catalog()).await;

        app.on_accelerate();
        sleep(Duration::from_millis(10)).await;

        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_lifecycle() {
        let api = FakeApi::with_catalog();
        api.push_race(race(RaceStatus::InProgress, &[(1, 2, None), (4, 3, None)]));
        api.push_race(race(RaceStatus::InProgress, &[(1, 5, None), (4, 6, None)]));
        api.push_race(race(
            RaceStatus::Finished,
            &[(1, 10, Some(2)), (4, 10, Some(1))],
        ));
        let (mut app, api, renderer) = loaded_app(api).await;

        assert!(app.update(Message::SelectTrack(TrackId(2))));
        assert!(app.update(Message::SelectRacer(RacerId(4))));
        assert!(app.update(Message::Submit));
        assert!(app.is_racing());

        let created = app.next_message().await.unwrap();
        assert_eq!(created, Message::RaceCreated(race_id()));
        app.update(created);
        assert_eq!(app.store().race_id(), Some(race_id()));

        // A second submit while racing is ignored
        app.update(Message::Submit);
        app.update(Message::Accelerate);
        app.update(Message::Accelerate);

        let ended = app.next_message().await.unwrap();
        assert!(matches!(
            ended,
            Message::RaceEnded(RaceOutcome::Finished(_))
        ));
        app.update(ended);

        assert_eq!(app.store().race_id(), None);
        assert_eq!(app.store().track_id(), Some(TrackId(2)));
        assert!(!app.is_racing());

        assert_eq!(create_calls(&api), 1);
        assert_eq!(
            api.calls()
                .iter()
                .filter(|c| **c == Call::Accelerate(race_id()))
                .count(),
            2
        );
        let results = renderer.rendered(Region::Race).pop().unwrap();
        assert!(results.contains("Racer 4 (you)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_cancels_race() {
        let api = FakeApi::with_catalog();
        api.push_race(race(RaceStatus::InProgress, &[(4, 1, None)]));
        let (mut app, api, _) = loaded_app(api).await;

        app.update(Message::SelectTrack(TrackId(1)));
        app.update(Message::SelectRacer(RacerId(4)));
        app.update(Message::Submit);
        let created = app.next_message().await.unwrap();
        app.update(created);

        // Let the countdown finish and a few polls happen
        sleep(Duration::from_secs(8)).await;
        assert!(api.calls().contains(&Call::GetRace(race_id())));

        assert!(!app.update(Message::Quit));
        sleep(Duration::from_secs(1)).await;
        let calls = api.calls().len();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(api.calls().len(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_race_blocks_submit_until_handled() {
        let api = FakeApi::with_catalog();
        api.push_race(race(RaceStatus::Finished, &[(4, 10, Some(1))]));
        let (mut app, api, _) = loaded_app(api).await;

        app.update(Message::SelectTrack(TrackId(1)));
        app.update(Message::SelectRacer(RacerId(4)));
        app.update(Message::Submit);

        // The race runs to completion, its messages wait in the queue
        sleep(Duration::from_secs(10)).await;
        app.update(Message::Submit);
        assert!(app.is_racing());
        assert_eq!(create_calls(&api), 1);

        let created = app.next_message().await.unwrap();
        assert_eq!(created, Message::RaceCreated(race_id()));
        app.update(created);
        let ended = app.next_message().await.unwrap();
        assert!(matches!(ended, Message::RaceEnded(RaceOutcome::Finished(_))));
        app.update(ended);
        assert!(!app.is_racing());
        assert_eq!(app.store().race_id(), None);

        app.update(Message::Submit);
        assert!(app.is_racing());
        let created = app.next_message().await.unwrap();
        assert_eq!(created, Message::RaceCreated(race_id()));
        assert_eq!(create_calls(&api), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accelerate_failure_is_only_logged() {
        let api = FakeApi::with_catalog();
        api.push_race(race(RaceStatus::InProgress, &[(4, 1, None)]));
        api.fail_accelerate();
        let (mut app, api, renderer) = loaded_app(api).await;

        app.update(Message::SelectTrack(TrackId(1)));
        app.update(Message::SelectRacer(RacerId(4)));
        app.update(Message::Submit);
        let created = app.next_message().await.unwrap();
        app.update(created);

        app.update(Message::Accelerate);
        sleep(Duration::from_millis(10)).await;

        assert!(api.calls().contains(&Call::Accelerate(race_id())));
        assert!(app.is_racing());
        assert_eq!(app.store().race_id(), Some(race_id()));
        assert!(renderer.rendered(Region::Error).is_empty());
    }

    #[tokio::test]
    async fn test_run_until_quit() {
        let (app, _, renderer) = loaded_app(FakeApi::with_catalog()).await;
        let tx = app.sender();

        tx.send(Message::SelectTrack(TrackId(1))).await.unwrap();
        tx.send(Message::InvalidInput("bad input".to_string()))
            .await
            .unwrap();
        tx.send(Message::Quit).await.unwrap();

        let store = app.run().await;
        assert_eq!(store.track_id(), Some(TrackId(1)));
        assert_eq!(renderer.rendered(Region::Error), vec!["bad input"]);
    }
}
