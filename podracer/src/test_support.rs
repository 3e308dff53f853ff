use crate::app::render::{Region, RenderTarget};
use podracer_common::api::{
    ApiError, CreatedRace, Race, RaceApi, RaceId, RacePosition, RaceStatus, Racer, RacerId,
    StatusCode, Track, TrackId,
};
use std::{
    collections::VecDeque,
    future::{Future, ready},
    sync::Mutex,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetTracks,
    GetRacers,
    CreateRace(RacerId, TrackId),
    GetRace(RaceId),
    StartRace(RaceId),
    Accelerate(RaceId),
}

#[derive(Debug, Default)]
struct FakeState {
    tracks: Vec<Track>,
    racers: Vec<Racer>,
    races: VecDeque<Race>,
    calls: Vec<Call>,
    fail_catalog: bool,
    fail_create: bool,
    fail_start: bool,
    fail_accelerate: bool,
    failing_get_races: usize,
}

/// An in-memory race server. Race snapshots are handed out in the order they were pushed, the
/// last one is repeated forever.
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

pub const CREATED_RACE_ID: RaceId = RaceId(7);

pub fn track(id: u32) -> Track {
    Track {
        id: TrackId(id),
        name: format!("Track {id}"),
        segments: vec![100; 10],
    }
}

pub fn racer(id: u32) -> Racer {
    Racer {
        id: RacerId(id),
        driver_name: format!("Racer {id}"),
        top_speed: 500.0,
        acceleration: 10.0,
        handling: 10.0,
    }
}

/// A race snapshot from `(racer id, segment, final position)` triples
pub fn race(status: RaceStatus, positions: &[(u32, u32, Option<u32>)]) -> Race {
    Race {
        id: None,
        status,
        positions: positions
            .iter()
            .map(|&(id, segment, final_position)| RacePosition {
                id: RacerId(id),
                driver_name: format!("Racer {id}"),
                segment,
                final_position,
            })
            .collect(),
    }
}

fn server_error(what: &str) -> ApiError {
    ApiError::Status {
        url: format!("http://fake/api/{what}"),
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "fake failure".to_string(),
    }
}

impl FakeApi {
    pub fn with_catalog() -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            state.tracks = vec![track(1), track(2)];
            state.racers = vec![racer(1), racer(4)];
        }
        api
    }

    pub fn push_race(&self, race: Race) {
        self.state.lock().unwrap().races.push_back(race);
    }

    pub fn fail_catalog(&self) {
        self.state.lock().unwrap().fail_catalog = true;
    }

    pub fn fail_create(&self) {
        self.state.lock().unwrap().fail_create = true;
    }

    pub fn fail_start(&self) {
        self.state.lock().unwrap().fail_start = true;
    }

    pub fn fail_accelerate(&self) {
        self.state.lock().unwrap().fail_accelerate = true;
    }

    pub fn fail_next_get_races(&self, count: usize) {
        self.state.lock().unwrap().failing_get_races = count;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

impl RaceApi for FakeApi {
    fn get_tracks(&self) -> impl Future<Output = Result<Vec<Track>, ApiError>> + Send + 'static {
        let state = self.record(Call::GetTracks);
        ready(if state.fail_catalog {
            Err(server_error("tracks"))
        } else {
            Ok(state.tracks.clone())
        })
    }

    fn get_racers(&self) -> impl Future<Output = Result<Vec<Racer>, ApiError>> + Send + 'static {
        let state = self.record(Call::GetRacers);
        ready(if state.fail_catalog {
            Err(server_error("cars"))
        } else {
            Ok(state.racers.clone())
        })
    }

    fn create_race(
        &self,
        player_id: RacerId,
        track_id: TrackId,
    ) -> impl Future<Output = Result<CreatedRace, ApiError>> + Send + 'static {
        let state = self.record(Call::CreateRace(player_id, track_id));
        ready(if state.fail_create {
            Err(server_error("races"))
        } else {
            Ok(CreatedRace {
                id: CREATED_RACE_ID,
                track: track(track_id.0),
                player_id: Some(player_id),
            })
        })
    }

    fn get_race(
        &self,
        id: RaceId,
    ) -> impl Future<Output = Result<Race, ApiError>> + Send + 'static {
        let mut state = self.record(Call::GetRace(id));
        let result = if state.failing_get_races > 0 {
            state.failing_get_races -= 1;
            Err(server_error("races/id"))
        } else if state.races.len() > 1 {
            Ok(state.races.pop_front().unwrap())
        } else {
            state
                .races
                .front()
                .cloned()
                .ok_or_else(|| server_error("races/id"))
        };
        ready(result)
    }

    fn start_race(&self, id: RaceId) -> impl Future<Output = Result<(), ApiError>> + Send + 'static {
        let state = self.record(Call::StartRace(id));
        ready(if state.fail_start {
            Err(server_error("races/id/start"))
        } else {
            Ok(())
        })
    }

    fn accelerate(&self, id: RaceId) -> impl Future<Output = Result<(), ApiError>> + Send + 'static {
        let state = self.record(Call::Accelerate(id));
        ready(if state.fail_accelerate {
            Err(server_error("races/id/accelerate"))
        } else {
            Ok(())
        })
    }
}

/// Keeps every render in order
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    renders: Mutex<Vec<(Region, String)>>,
}

impl RecordingRenderer {
    pub fn all(&self) -> Vec<(Region, String)> {
        self.renders.lock().unwrap().clone()
    }

    pub fn rendered(&self, region: Region) -> Vec<String> {
        self.renders
            .lock()
            .unwrap()
            .iter()
            .filter(|(r, _)| *r == region)
            .map(|(_, content)| content.clone())
            .collect()
    }
}

impl RenderTarget for RecordingRenderer {
    fn render(&self, region: Region, content: String) {
        self.renders.lock().unwrap().push((region, content));
    }
}
