use podracer_common::api::{RaceId, Racer, RacerId, Track, TrackId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("There is no track with id {0}")]
    UnknownTrack(TrackId),
    #[error("There is no racer with id {0}")]
    UnknownRacer(RacerId),
    #[error("Please select a track and a racer before starting the race")]
    MissingSelection,
}

/// The client's selection state. Every update produces a new `Store`, the previous one is left
/// untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Store {
    track_id: Option<TrackId>,
    player_id: Option<RacerId>,
    race_id: Option<RaceId>,
}

impl Store {
    pub fn track_id(&self) -> Option<TrackId> {
        self.track_id
    }

    pub fn player_id(&self) -> Option<RacerId> {
        self.player_id
    }

    pub fn race_id(&self) -> Option<RaceId> {
        self.race_id
    }

    pub fn with_track(self, track_id: TrackId) -> Self {
        Self {
            track_id: Some(track_id),
            ..self
        }
    }

    pub fn with_player(self, player_id: RacerId) -> Self {
        Self {
            player_id: Some(player_id),
            ..self
        }
    }

    pub fn with_race(self, race_id: Option<RaceId>) -> Self {
        Self { race_id, ..self }
    }

    /// The player and track needed to create a race, if both have been chosen
    pub fn race_request(&self) -> Result<(RacerId, TrackId), SelectError> {
        match (self.player_id, self.track_id) {
            (Some(player_id), Some(track_id)) => Ok((player_id, track_id)),
            _ => Err(SelectError::MissingSelection),
        }
    }
}

/// Tracks and racers as loaded from the server at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub tracks: Vec<Track>,
    pub racers: Vec<Racer>,
}

impl Catalog {
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn racer(&self, id: RacerId) -> Option<&Racer> {
        self.racers.iter().find(|r| r.id == id)
    }

    pub fn select_track(&self, store: Store, id: TrackId) -> Result<Store, SelectError> {
        self.track(id)
            .map(|_| store.with_track(id))
            .ok_or(SelectError::UnknownTrack(id))
    }

    pub fn select_racer(&self, store: Store, id: RacerId) -> Result<Store, SelectError> {
        self.racer(id)
            .map(|_| store.with_player(id))
            .ok_or(SelectError::UnknownRacer(id))
    }
}
