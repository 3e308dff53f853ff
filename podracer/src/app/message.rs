use crate::race::RaceOutcome;
use podracer_common::api::{RaceId, RacerId, TrackId};

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    SelectTrack(TrackId),
    SelectRacer(RacerId),
    Submit,
    Accelerate,
    Quit,
    InvalidInput(String),
    RaceCreated(RaceId),
    RaceEnded(RaceOutcome),
}

/// The actions a user can take, independent of how they are entered
pub trait UiEvents {
    fn on_select_track(&mut self, id: TrackId);

    fn on_select_racer(&mut self, id: RacerId);

    fn on_submit(&mut self);

    fn on_accelerate(&mut self);
}
