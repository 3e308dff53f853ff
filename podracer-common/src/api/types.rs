use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, num::ParseIntError, str::FromStr};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(TrackId);
id_type!(
    /// Racers are called "cars" by the backend and "pods" by players
    RacerId
);
id_type!(RaceId);

impl RaceId {
    /// Applies the configured offset between the id returned on creation and the id the
    /// backend expects in race URLs.
    pub fn with_offset(self, offset: u32) -> Self {
        Self(self.0.saturating_sub(offset))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(default)]
    pub segments: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Racer {
    pub id: RacerId,
    pub driver_name: String,
    #[serde(default)]
    pub top_speed: f64,
    #[serde(default)]
    pub acceleration: f64,
    #[serde(default)]
    pub handling: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceStatus {
    Unstarted,
    InProgress,
    Finished,
    Unknown(String),
}

impl RaceStatus {
    /// Only `in-progress` keeps a race running, every other status ends polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl From<&str> for RaceStatus {
    fn from(s: &str) -> Self {
        match s {
            "unstarted" => Self::Unstarted,
            "in-progress" => Self::InProgress,
            "finished" => Self::Finished,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for RaceStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(|s| Self::from(s.as_str()))
    }
}

impl Serialize for RaceStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unstarted => write!(f, "unstarted"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Finished => write!(f, "finished"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RacePosition {
    pub id: RacerId,
    pub driver_name: String,
    #[serde(default)]
    pub segment: u32,
    #[serde(default)]
    pub final_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    #[serde(default)]
    pub id: Option<RaceId>,
    pub status: RaceStatus,
    #[serde(default)]
    pub positions: Vec<RacePosition>,
}

/// Response to a race creation request. The backend uses PascalCase keys here only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRace {
    #[serde(rename = "ID")]
    pub id: RaceId,
    #[serde(rename = "Track")]
    pub track: Track,
    #[serde(rename = "PlayerID", default)]
    pub player_id: Option<RacerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRaceRequest {
    pub player_id: RacerId,
    pub track_id: TrackId,
}
