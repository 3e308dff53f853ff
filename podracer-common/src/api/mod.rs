use core::time::Duration;
use log::{debug, info, warn};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;

pub use reqwest::StatusCode;

mod types;
pub use types::*;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },
}

/// Everything the client needs from the race server.
///
/// The futures must not borrow `self`, so that callers can hold an `Arc` to the implementor and
/// move the futures into spawned tasks.
pub trait RaceApi: Send + Sync + 'static {
    fn get_tracks(&self) -> impl Future<Output = Result<Vec<Track>, ApiError>> + Send + 'static;

    fn get_racers(&self) -> impl Future<Output = Result<Vec<Racer>, ApiError>> + Send + 'static;

    fn create_race(
        &self,
        player_id: RacerId,
        track_id: TrackId,
    ) -> impl Future<Output = Result<CreatedRace, ApiError>> + Send + 'static;

    fn get_race(&self, id: RaceId)
    -> impl Future<Output = Result<Race, ApiError>> + Send + 'static;

    fn start_race(&self, id: RaceId) -> impl Future<Output = Result<(), ApiError>> + Send + 'static;

    fn accelerate(&self, id: RaceId) -> impl Future<Output = Result<(), ApiError>> + Send + 'static;
}

pub struct PodRacerClient {
    base_url: String,
    client: Client,
}

impl PodRacerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = ClientBuilder::new().timeout(timeout).build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }
}

impl RaceApi for PodRacerClient {
    fn get_tracks(&self) -> impl Future<Output = Result<Vec<Track>, ApiError>> + Send + 'static {
        let request = self.request(Method::GET, "tracks");

        async move {
            let tracks: Vec<Track> = read_json(request).await?;
            info!("Received {} tracks", tracks.len());
            Ok(tracks)
        }
    }

    fn get_racers(&self) -> impl Future<Output = Result<Vec<Racer>, ApiError>> + Send + 'static {
        let request = self.request(Method::GET, "cars");

        async move {
            let racers: Vec<Racer> = read_json(request).await?;
            info!("Received {} racers", racers.len());
            Ok(racers)
        }
    }

    fn create_race(
        &self,
        player_id: RacerId,
        track_id: TrackId,
    ) -> impl Future<Output = Result<CreatedRace, ApiError>> + Send + 'static {
        let request = self
            .request(Method::POST, "races")
            .json(&CreateRaceRequest {
                player_id,
                track_id,
            });

        async move {
            let created: CreatedRace = read_json(request).await?;
            info!(
                "Created race {} on track {} for racer {player_id}",
                created.id, created.track.id
            );
            Ok(created)
        }
    }

    fn get_race(
        &self,
        id: RaceId,
    ) -> impl Future<Output = Result<Race, ApiError>> + Send + 'static {
        let request = self.request(Method::GET, &format!("races/{id}"));

        async move {
            let race: Race = read_json(request).await?;
            debug!("Race {id} is {}", race.status);
            Ok(race)
        }
    }

    fn start_race(&self, id: RaceId) -> impl Future<Output = Result<(), ApiError>> + Send + 'static {
        let request = self.request(Method::POST, &format!("races/{id}/start"));

        async move {
            check_status(request.send().await?).await?;
            info!("Started race {id}");
            Ok(())
        }
    }

    fn accelerate(&self, id: RaceId) -> impl Future<Output = Result<(), ApiError>> + Send + 'static {
        let request = self.request(Method::POST, &format!("races/{id}/accelerate"));

        async move {
            check_status(request.send().await?).await?;
            debug!("Accelerated in race {id}");
            Ok(())
        }
    }
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
    let response = check_status(request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!("Request failed, response: {response:?}");
        let url = response.url().to_string();
        let body = response.text().await?;
        Err(ApiError::Status { url, status, body })
    }
}
