use podracer_common::api::{RacePosition, Racer, RacerId, Track, TrackId};
use prettytable::{Cell, Row, Table, format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR};

pub const LOADING_TRACKS: &str = "Loading Tracks...";
pub const LOADING_RACERS: &str = "Loading Racers...";
const SELECTED_MARKER: &str = ">";

/// One selectable entry of a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub details: Vec<String>,
    pub selected: bool,
}

pub fn track_cards(tracks: &[Track], selected: Option<TrackId>) -> Vec<Card> {
    tracks
        .iter()
        .map(|track| Card {
            id: track.id.to_string(),
            title: track.name.clone(),
            details: vec![format!("{} segments", track.segments.len())],
            selected: Some(track.id) == selected,
        })
        .collect()
}

pub fn racer_cards(racers: &[Racer], selected: Option<RacerId>) -> Vec<Card> {
    racers
        .iter()
        .map(|racer| Card {
            id: racer.id.to_string(),
            title: racer.driver_name.clone(),
            details: vec![
                racer.top_speed.to_string(),
                racer.acceleration.to_string(),
                racer.handling.to_string(),
            ],
            selected: Some(racer.id) == selected,
        })
        .collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(titles.iter().map(|t| Cell::new(t)).collect()));
    table
}

fn cards_view(cards: &[Card], titles: &[&str], placeholder: &str) -> String {
    if cards.is_empty() {
        return placeholder.to_string();
    }

    let mut table = new_table(titles);
    for card in cards {
        let marker = if card.selected { SELECTED_MARKER } else { "" };
        let mut cells = vec![Cell::new(marker), Cell::new(&card.id), Cell::new(&card.title)];
        cells.extend(card.details.iter().map(|d| Cell::new(d)));
        table.add_row(Row::new(cells));
    }
    table.to_string()
}

pub fn tracks_view(tracks: &[Track], selected: Option<TrackId>) -> String {
    cards_view(
        &track_cards(tracks, selected),
        &["", "Id", "Track", "Length"],
        LOADING_TRACKS,
    )
}

pub fn racers_view(racers: &[Racer], selected: Option<RacerId>) -> String {
    cards_view(
        &racer_cards(racers, selected),
        &["", "Id", "Driver", "Top Speed", "Acceleration", "Handling"],
        LOADING_RACERS,
    )
}

pub fn race_start_view(track: &Track, countdown_from: u8) -> String {
    format!(
        "Race: {}\n\nRace Starts In...\n    {countdown_from}\n\n\
         Directions: press Enter as fast as you can to make your racer go faster!",
        track.name
    )
}

fn driver_label(position: &RacePosition, player: Option<RacerId>) -> String {
    if Some(position.id) == player {
        format!("{} (you)", position.driver_name)
    } else {
        position.driver_name.clone()
    }
}

/// Racers furthest along the track first. Racers on the same segment keep the server's order.
pub fn leaderboard_order(positions: &[RacePosition]) -> Vec<&RacePosition> {
    let mut ordered: Vec<_> = positions.iter().collect();
    ordered.sort_by(|a, b| b.segment.cmp(&a.segment));
    ordered
}

pub fn leaderboard_view(
    positions: &[RacePosition],
    player: Option<RacerId>,
    track: &Track,
) -> String {
    let total = track.segments.len();
    let mut table = new_table(&["Place", "Driver", "Progress"]);
    for (place, position) in leaderboard_order(positions).into_iter().enumerate() {
        let progress = if total > 0 {
            format!("{}/{total}", position.segment.min(total as u32))
        } else {
            position.segment.to_string()
        };
        table.add_row(Row::new(vec![
            Cell::new(&(place + 1).to_string()),
            Cell::new(&driver_label(position, player)),
            Cell::new(&progress),
        ]));
    }
    format!("Leaderboard\n{table}")
}

/// Ascending final position. Racers without one come last, ties keep the server's order.
pub fn results_order(positions: &[RacePosition]) -> Vec<&RacePosition> {
    let mut ordered: Vec<_> = positions.iter().collect();
    ordered.sort_by_key(|p| (p.final_position.is_none(), p.final_position));
    ordered
}

pub fn results_view(positions: &[RacePosition], player: Option<RacerId>) -> String {
    let mut table = new_table(&["Place", "Driver"]);
    for position in results_order(positions) {
        let place = position
            .final_position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(Row::new(vec![
            Cell::new(&place),
            Cell::new(&driver_label(position, player)),
        ]));
    }
    format!("Race Results\n{table}\nType `start` to race again.")
}
