use log::*;
use std::io::{self, Write};

/// The named areas of the client's screen. Each render replaces the whole content of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Tracks,
    Racers,
    Race,
    LeaderBoard,
    BigNumbers,
    Error,
}

impl Region {
    pub fn title(self) -> &'static str {
        match self {
            Self::Tracks => "Tracks",
            Self::Racers => "Racers",
            Self::Race => "Race",
            Self::LeaderBoard => "Leaderboard",
            Self::BigNumbers => "Countdown",
            Self::Error => "Error",
        }
    }
}

pub trait RenderTarget: Send + Sync + 'static {
    fn render(&self, region: Region, content: String);
}

/// Writes every render to stdout, headed by the region's title
#[derive(Debug, Default)]
pub struct TerminalRenderer;

impl RenderTarget for TerminalRenderer {
    fn render(&self, region: Region, content: String) {
        let mut stdout = io::stdout().lock();
        let result = match region {
            Region::BigNumbers => writeln!(stdout, "    {content}"),
            _ => writeln!(stdout, "\n== {} ==\n{content}", region.title()),
        };
        if let Err(e) = result.and_then(|_| stdout.flush()) {
            error!("Failed to render {region:?}: {e}");
        }
    }
}
