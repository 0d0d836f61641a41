//! Provider status codes and the lifecycle phase derived from them.

/// Short status code reported by the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Time to be defined.
    ToBeDefined,
    NotStarted,
    FirstHalf,
    Halftime,
    SecondHalf,
    ExtraTime,
    /// Break between the end of regular time and extra time.
    BreakTime,
    /// Penalty shootout in progress.
    Penalties,
    Suspended,
    Interrupted,
    Finished,
    FinishedAfterExtraTime,
    FinishedAfterPenalties,
    Postponed,
    Cancelled,
    Abandoned,
    TechnicalLoss,
    WalkOver,
    /// In progress, period unknown.
    Live,
    Other(String),
}

impl StatusCode {
    pub fn parse(code: &str) -> Self {
        match code {
            "TBD" => StatusCode::ToBeDefined,
            "NS" => StatusCode::NotStarted,
            "1H" => StatusCode::FirstHalf,
            "HT" => StatusCode::Halftime,
            "2H" => StatusCode::SecondHalf,
            "ET" => StatusCode::ExtraTime,
            "BT" => StatusCode::BreakTime,
            "P" => StatusCode::Penalties,
            "SUSP" => StatusCode::Suspended,
            "INT" => StatusCode::Interrupted,
            "FT" => StatusCode::Finished,
            "AET" => StatusCode::FinishedAfterExtraTime,
            "PEN" => StatusCode::FinishedAfterPenalties,
            "PST" => StatusCode::Postponed,
            "CANC" => StatusCode::Cancelled,
            "ABD" => StatusCode::Abandoned,
            "AWD" => StatusCode::TechnicalLoss,
            "WO" => StatusCode::WalkOver,
            "LIVE" => StatusCode::Live,
            other => StatusCode::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusCode::ToBeDefined => "TBD",
            StatusCode::NotStarted => "NS",
            StatusCode::FirstHalf => "1H",
            StatusCode::Halftime => "HT",
            StatusCode::SecondHalf => "2H",
            StatusCode::ExtraTime => "ET",
            StatusCode::BreakTime => "BT",
            StatusCode::Penalties => "P",
            StatusCode::Suspended => "SUSP",
            StatusCode::Interrupted => "INT",
            StatusCode::Finished => "FT",
            StatusCode::FinishedAfterExtraTime => "AET",
            StatusCode::FinishedAfterPenalties => "PEN",
            StatusCode::Postponed => "PST",
            StatusCode::Cancelled => "CANC",
            StatusCode::Abandoned => "ABD",
            StatusCode::TechnicalLoss => "AWD",
            StatusCode::WalkOver => "WO",
            StatusCode::Live => "LIVE",
            StatusCode::Other(code) => code,
        }
    }

    /// The lifecycle phase this code belongs to.
    ///
    /// Only FT, AET, PEN and ABD end a match; AWD, WO and CANC never
    /// come with an elapsed time and are caught as pre-match upstream.
    pub fn phase(&self) -> Phase {
        match self {
            StatusCode::ToBeDefined
            | StatusCode::NotStarted
            | StatusCode::Postponed
            | StatusCode::Cancelled => Phase::PreMatch,
            StatusCode::Halftime | StatusCode::BreakTime => Phase::HalfBreak,
            StatusCode::Finished
            | StatusCode::FinishedAfterExtraTime
            | StatusCode::FinishedAfterPenalties
            | StatusCode::Abandoned => Phase::Finished,
            _ => Phase::InProgress,
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle phase of a tracked match.
///
/// Ordered by progression; `HalfBreak` and `InProgress` may alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    PreMatch,
    InProgress,
    HalfBreak,
    Finished,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::PreMatch => write!(f, "pre-match"),
            Phase::InProgress => write!(f, "in-progress"),
            Phase::HalfBreak => write!(f, "half-break"),
            Phase::Finished => write!(f, "finished"),
        }
    }
}
