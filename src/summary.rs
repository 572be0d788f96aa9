use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::aggregate::SessionScore;
use crate::util::percentage;

pub type SessionId = Uuid;

/// Persisted record of one finished practice session.
///
/// Numeric fields are fixed at save time; only the labels may change later.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub id: SessionId,
    pub date: DateTime<Utc>,
    pub points_per_round: f64,
    pub total_bags_in_hole: u32,
    pub bags_on_board: u32,
    pub bags_off_board: u32,
    pub four_baggers: u32,
    pub bag_type: String,
    pub throwing_style: Option<String>,
}

/// In-hole / on-board / off-board shares, in percent
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    pub in_hole: f64,
    pub on_board: f64,
    pub off_board: f64,
}

impl SessionSummary {
    pub fn from_score(
        score: &SessionScore,
        bag_type: impl Into<String>,
        throwing_style: Option<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            points_per_round: score.points_per_round,
            total_bags_in_hole: score.in_hole,
            bags_on_board: score.on_board,
            bags_off_board: score.off_board,
            four_baggers: score.four_baggers,
            bag_type: bag_type.into(),
            throwing_style,
        }
    }

    pub fn total_bags(&self) -> u32 {
        self.total_bags_in_hole + self.bags_on_board + self.bags_off_board
    }

    /// In-hole share of this session's bags; None when no bags were thrown
    pub fn in_hole_percentage(&self) -> Option<f64> {
        match self.total_bags() {
            0 => None,
            total => Some(percentage(self.total_bags_in_hole, total)),
        }
    }

    pub fn placement(&self) -> Placement {
        let total = self.total_bags();
        Placement {
            in_hole: percentage(self.total_bags_in_hole, total),
            on_board: percentage(self.bags_on_board, total),
            off_board: percentage(self.bags_off_board, total),
        }
    }

    /// Numeric content, ignoring identity, date and labels
    pub fn score(&self) -> SessionScore {
        SessionScore {
            points_per_round: self.points_per_round,
            in_hole: self.total_bags_in_hole,
            on_board: self.bags_on_board,
            off_board: self.bags_off_board,
            four_baggers: self.four_baggers,
        }
    }
}
