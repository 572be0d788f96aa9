//! Session scoring shared by the live view and the saved summary.
//!
//! Both places must derive PPR and four-bagger counts through these functions
//! so an in-progress session and its persisted record never disagree.

use crate::throws::Round;

/// Derived statistics for one session's rounds
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SessionScore {
    pub points_per_round: f64,
    pub in_hole: u32,
    pub on_board: u32,
    pub off_board: u32,
    pub four_baggers: u32,
}

impl SessionScore {
    pub fn total_bags(&self) -> u32 {
        self.in_hole + self.on_board + self.off_board
    }
}

/// Average score over complete rounds only; 0 when no round is complete
pub fn points_per_round(rounds: &[Round]) -> f64 {
    let (total, complete) = rounds
        .iter()
        .filter(|r| r.is_complete())
        .fold((0u32, 0u32), |(total, count), r| (total + r.score(), count + 1));

    match complete {
        0 => 0.0,
        n => total as f64 / n as f64,
    }
}

pub fn four_baggers(rounds: &[Round]) -> u32 {
    rounds.iter().filter(|r| r.is_four_bagger()).count() as u32
}

/// Summarises rounds. Bag counts include incomplete rounds; PPR does not.
pub fn aggregate(rounds: &[Round]) -> SessionScore {
    SessionScore {
        points_per_round: points_per_round(rounds),
        in_hole: rounds.iter().map(Round::total_in_hole).sum(),
        on_board: rounds.iter().map(Round::total_on_board).sum(),
        off_board: rounds.iter().map(Round::total_miss).sum(),
        four_baggers: four_baggers(rounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::throws::{empty_rounds, Outcome};

    fn fill(rounds: &mut [Round], index: usize, outcomes: &[Outcome]) {
        for &o in outcomes {
            rounds[index].push(o);
        }
    }

    #[test]
    fn test_empty_session_scores_zero() {
        let score = aggregate(&empty_rounds());
        assert_eq!(score, SessionScore::default());
    }

    #[test]
    fn test_single_complete_round() {
        let mut rounds = empty_rounds();
        fill(
            &mut rounds,
            0,
            &[Outcome::InHole, Outcome::InHole, Outcome::OnBoard, Outcome::Miss],
        );
        assert_eq!(points_per_round(&rounds), 7.0);
    }

    #[test]
    fn test_incomplete_round_excluded_from_ppr_but_counted_in_bags() {
        let mut rounds = empty_rounds();
        fill(&mut rounds, 0, &[Outcome::OnBoard; 4]);
        fill(&mut rounds, 1, &[Outcome::InHole, Outcome::InHole]);

        let score = aggregate(&rounds);
        assert_eq!(score.points_per_round, 4.0);
        assert_eq!(score.in_hole, 2);
        assert_eq!(score.on_board, 4);
        assert_eq!(score.off_board, 0);
        assert_eq!(score.total_bags(), 6);
    }

    #[test]
    fn test_full_session_ppr_is_total_over_ten() {
        let mut rounds = empty_rounds();
        let pattern = [Outcome::InHole, Outcome::OnBoard, Outcome::Miss, Outcome::OnBoard];
        for i in 0..10 {
            let mut outcomes = pattern;
            outcomes.rotate_left(i % 4);
            if i == 3 {
                outcomes = [Outcome::InHole; 4];
            }
            fill(&mut rounds, i, &outcomes);
        }

        let total: u32 = rounds.iter().map(Round::score).sum();
        let score = aggregate(&rounds);
        assert_eq!(score.points_per_round, total as f64 / 10.0);
        assert_eq!(score.total_bags(), 40);
        assert_eq!(score.four_baggers, 1);
    }

    #[test]
    fn test_four_bagger_needs_every_bag_in_hole() {
        let mut rounds = empty_rounds();
        fill(&mut rounds, 0, &[Outcome::InHole; 4]);
        fill(
            &mut rounds,
            1,
            &[Outcome::InHole, Outcome::InHole, Outcome::InHole, Outcome::Miss],
        );
        fill(&mut rounds, 2, &[Outcome::InHole; 3]);
        assert_eq!(four_baggers(&rounds), 1);
    }
}
