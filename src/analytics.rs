//! Aggregate statistics and trends over saved sessions.
//!
//! Every function here is a pure reduction over a slice of summaries ordered
//! oldest first. Callers pass a stable snapshot; nothing is cached.

use itertools::Itertools;
use std::cmp::Ordering;

use crate::summary::{Placement, SessionSummary};
use crate::util::{mean, percentage};

/// Trends need at least this many sessions
pub const MIN_TREND_SESSIONS: usize = 4;
/// Trends look at this many of the most recent sessions
pub const TREND_WINDOW: usize = 10;

/// Headline numbers for the whole history
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerformanceOverview {
    pub total_sessions: usize,
    pub average_ppr: f64,
    pub total_bags_thrown: u32,
    pub four_bagger_rate: f64,
    pub ppr_trend: f64,
    pub four_bagger_trend: f64,
    pub distribution: Placement,
}

/// Best-of values; `None` when there is no history
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Insights {
    pub best_session_ppr: Option<f64>,
    pub most_four_baggers: Option<u32>,
    pub highest_in_hole_percentage: Option<f64>,
}

/// Per bag type comparison
#[derive(Clone, Debug, PartialEq)]
pub struct BagPerformance {
    pub bag_type: String,
    pub total_sessions: usize,
    pub avg_ppr: f64,
    pub four_bagger_rate: f64,
    pub placement: Placement,
    pub best_ppr: f64,
}

pub fn total_sessions(sessions: &[SessionSummary]) -> usize {
    sessions.len()
}

pub fn average_ppr(sessions: &[SessionSummary]) -> f64 {
    let pprs: Vec<f64> = sessions.iter().map(|s| s.points_per_round).collect();
    mean(&pprs).unwrap_or(0.0)
}

pub fn total_bags_thrown(sessions: &[SessionSummary]) -> u32 {
    sessions.iter().map(SessionSummary::total_bags).sum()
}

/// Mean four-baggers per session
pub fn four_bagger_rate(sessions: &[SessionSummary]) -> f64 {
    let counts: Vec<f64> = sessions.iter().map(|s| s.four_baggers as f64).collect();
    mean(&counts).unwrap_or(0.0)
}

/// Share of all bags in each placement, (0, 0, 0) for no bags
pub fn throw_distribution(sessions: &[SessionSummary]) -> Placement {
    let in_hole: u32 = sessions.iter().map(|s| s.total_bags_in_hole).sum();
    let on_board: u32 = sessions.iter().map(|s| s.bags_on_board).sum();
    let off_board: u32 = sessions.iter().map(|s| s.bags_off_board).sum();
    let total = in_hole + on_board + off_board;

    Placement {
        in_hole: percentage(in_hole, total),
        on_board: percentage(on_board, total),
        off_board: percentage(off_board, total),
    }
}

/// Sum of `value_i * i / n` for 1-based position `i`.
///
/// The weights are not normalised, so this is not a weighted mean: it also
/// grows with the number of values.
pub fn weighted_sum<T: Copy + Into<f64>>(values: &[T]) -> f64 {
    let count = values.len() as f64;
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| value.into() * ((index + 1) as f64 / count))
        .sum()
}

/// Percent change from the older half of the recent window to the whole window
fn trend(values: &[f64]) -> f64 {
    if values.len() < MIN_TREND_SESSIONS {
        return 0.0;
    }
    let recent = &values[values.len().saturating_sub(TREND_WINDOW)..];
    let older = &recent[..recent.len() / 2];

    let weighted_recent = weighted_sum(recent);
    let weighted_older = weighted_sum(older);
    if weighted_older > 0.0 {
        (weighted_recent - weighted_older) / weighted_older * 100.0
    } else {
        0.0
    }
}

pub fn ppr_trend(sessions: &[SessionSummary]) -> f64 {
    let values: Vec<f64> = sessions.iter().map(|s| s.points_per_round).collect();
    trend(&values)
}

pub fn four_bagger_trend(sessions: &[SessionSummary]) -> f64 {
    let values: Vec<f64> = sessions.iter().map(|s| s.four_baggers as f64).collect();
    trend(&values)
}

pub fn overview(sessions: &[SessionSummary]) -> PerformanceOverview {
    PerformanceOverview {
        total_sessions: total_sessions(sessions),
        average_ppr: average_ppr(sessions),
        total_bags_thrown: total_bags_thrown(sessions),
        four_bagger_rate: four_bagger_rate(sessions),
        ppr_trend: ppr_trend(sessions),
        four_bagger_trend: four_bagger_trend(sessions),
        distribution: throw_distribution(sessions),
    }
}

fn max_f64(values: impl Iterator<Item = f64>) -> Option<f64> {
    values.max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
}

pub fn best_session_ppr(sessions: &[SessionSummary]) -> Option<f64> {
    max_f64(sessions.iter().map(|s| s.points_per_round))
}

pub fn most_four_baggers(sessions: &[SessionSummary]) -> Option<u32> {
    sessions.iter().map(|s| s.four_baggers).max()
}

/// Sessions without any bags are skipped; 0 if none had bags
pub fn highest_in_hole_percentage(sessions: &[SessionSummary]) -> Option<f64> {
    if sessions.is_empty() {
        return None;
    }
    Some(max_f64(sessions.iter().filter_map(SessionSummary::in_hole_percentage)).unwrap_or(0.0))
}

pub fn insights(sessions: &[SessionSummary]) -> Insights {
    Insights {
        best_session_ppr: best_session_ppr(sessions),
        most_four_baggers: most_four_baggers(sessions),
        highest_in_hole_percentage: highest_in_hole_percentage(sessions),
    }
}

/// Groups sessions by bag type, best average PPR first
pub fn bag_performance(sessions: &[SessionSummary]) -> Vec<BagPerformance> {
    sessions
        .iter()
        .into_group_map_by(|s| s.bag_type.clone())
        .into_iter()
        .map(|(bag_type, group)| {
            let group: Vec<SessionSummary> = group.into_iter().cloned().collect();
            BagPerformance {
                total_sessions: group.len(),
                avg_ppr: average_ppr(&group),
                four_bagger_rate: four_bagger_rate(&group),
                placement: throw_distribution(&group),
                best_ppr: best_session_ppr(&group).unwrap_or(0.0),
                bag_type,
            }
        })
        .sorted_by(|a, b| {
            b.avg_ppr
                .partial_cmp(&a.avg_ppr)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.bag_type.cmp(&b.bag_type))
        })
        .collect()
}
