//! Plain-text presenters for the CLI. Pure functions so they can be tested
//! without a terminal.

use chrono::{DateTime, Local, Utc};
use time_humanize::HumanTime;

use crate::analytics::{BagPerformance, Insights, PerformanceOverview};
use crate::summary::SessionSummary;
use crate::tracker::{SessionState, SessionTracker};

pub const NOT_AVAILABLE: &str = "N/A";

/// Arrow plus magnitude, e.g. `↑ 12.5%`
pub fn format_trend(trend: f64) -> String {
    let arrow = if trend > 0.0 {
        "↑"
    } else if trend < 0.0 {
        "↓"
    } else {
        "→"
    };
    format!("{arrow} {:.1}%", trend.abs())
}

pub fn format_optional(value: Option<f64>, suffix: &str) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.1}{suffix}"))
}

/// "3 days ago" style age of a saved session
pub fn format_age(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - date).num_seconds().max(0);
    HumanTime::from_seconds(-secs).to_string()
}

pub fn overview_lines(o: &PerformanceOverview) -> Vec<String> {
    vec![
        format!("Total sessions   {}", o.total_sessions),
        format!(
            "Avg PPR          {:.1}  {}",
            o.average_ppr,
            format_trend(o.ppr_trend)
        ),
        format!("Total bags       {}", o.total_bags_thrown),
        format!(
            "4 bagger rate    {:.1}  {}",
            o.four_bagger_rate,
            format_trend(o.four_bagger_trend)
        ),
        format!(
            "Distribution     in hole {:.1}% | on board {:.1}% | off board {:.1}%",
            o.distribution.in_hole, o.distribution.on_board, o.distribution.off_board
        ),
    ]
}

pub fn insight_lines(i: &Insights) -> Vec<String> {
    vec![
        format!("Best session PPR    {}", format_optional(i.best_session_ppr, "")),
        format!(
            "Most 4 baggers      {}",
            i.most_four_baggers
                .map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string())
        ),
        format!(
            "Highest in hole %   {}",
            format_optional(i.highest_in_hole_percentage, "%")
        ),
    ]
}

pub const HISTORY_HEADER: &str = "Date      Age              PPR   InH   OnB   Off   4B  Bag              Style        Id";

pub fn history_row(s: &SessionSummary, now: DateTime<Utc>) -> String {
    let p = s.placement();
    format!(
        "{:<9} {:<16} {:>4.1} {:>4.0}% {:>4.0}% {:>4.0}% {:>3}  {:<16} {:<12} {}",
        s.date.with_timezone(&Local).format("%m/%d/%y"),
        format_age(s.date, now),
        s.points_per_round,
        p.in_hole,
        p.on_board,
        p.off_board,
        s.four_baggers,
        s.bag_type,
        s.throwing_style.as_deref().unwrap_or("-"),
        s.id,
    )
}

pub fn bag_lines(p: &BagPerformance) -> Vec<String> {
    vec![
        format!("{} ({} sessions)", p.bag_type, p.total_sessions),
        format!("  Average PPR       {:.2}", p.avg_ppr),
        format!("  Best session PPR  {:.2}", p.best_ppr),
        format!("  4 bagger rate     {:.2}", p.four_bagger_rate),
        format!(
            "  In hole {:.1}% | On board {:.1}% | Off board {:.1}%",
            p.placement.in_hole, p.placement.on_board, p.placement.off_board
        ),
    ]
}

/// One-line prompt describing where the live session stands
pub fn tracker_status(t: &SessionTracker) -> String {
    match t.state() {
        SessionState::Ready => "No active session".to_string(),
        SessionState::Completed => format!(
            "Session complete: {:.2} PPR. (s)ave, (u)ndo or (d)iscard",
            t.current_ppr()
        ),
        SessionState::InProgress => format!(
            "Round {}/10, throw {}/4 | PPR {:.2} | (h)ole (b)oard (m)iss (u)ndo",
            t.current_round(),
            t.current_throw(),
            t.current_ppr()
        ),
    }
}
