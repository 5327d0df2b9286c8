//! Askama templates for the web frontend.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::planner::{PlannedStop, RidePlan};

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// Home page with the trip form.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

/// Error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub title: String,
    pub message: String,
}

// ============================================================================
// Fragment Templates (AJAX responses, no base.html)
// ============================================================================

/// Planned ride fragment.
#[derive(Template)]
#[template(path = "plan_results.html")]
pub struct PlanResultsTemplate {
    pub plan: PlanView,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Ride plan view model for templates.
#[derive(Debug, Clone)]
pub struct PlanView {
    pub departs_at: String,
    pub arrives_at: String,
    pub duration: String,
    pub distance_km: String,
    pub share_link: String,
    pub partial: bool,
    pub stops: Vec<StopView>,
}

/// Pickup view model.
#[derive(Debug, Clone)]
pub struct StopView {
    pub position: usize,
    pub user: String,
    pub pickup_address: String,
    pub dropoff_address: String,
    /// `None` renders as "time unknown"
    pub pickup_time: Option<String>,
}

impl PlanView {
    pub fn from_plan(plan: &RidePlan) -> Self {
        Self {
            departs_at: format_time(&plan.departs_at),
            arrives_at: format_time(&plan.arrives_at),
            duration: format_duration(plan.total_duration_secs),
            distance_km: format!("{:.1}", plan.total_distance_meters as f64 / 1000.0),
            share_link: plan.share_link.clone(),
            partial: plan.is_partial(),
            stops: plan.stops.iter().map(StopView::from_stop).collect(),
        }
    }
}

impl StopView {
    pub fn from_stop(stop: &PlannedStop) -> Self {
        let pickup_address = if stop.record.pickup_address.trim().is_empty() {
            stop.record.start.to_string()
        } else {
            stop.record.pickup_address.clone()
        };

        Self {
            position: stop.visit_position.0 + 1,
            user: stop.record.user_id.to_string(),
            pickup_address,
            dropoff_address: stop.record.dropoff_address.clone(),
            pickup_time: stop.pickup_at.as_ref().map(format_time),
        }
    }
}

fn format_time(t: &DateTime<Utc>) -> String {
    t.format("%H:%M").to_string()
}

/// Format seconds as e.g. "1 h 05 min" or "25 min".
fn format_duration(secs: i64) -> String {
    let mins = (secs.max(0) + 59) / 60;
    if mins < 60 {
        format!("{mins} min")
    } else {
        format!("{} h {:02} min", mins / 60, mins % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0 min");
        assert_eq!(format_duration(300), "5 min");
        assert_eq!(format_duration(301), "6 min");
        assert_eq!(format_duration(3900), "1 h 05 min");
    }

    #[test]
    fn time_formatting() {
        let t = DateTime::from_timestamp(1_710_513_000, 0).unwrap();
        assert_eq!(format_time(&t), "14:30");
    }

    #[test]
    fn error_page_renders() {
        let html = ErrorTemplate {
            title: "Not found".into(),
            message: "no matches".into(),
        }
        .render()
        .unwrap();
        assert!(html.contains("no matches"));
    }
}
