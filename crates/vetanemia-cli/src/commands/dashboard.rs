use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use vetanemia_core::user::{display_name_or_default, initials_or_default, role_or_default};
use vetanemia_core::{DashboardSummary, RecentCase, change_label};
use vetanemia_session::{NAVIGATION, Route};

use crate::app::{App, or_empty};
use crate::cli::OutputFormat;
use crate::output::{heading, or_dash, prediction_label, print_json, print_table};

pub async fn show(app: &App) -> Result<()> {
    let page = app.mount(Route::Dashboard).await?;

    let (summary, recent) = tokio::join!(
        page.client.dashboard_summary(),
        page.client.dashboard_recent()
    );
    let summary: DashboardSummary = or_empty(summary, "dashboard summary");
    let recent: Vec<RecentCase> = or_empty(recent, "recent cases");

    if app.format == OutputFormat::Json {
        return print_json(&json!({ "summary": summary, "recent": recent }));
    }

    print_header(app, Route::Dashboard);
    print_table(
        ["Metric", "Value", "Change"],
        vec![
            [
                "Total cases".to_string(),
                summary.total_cases.to_string(),
                change_label(summary.changes.total_cases),
            ],
            [
                "Predictions today".to_string(),
                summary.predictions_today.to_string(),
                change_label(summary.changes.predictions_today),
            ],
            [
                "Accuracy rate".to_string(),
                summary.accuracy_label(),
                change_label(summary.changes.accuracy_rate),
            ],
            [
                "Active patients".to_string(),
                summary.active_patients.to_string(),
                change_label(summary.changes.active_patients),
            ],
        ],
        "",
    );

    println!();
    heading("Recent cases");
    let rows = recent
        .iter()
        .map(|c| {
            [
                c.id.as_ref().map(ToString::to_string).unwrap_or_default(),
                or_dash(&c.patient_name),
                format!("{} / {}", or_dash(&c.species), or_dash(&c.breed)),
                prediction_label(&c.prediction).to_string(),
                format!("{}%", c.confidence.round()),
                or_dash(&c.date),
                or_dash(&c.status),
            ]
        })
        .collect();
    print_table(
        ["ID", "Patient", "Species / Breed", "Prediction", "Confidence", "Date", "Status"],
        rows,
        "No recent cases.",
    );
    Ok(())
}

/// User chrome and sidebar shown above a page.
pub fn print_header(app: &App, current: Route) {
    let user = app.session.current_user();
    println!(
        "{} {}  {}",
        format!("[{}]", initials_or_default(user.as_ref())).cyan(),
        display_name_or_default(user.as_ref()).bold(),
        role_or_default(user.as_ref()).dimmed()
    );
    let nav: Vec<String> = NAVIGATION
        .iter()
        .map(|route| {
            if route.is_active(current.path()) {
                route.title().cyan().underline().to_string()
            } else {
                route.title().to_string()
            }
        })
        .collect();
    println!("{}\n", nav.join("  |  "));
}
