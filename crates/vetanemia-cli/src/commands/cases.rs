use anyhow::{Context, Result};
use serde_json::json;
use time::OffsetDateTime;
use vetanemia_core::{CaseFilter, CaseStats, CaseSummary, RiskLevel};
use vetanemia_session::Route;

use crate::app::{App, Page, or_empty};
use crate::cli::{CaseListArgs, CaseShowArgs, OutputFormat};
use crate::commands::dashboard::print_header;
use crate::output::{heading, or_dash, print_field, print_json, print_table, risk_label};

async fn load(page: &Page) -> Vec<CaseSummary> {
    let now = OffsetDateTime::now_utc();
    or_empty(page.client.cases().await, "cases")
        .iter()
        .map(|raw| CaseSummary::from_raw(raw, now))
        .collect()
}

fn filter_from_args(args: &CaseListArgs) -> Result<CaseFilter> {
    let pick = |value: &str| {
        let value = value.trim();
        (!value.is_empty() && !value.eq_ignore_ascii_case("all")).then(|| value.to_lowercase())
    };
    let risk = pick(&args.risk)
        .map(|r| r.parse::<RiskLevel>())
        .transpose()
        .context("Invalid --risk (expected all, low, medium or high)")?;
    Ok(CaseFilter {
        search: args.search.trim().to_string(),
        risk,
        status: pick(&args.status),
    })
}

pub async fn list(app: &App, args: &CaseListArgs) -> Result<()> {
    let filter = filter_from_args(args)?;
    let page = app.mount(Route::Cases).await?;
    let cases = load(&page).await;
    let stats = CaseStats::from_cases(&cases, OffsetDateTime::now_utc());
    let shown = filter.apply(&cases);

    if app.format == OutputFormat::Json {
        return print_json(&json!({ "stats": stats, "cases": shown }));
    }

    print_header(app, Route::Cases);
    print_field("Total", stats.total);
    print_field("High risk", stats.high_risk);
    print_field("Pending", stats.pending);
    print_field("This week", stats.this_week);
    println!();

    let rows = shown
        .iter()
        .map(|c| {
            [
                c.id.clone(),
                c.patient_name.clone(),
                format!("{} / {}", c.species, c.breed),
                risk_label(c.risk_level).to_string(),
                format!("{}%", c.confidence),
                or_dash(&c.date),
                c.status.clone(),
            ]
        })
        .collect();
    print_table(
        ["ID", "Patient", "Species / Breed", "Risk", "Confidence", "Date", "Status"],
        rows,
        "No cases match.",
    );
    if shown.len() != cases.len() {
        println!("Showing {} of {} cases", shown.len(), cases.len());
    }
    Ok(())
}

pub async fn show(app: &App, args: &CaseShowArgs) -> Result<()> {
    let page = app.mount(Route::Cases).await?;
    let cases = load(&page).await;
    let case = cases
        .iter()
        .find(|c| c.id == args.id)
        .with_context(|| format!("Case {} not found", args.id))?;

    if app.format == OutputFormat::Json {
        return print_json(case);
    }

    heading(&format!("Case {}: {}", case.id, case.patient_name));
    print_field("Species", &case.species);
    print_field("Breed", &case.breed);
    print_field("Age", case.age);
    print_field("Date", or_dash(&case.date));
    print_field("Status", &case.status);
    print_field("Risk level", risk_label(case.risk_level));
    print_field("Probability", format!("{}%", case.probability));
    print_field("Confidence", format!("{}%", case.confidence));
    print_field(
        "Lab values",
        format!(
            "Hb {} g/dL, PCV {}%, RBC {} x10^6/µL",
            case.lab_values.hemoglobin, case.lab_values.hematocrit, case.lab_values.red_blood_cells
        ),
    );
    print_field("Symptoms", or_dash(&case.symptoms));
    println!();
    for line in &case.recommendations {
        println!("  • {line}");
    }
    Ok(())
}
