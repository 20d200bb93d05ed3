use std::fs;

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use vetanemia_core::{LabForm, NewCase, PredictionForm, PredictionOutcome, RawCase};
use vetanemia_session::Route;

use crate::app::App;
use crate::cli::{OutputFormat, PredictArgs};
use crate::commands::dashboard::print_header;
use crate::output::{heading, print_field, print_json, print_success, print_table, risk_label};

pub async fn run(app: &App, args: &PredictArgs) -> Result<()> {
    let page = app.mount(Route::Prediction).await?;

    let form = read_form(args)?;
    let request = form.to_request()?;
    tracing::debug!(patient = %request.patient_id, "requesting prediction");

    let raw = page
        .client
        .predict(&request)
        .await
        .map_err(|e| anyhow!(e.user_message("Prediction")))?;
    let outcome = PredictionOutcome::from_response(&raw, &request);

    let last = RawCase::from_prediction(&form, &request, &raw, &outcome, OffsetDateTime::now_utc());
    app.save_last_prediction(&last)?;

    let saved = if args.save {
        let case = NewCase::from_prediction(&form, &request, &raw, &outcome);
        let created = page
            .client
            .create_case(&case)
            .await
            .map_err(|e| anyhow!(e.user_message("Saving the case")))?;
        Some(created)
    } else {
        None
    };

    if app.format == OutputFormat::Json {
        return print_json(&json!({ "outcome": outcome, "raw": raw, "saved": saved }));
    }

    print_header(app, Route::Prediction);
    heading(&format!("Prediction for {}", request.patient_id));
    print_field("Risk level", risk_label(Some(outcome.risk_level)));
    print_field("Probability", format!("{}%", outcome.probability));
    print_field("Confidence", format!("{}%", outcome.confidence));
    println!();
    for line in &outcome.recommendations {
        println!("  • {line}");
    }
    println!();
    print_table(
        ["Factor", "Impact"],
        outcome
            .factors
            .iter()
            .map(|f| [f.name.clone(), format!("{:.0}", f.impact)])
            .collect(),
        "",
    );

    match saved {
        Some(created) => print_success(&format!("Saved to case history{}", created_id(&created))),
        None => println!(
            "{}",
            "Run `vetanemia suggestions generate` for AI suggestions on this result.".dimmed()
        ),
    }
    Ok(())
}

fn created_id(created: &Value) -> String {
    match created.get("id") {
        Some(Value::Number(n)) => format!(" (case {n})"),
        Some(Value::String(s)) => format!(" (case {s})"),
        _ => String::new(),
    }
}

fn read_form(args: &PredictArgs) -> Result<PredictionForm> {
    if let Some(path) = &args.file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        return PredictionForm::from_json(&content)
            .with_context(|| format!("Invalid prediction form in {}", path.display()));
    }

    Ok(PredictionForm {
        patient_name: args.patient_name.clone().unwrap_or_default(),
        species: args.species.clone(),
        breed: args.breed.clone(),
        age: args.age.clone(),
        weight: args.weight.clone(),
        gender: args.gender.clone(),
        symptoms: args.symptoms.clone(),
        lab_values: LabForm {
            hemoglobin: args.hemoglobin.clone().unwrap_or_default(),
            hematocrit: args.hematocrit.clone(),
            red_blood_cells: args.red_blood_cells.clone(),
            mcv: args.mcv.clone(),
            mch: args.mch.clone(),
            mchc: args.mchc.clone(),
            tlc: args.tlc.clone(),
            platelet: args.platelet.clone(),
            reticulocyte: args.reticulocyte.clone(),
            bun: args.bun.clone(),
            creatinine: args.creatinine.clone(),
            alt: args.alt.clone(),
            ast: args.ast.clone(),
            glucose: args.glucose.clone(),
        },
    })
}
