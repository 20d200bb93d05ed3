use anyhow::{Context, Result};
use colored::Colorize;
use serde_json::json;
use vetanemia_core::{RawCase, SuggestionFilter, SuggestionRequest};
use vetanemia_core::suggestion::COMPACT_LIMIT;
use vetanemia_session::Route;

use crate::app::{App, Page, or_empty};
use crate::cli::{GenerateArgs, OutputFormat};
use crate::commands::dashboard::print_header;
use crate::output::{heading, print_field, print_json, priority_label};

pub async fn stats(app: &App) -> Result<()> {
    let page = app.mount(Route::AiSuggestions).await?;
    let stats = or_empty(page.client.ai_stats().await, "AI suggestion stats");

    if app.format == OutputFormat::Json {
        return print_json(&stats);
    }
    print_header(app, Route::AiSuggestions);
    print_field("Total suggestions", stats.total_suggestions);
    print_field("High priority", stats.high_priority);
    print_field("Implemented", stats.implemented);
    print_field("Average accuracy", format!("{}%", stats.avg_accuracy));
    Ok(())
}

async fn subject(app: &App, page: &Page, case_id: Option<&str>) -> Result<RawCase> {
    match case_id {
        Some(id) => or_empty(page.client.cases().await, "cases")
            .into_iter()
            .find(|c| c.id_string() == id)
            .with_context(|| format!("Case {id} not found")),
        None => app
            .last_prediction()?
            .context("No prediction yet. Run `vetanemia predict` or pass --case <id>"),
    }
}

pub async fn generate(app: &App, args: &GenerateArgs) -> Result<()> {
    let page = app.mount(Route::AiSuggestions).await?;
    let case = subject(app, &page, args.case.as_deref()).await?;
    let request = SuggestionRequest::for_case(&case);

    let suggestions = or_empty(page.client.suggestions(&request).await, "AI suggestions");
    let filter = SuggestionFilter {
        kind: args.kind.clone(),
        priority: args.priority.clone(),
    };
    let shown = filter.apply(&suggestions, args.all);

    if app.format == OutputFormat::Json {
        return print_json(&json!({ "suggestions": shown, "total": suggestions.len() }));
    }

    print_header(app, Route::AiSuggestions);
    heading(&format!(
        "Suggestions for {}",
        case.patient_name.as_deref().unwrap_or("Unknown")
    ));
    if shown.is_empty() {
        println!("No suggestions.");
        return Ok(());
    }
    for s in &shown {
        println!(
            "\n{} [{}] {} ({}% confidence)",
            s.title.bold(),
            priority_label(&s.priority),
            s.kind.dimmed(),
            s.confidence.round()
        );
        if !s.description.is_empty() {
            println!("  {}", s.description);
        }
        if !s.reasoning.is_empty() {
            println!("  {} {}", "Why:".cyan(), s.reasoning);
        }
        if !s.timeframe.is_empty() {
            println!("  {} {}", "When:".cyan(), s.timeframe);
        }
        if !s.related_factors.is_empty() {
            println!("  {} {}", "Factors:".cyan(), s.related_factors.join(", "));
        }
    }
    let matching = suggestions.iter().filter(|s| filter.matches(s)).count();
    if !args.all && matching > COMPACT_LIMIT {
        println!("\n{} more; pass --all to see them", matching - COMPACT_LIMIT);
    }
    Ok(())
}
