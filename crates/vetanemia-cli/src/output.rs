use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;
use vetanemia_core::RiskLevel;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{}: {}", label.cyan(), value);
}

pub fn heading(title: &str) {
    println!("{}", title.bold());
}

pub fn risk_label(level: Option<RiskLevel>) -> ColoredString {
    match level {
        Some(RiskLevel::High) => "High".red().bold(),
        Some(RiskLevel::Medium) => "Medium".yellow(),
        Some(RiskLevel::Low) => "Low".green(),
        None => "-".dimmed(),
    }
}

/// Colours the dashboard's "High Risk" style prediction labels.
pub fn prediction_label(text: &str) -> ColoredString {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("high") {
        text.red()
    } else if lower.starts_with("medium") {
        text.yellow()
    } else if lower.starts_with("low") {
        text.green()
    } else {
        text.normal()
    }
}

pub fn priority_label(priority: &str) -> ColoredString {
    match priority.to_ascii_lowercase().as_str() {
        "high" => priority.red(),
        "medium" => priority.yellow(),
        "low" => priority.green(),
        _ => priority.normal(),
    }
}

/// Renders rows as a rounded table, or `empty` when there are none.
pub fn print_table<const N: usize>(headers: [&str; N], rows: Vec<[String; N]>, empty: &str) {
    if rows.is_empty() {
        println!("{empty}");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
}

pub fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
