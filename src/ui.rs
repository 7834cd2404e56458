// UI layer: terminal output and prompts.
// - Account tables and the document grid are rendered to strings first, so
//   the layout can be checked without a terminal, then printed.
// - Secrets are read with `dialoguer::Password`, and slow server calls get an
//   `indicatif` spinner.

use anyhow::Result;
use crossterm::style::Stylize;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

use crate::account::Account;
use crate::document::Document;

/// Ask for a secret without echoing it.
pub fn prompt_secret(prompt: &str) -> Result<String> {
    Ok(Password::new().with_prompt(prompt).interact()?)
}

/// Spinner shown on stderr while a blocking request runs. Call
/// `finish_and_clear` when done.
pub fn spinner(msg: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(msg.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Account table with the current account marked `*` and highlighted.
pub fn render_accounts<'a>(
    accounts: impl IntoIterator<Item = &'a Account>,
    current: Option<&str>,
) -> String {
    let rows: Vec<[String; 3]> = accounts
        .into_iter()
        .map(|a| {
            [
                a.alias.clone(),
                a.host.clone(),
                a.user.clone().unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();

    let header = ["Alias", "Host", "User"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let head = format!(
        "  {:<w0$}  {:<w1$}  {}",
        header[0],
        header[1],
        header[2],
        w0 = widths[0],
        w1 = widths[1]
    );
    out.push_str(&format!("{}\n", head.trim_end().bold()));

    for row in &rows {
        let is_current = current == Some(row[0].as_str());
        let marker = if is_current { "*" } else { " " };
        let line = format!(
            "{} {:<w0$}  {:<w1$}  {}",
            marker,
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1]
        );
        if is_current {
            out.push_str(&format!("{}\n", line.green()));
        } else {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

pub fn print_accounts<'a>(accounts: impl IntoIterator<Item = &'a Account>, current: Option<&str>) {
    print!("{}", render_accounts(accounts, current));
}

/// A fetched document with its references already resolved to names.
#[derive(Debug, Clone)]
pub struct DocumentDetails {
    pub document: Document,
    pub correspondent: Option<String>,
    pub document_type: Option<String>,
    pub storage_path: Option<String>,
    pub tags: Vec<String>,
    pub custom_fields: Vec<(String, Value)>,
    /// Link to the document in the web UI.
    pub url: String,
}

fn none_if_missing(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "None".magenta().to_string(),
    }
}

fn field_value(value: &Value) -> String {
    match value {
        Value::Null => "None".magenta().to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Two-column grid of a document's metadata.
pub fn render_document(details: &DocumentDetails) -> String {
    let doc = &details.document;
    let mut rows: Vec<(String, String)> = vec![
        ("ID".to_string(), doc.id.to_string()),
        ("Title".to_string(), doc.title.clone()),
        (
            "ASN".to_string(),
            none_if_missing(doc.archive_serial_number.map(|n| n.to_string())),
        ),
        ("Created".to_string(), none_if_missing(doc.created_on().map(str::to_string))),
        ("Correspondent".to_string(), none_if_missing(details.correspondent.clone())),
        ("Document type".to_string(), none_if_missing(details.document_type.clone())),
        ("Storage path".to_string(), none_if_missing(details.storage_path.clone())),
        (
            "Tags".to_string(),
            none_if_missing(Some(details.tags.join(", "))),
        ),
    ];
    for (name, value) in &details.custom_fields {
        rows.push((name.clone(), field_value(value)));
    }
    rows.push(("Link".to_string(), details.url.clone()));

    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (key, value) in rows {
        let label = format!("{:<width$}", key, width = width);
        out.push_str(&format!("{}  {}\n", label.bold(), value));
    }
    out
}

pub fn print_document(details: &DocumentDetails) {
    print!("{}", render_document(details));
}
