use colored::Colorize;
use serde::Serialize;

use crate::category::CATALOG;
use crate::filter::{FilterMark, FilterState};
use crate::pagination::{ControlKind, PagePlan};
use crate::state::{LoadStatus, PageItem, PageView};

pub const LOADING_MESSAGE: &str = "Loading data...";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data.";
pub const EMPTY_MESSAGE: &str = "No services to display.";
pub const NO_INFORMATION: &str = "No information";
pub const APPLY_LABEL: &str = "Apply";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputRecord {
    pub position: usize,
    pub id: String,
    pub title: String,
    pub categories: Vec<String>,
    pub support_target: String,
    pub details: String,
    pub notes: String,
    pub link: String,
    pub favorite: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputPage {
    pub result_count: usize,
    pub favorites_count: usize,
    pub page: usize,
    pub total_pages: usize,
    pub view: &'static str,
    pub keyword: String,
    pub included: String,
    pub excluded: String,
    pub message: Option<&'static str>,
    pub services: Vec<OutputRecord>,
}

fn or_placeholder(value: &str) -> &str {
    if value.trim().is_empty() {
        NO_INFORMATION
    } else {
        value
    }
}

/// The message shown instead of the list, if any.
pub fn status_message(view: &PageView<'_>) -> Option<&'static str> {
    match view.status {
        LoadStatus::Loading => Some(LOADING_MESSAGE),
        LoadStatus::Failed(_) => Some(LOAD_FAILED_MESSAGE),
        LoadStatus::Loaded if view.items.is_empty() => Some(EMPTY_MESSAGE),
        LoadStatus::Loaded => None,
    }
}

pub fn build_page(view: &PageView<'_>) -> OutputPage {
    let services = view
        .items
        .iter()
        .map(|item| OutputRecord {
            position: item.position,
            id: item.record.id.clone(),
            title: item.record.title.clone(),
            categories: item.record.categories.clone(),
            support_target: or_placeholder(&item.record.support_target).to_string(),
            details: or_placeholder(&item.record.details).to_string(),
            notes: or_placeholder(&item.record.notes).to_string(),
            link: item.record.link.clone(),
            favorite: item.favorite,
        })
        .collect();
    OutputPage {
        result_count: view.result_count,
        favorites_count: view.favorites_count,
        page: view.current_page,
        total_pages: view.plan.total_pages,
        view: view.view.label(),
        keyword: view.keyword.trim().to_string(),
        included: view.filter_summary.included.clone(),
        excluded: view.filter_summary.excluded.clone(),
        message: status_message(view),
        services,
    }
}

pub fn render_json(page: &OutputPage) -> Vec<u8> {
    serde_json::to_vec_pretty(page).unwrap_or_else(|_| b"{}\n".to_vec())
}

fn format_kv_line(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(":: {:<10}: {}\n", label, value));
}

pub fn render_header(view: &PageView<'_>) -> String {
    let mut out = String::new();
    format_kv_line(&mut out, "Results", &format!("{} results", view.result_count));
    format_kv_line(&mut out, "Favorites", &view.favorites_count.to_string());
    format_kv_line(&mut out, "Included", &view.filter_summary.included);
    format_kv_line(&mut out, "Excluded", &view.filter_summary.excluded);
    if !view.keyword.trim().is_empty() {
        format_kv_line(&mut out, "Search", view.keyword.trim());
    }
    format_kv_line(&mut out, "View", view.view.label());
    out
}

fn render_item(out: &mut String, item: &PageItem<'_>, details: bool) {
    let star = if item.favorite {
        "★".yellow().bold().to_string()
    } else {
        "☆".dimmed().to_string()
    };
    out.push_str(&format!(
        "[{}] {} {}\n",
        item.position,
        star,
        item.record.title.bold()
    ));
    if !item.record.categories.is_empty() {
        let chips: Vec<String> = item
            .record
            .categories
            .iter()
            .map(|c| format!("#{c}").cyan().to_string())
            .collect();
        out.push_str(&format!("    {}\n", chips.join(" ")));
    }
    if details {
        let r = item.record;
        out.push_str(&format!("    Notes         : {}\n", or_placeholder(&r.notes)));
        out.push_str(&format!(
            "    Support target: {}\n",
            or_placeholder(&r.support_target)
        ));
        out.push_str(&format!("    Details       : {}\n", or_placeholder(&r.details)));
        out.push_str(&format!(
            "    {:<14}: {}\n",
            APPLY_LABEL,
            or_placeholder(&r.link).underline()
        ));
    }
}

pub fn render_controls(plan: &PagePlan) -> String {
    let parts: Vec<String> = plan
        .controls
        .iter()
        .map(|c| {
            let label = match c.kind {
                ControlKind::Page(_) if c.active => format!("[{}]", c.kind.label()),
                _ => c.kind.label(),
            };
            if c.disabled {
                label.dimmed().to_string()
            } else if c.active {
                label.green().bold().to_string()
            } else {
                label
            }
        })
        .collect();
    parts.join(" ")
}

/// Renders the page as plain terminal text. `all_details` prints every
/// record's detail fields instead of only the expanded ones.
pub fn render_text(view: &PageView<'_>, all_details: bool) -> String {
    let mut out = render_header(view);
    out.push('\n');
    if let Some(message) = status_message(view) {
        out.push_str(message);
        out.push('\n');
        return out;
    }
    for item in view.items.iter() {
        render_item(&mut out, item, all_details || item.expanded);
    }
    if !view.plan.controls.is_empty() {
        out.push('\n');
        out.push_str(&render_controls(&view.plan));
        out.push('\n');
    }
    out
}

/// Lists the filter catalog with each label's current mark.
pub fn render_catalog(filters: &FilterState) -> String {
    let mut out = String::new();
    for group in CATALOG {
        out.push_str(&format!("{}:\n ", group.title.bold()));
        for label in group.labels {
            let mark = filters.mark(label);
            let chip = format!("[{}]{}", mark.symbol(), label);
            let chip = match mark {
                FilterMark::Neutral => chip.normal(),
                FilterMark::Included => chip.green(),
                FilterMark::Excluded => chip.red().strikethrough(),
            };
            out.push(' ');
            out.push_str(&chip.to_string());
        }
        out.push('\n');
    }
    out
}
