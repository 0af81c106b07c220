use colored::Colorize;
use serde::Serialize;

use crate::model::Record;
use crate::utils::gender_label;
use crate::view::{ProjectedView, ViewState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Names,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" | "cards" => Some(Self::Text),
            "json" => Some(Self::Json),
            "names" | "list" => Some(Self::Names),
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

#[derive(Serialize)]
struct PageReport<'a> {
    search_term: &'a str,
    gender_filter: Option<&'a str>,
    #[serde(flatten)]
    projected: &'a ProjectedView,
}

/// "Showing 12 of 25 character(s) matching "sky" • Gender: unspecified"
pub fn summary_line(projected: &ProjectedView, view: &ViewState) -> String {
    let mut line = format!(
        "Showing {} of {} character(s)",
        projected.visible_records.len(),
        projected.total_matching
    );
    if !view.search_term.is_empty() {
        line.push_str(&format!(" matching \"{}\"", view.search_term));
    }
    if let Some(gender) = view.gender_filter.as_deref() {
        line.push_str(&format!(" • Gender: {}", gender_label(gender)));
    }
    line
}

pub fn page_strip(projected: &ProjectedView) -> String {
    if projected.total_pages <= 1 {
        return String::new();
    }
    let prev = if projected.has_previous() {
        "‹ prev".bold().to_string()
    } else {
        "‹ prev".dimmed().to_string()
    };
    let next = if projected.has_next() {
        "next ›".bold().to_string()
    } else {
        "next ›".dimmed().to_string()
    };
    let pages = projected
        .page_numbers()
        .map(|page| {
            if page == projected.page_number {
                format!("[{page}]").magenta().bold().to_string()
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("{prev}  {pages}  {next}")
}

fn render_card(out: &mut String, record: &Record) {
    out.push_str(&format!("{}\n", record.name.magenta().bold()));
    out.push_str(&format!(
        "  {:<8} {}\n",
        "gender:".dimmed(),
        gender_label(&record.gender)
    ));
    out.push_str(&format!("  {:<8} {}\n", "born:".dimmed(), record.birth_year));
    out.push_str(&format!("  {:<8} {} cm\n", "height:".dimmed(), record.height));
    out.push_str(&format!("  {:<8} {} kg\n", "mass:".dimmed(), record.mass));
    out.push_str(&format!("  {:<8} {}\n", "hair:".dimmed(), record.hair_color));
    out.push_str(&format!("  {:<8} {}\n", "eyes:".dimmed(), record.eye_color));
}

pub fn render_text(projected: &ProjectedView, view: &ViewState) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&summary_line(projected, view));
    out.push_str("\n\n");
    if projected.is_empty() {
        out.push_str(&format!(
            "{}\n",
            "No results: no characters match the applied filters.".yellow()
        ));
    }
    for record in &projected.visible_records {
        render_card(&mut out, record);
        out.push('\n');
    }
    let strip = page_strip(projected);
    if !strip.is_empty() {
        out.push_str(&strip);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_names(projected: &ProjectedView) -> Vec<u8> {
    let mut out = String::new();
    for record in &projected.visible_records {
        out.push_str(&record.name);
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render_json(projected: &ProjectedView, view: &ViewState) -> Vec<u8> {
    let report = PageReport {
        search_term: &view.search_term,
        gender_filter: view.gender_filter.as_deref(),
        projected,
    };
    let mut out = serde_json::to_vec_pretty(&report).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

pub fn render(format: OutputFormat, projected: &ProjectedView, view: &ViewState) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(projected, view),
        OutputFormat::Json => render_json(projected, view),
        OutputFormat::Names => render_names(projected),
    }
}

pub fn render_gender_options(options: &[String]) -> String {
    let mut out = String::new();
    for gender in options {
        if gender.as_str() == gender_label(gender) {
            out.push_str(&format!("{gender}\n"));
        } else {
            out.push_str(&format!("{} ({gender})\n", gender_label(gender)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::project;

    fn sample() -> Vec<Record> {
        let mut luke = Record::new("Luke Skywalker", "male");
        luke.height = "172".into();
        luke.extra
            .insert("skin_color".into(), serde_json::Value::from("fair"));
        vec![
            luke,
            Record::new("R2-D2", "n/a"),
            Record::new("Leia Organa", "female"),
        ]
    }

    #[test]
    fn format_parsing() {
        assert_eq!(OutputFormat::parse(" JSON "), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse("names"), Some(OutputFormat::Names));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert_eq!(infer_format_from_path("out.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("out.csv"), None);
    }

    #[test]
    fn summary_mentions_term_and_gender_label() {
        colored::control::set_override(false);
        let records = sample();
        let mut view = ViewState::default();
        view.set_search("r");
        view.set_gender(Some("n/a".into()));
        let projected = project(&records, &view, 12);
        assert_eq!(
            summary_line(&projected, &view),
            "Showing 1 of 1 character(s) matching \"r\" • Gender: unspecified"
        );
    }

    #[test]
    fn names_render_in_projected_order() {
        let records = sample();
        let projected = project(&records, &ViewState::default(), 12);
        let out = String::from_utf8(render_names(&projected)).unwrap();
        assert_eq!(out, "Leia Organa\nLuke Skywalker\nR2-D2\n");
    }

    #[test]
    fn json_carries_counts_and_extra_fields() {
        let records = sample();
        let view = ViewState::default();
        let projected = project(&records, &view, 2);
        let value: serde_json::Value =
            serde_json::from_slice(&render_json(&projected, &view)).unwrap();
        assert_eq!(value["total_matching"], 3);
        assert_eq!(value["total_pages"], 2);
        assert_eq!(value["page_number"], 1);
        assert_eq!(value["gender_filter"], serde_json::Value::Null);
        assert_eq!(value["visible_records"][1]["skin_color"], "fair");
    }

    #[test]
    fn empty_page_says_so() {
        colored::control::set_override(false);
        let mut view = ViewState::default();
        view.set_search("vader");
        let projected = project(&sample(), &view, 12);
        let out = String::from_utf8(render_text(&projected, &view)).unwrap();
        assert!(out.contains("No results"));
        assert!(page_strip(&projected).is_empty());
    }

    #[test]
    fn gender_options_show_labels() {
        let out = render_gender_options(&["female".to_string(), "n/a".to_string()]);
        assert_eq!(out, "female\nunspecified (n/a)\n");
    }
}
