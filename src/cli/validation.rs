use crate::cli::args::CliArgs;
use crate::output::OutputFormat;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.url.as_deref() {
        crate::utils::parse_listing_url(raw).map_err(|e| format!("invalid --url '{raw}': {e}"))?;
    }
    if args.page_size == Some(0) {
        return Err("invalid --page-size, expected positive integer".to_string());
    }
    if args.page == Some(0) {
        return Err("invalid --page, expected positive integer".to_string());
    }
    if args.max_pages == Some(0) {
        return Err("invalid --max-pages, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid --timeout, expected positive integer".to_string());
    }
    if let Some(raw) = args.format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --format '{raw}', expected text, json, or names"
            ));
        }
    }
    if let Some(raw) = args.header.as_deref() {
        crate::utils::parse_header_line(raw)
            .map_err(|e| format!("invalid --header '{raw}': {e}"))?;
    }
    Ok(())
}
