use crate::model::UNSPECIFIED_GENDER;

pub const UNSPECIFIED_LABEL: &str = "unspecified";

pub fn gender_label(gender: &str) -> &str {
    if gender == UNSPECIFIED_GENDER {
        UNSPECIFIED_LABEL
    } else {
        gender
    }
}

// empty input clears the filter
pub fn gender_from_input(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.eq_ignore_ascii_case(UNSPECIFIED_LABEL) {
        return Some(UNSPECIFIED_GENDER.to_string());
    }
    Some(trimmed.to_string())
}

pub fn parse_header_line(value: &str) -> Result<(String, String), String> {
    let (key, val) = value
        .split_once(':')
        .ok_or_else(|| "expected format 'Key: Value'".to_string())?;
    let key = key.trim();
    if key.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((key.to_string(), val.trim().to_string()))
}

pub fn parse_listing_url(value: &str) -> Result<reqwest::Url, String> {
    let url = reqwest::Url::parse(value.trim()).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme '{other}'")),
    }
}
