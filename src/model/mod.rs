use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const UNSPECIFIED_GENDER: &str = "n/a";

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Record {
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub mass: String,
    #[serde(default)]
    pub hair_color: String,
    #[serde(default)]
    pub eye_color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    pub fn new(name: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender: gender.into(),
            ..Self::default()
        }
    }

    pub fn has_unspecified_gender(&self) -> bool {
        self.gender == UNSPECIFIED_GENDER
    }
}

pub type RecordSet = Vec<Record>;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Page {
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub next: Option<String>,
}

impl Page {
    pub fn new(results: Vec<Record>, next: Option<&str>) -> Self {
        Self {
            results,
            next: next.map(str::to_string),
        }
    }

    // blank counts as exhausted
    pub fn next_url(&self) -> Option<&str> {
        self.next
            .as_deref()
            .map(str::trim)
            .filter(|next| !next.is_empty())
    }
}
