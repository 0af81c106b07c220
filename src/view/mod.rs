pub mod collate;

use itertools::Itertools;
use serde::Serialize;

use crate::model::Record;

pub use collate::CollationKey;

pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub search_term: String,
    pub gender_filter: Option<String>,
    pub page_number: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            gender_filter: None,
            page_number: 1,
        }
    }
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.page_number = 1;
    }

    pub fn set_gender(&mut self, gender: Option<String>) {
        self.gender_filter = gender.filter(|g| !g.is_empty());
        self.page_number = 1;
    }

    pub fn clamp(&mut self, total_pages: usize) {
        self.page_number = clamp_page(self.page_number, total_pages);
    }

    pub fn previous(&mut self) -> bool {
        if self.page_number <= 1 {
            return false;
        }
        self.page_number -= 1;
        true
    }

    pub fn next(&mut self, total_pages: usize) -> bool {
        if self.page_number >= total_pages {
            return false;
        }
        self.page_number += 1;
        true
    }

    pub fn goto(&mut self, page: usize, total_pages: usize) -> usize {
        self.page_number = clamp_page(page, total_pages);
        self.page_number
    }

    pub fn matches(&self, record: &Record) -> bool {
        let gender_ok = match self.gender_filter.as_deref() {
            None | Some("") => true,
            Some(gender) => record.gender == gender,
        };
        gender_ok && name_contains(&record.name, &self.search_term)
    }
}

fn name_contains(name: &str, term: &str) -> bool {
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

fn clamp_page(page: usize, total_pages: usize) -> usize {
    if total_pages == 0 {
        1
    } else {
        page.clamp(1, total_pages)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProjectedView {
    pub visible_records: Vec<Record>,
    pub total_matching: usize,
    pub total_pages: usize,
    pub page_number: usize,
    pub page_size: usize,
}

impl ProjectedView {
    pub fn is_empty(&self) -> bool {
        self.visible_records.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn page_numbers(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.total_pages
    }
}

// a zero page_size counts as 1
pub fn project(records: &[Record], view: &ViewState, page_size: usize) -> ProjectedView {
    let page_size = page_size.max(1);

    let mut matching: Vec<&Record> = records.iter().filter(|r| view.matches(r)).collect();
    matching.sort_by_cached_key(|r| CollationKey::new(&r.name));

    let total_matching = matching.len();
    let total_pages = total_matching.div_ceil(page_size);
    let page_number = clamp_page(view.page_number, total_pages);

    let start = (page_number - 1) * page_size;
    let visible_records = matching
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    ProjectedView {
        visible_records,
        total_matching,
        total_pages,
        page_number,
        page_size,
    }
}

pub fn gender_options(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.gender.as_str())
        .unique()
        .sorted()
        .map(str::to_string)
        .collect()
}
