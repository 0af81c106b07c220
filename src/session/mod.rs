use thiserror::Error;

use crate::model::Record;
use crate::utils;
use crate::view::{self, ProjectedView, ViewState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', type 'help' for the list")]
    UnknownCommand(String),

    #[error("invalid page number '{0}', expected a positive integer")]
    InvalidPage(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Load,
    Search(String),
    Gender(Option<String>),
    Next,
    Previous,
    Page(usize),
    Genders,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, SessionError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(SessionError::Empty);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            "load" | "reload" | "l" => Ok(Self::Load),
            "search" | "s" | "/" => Ok(Self::Search(rest.to_string())),
            "gender" | "g" => Ok(Self::Gender(utils::gender_from_input(rest))),
            "next" | "n" => Ok(Self::Next),
            "prev" | "previous" | "p" => Ok(Self::Previous),
            "page" => match rest.parse::<usize>() {
                Ok(page) if page > 0 => Ok(Self::Page(page)),
                _ => Err(SessionError::InvalidPage(rest.to_string())),
            },
            "genders" => Ok(Self::Genders),
            "status" => Ok(Self::Status),
            "help" | "h" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => match other.parse::<usize>() {
                Ok(page) if page > 0 => Ok(Self::Page(page)),
                _ => Err(SessionError::UnknownCommand(word.to_string())),
            },
        }
    }
}

pub const HELP: &str = "\
Commands:
  load               fetch every page of the listing (resets search, gender and page)
  search <text>      filter by name (case-insensitive); 'search' alone clears
  gender <value>     filter by gender ('unspecified' matches n/a); 'gender' alone clears
  genders            list the gender values present
  next | prev        move one page forward or back
  page <n> | <n>     jump to page n
  status             show load state and counts
  help               show this list
  quit               leave";

#[derive(Clone, Debug)]
pub struct Session {
    view: ViewState,
    // selection from the command line, applied once the first load lands
    startup: Option<ViewState>,
    page_size: usize,
}

impl Session {
    pub fn new(page_size: usize) -> Self {
        Self::with_view(ViewState::default(), page_size)
    }

    pub fn with_view(view: ViewState, page_size: usize) -> Self {
        let startup = (view != ViewState::default()).then(|| view.clone());
        Self {
            view,
            startup,
            page_size: page_size.max(1),
        }
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn begin_load(&mut self) {
        self.view.reset();
    }

    pub fn finish_load(&mut self) {
        if let Some(view) = self.startup.take() {
            self.view = view;
        }
    }

    // false when nothing changed
    pub fn apply(&mut self, command: &Command, records: &[Record]) -> bool {
        match command {
            Command::Search(term) => {
                self.view.set_search(term.clone());
                true
            }
            Command::Gender(gender) => {
                self.view.set_gender(gender.clone());
                true
            }
            Command::Next => {
                let total = self.total_pages(records);
                self.view.next(total)
            }
            Command::Previous => self.view.previous(),
            Command::Page(page) => {
                let total = self.total_pages(records);
                let before = self.view.page_number;
                self.view.goto(*page, total) != before
            }
            Command::Load | Command::Genders | Command::Status | Command::Help | Command::Quit => {
                false
            }
        }
    }

    pub fn project(&mut self, records: &[Record]) -> ProjectedView {
        let projected = view::project(records, &self.view, self.page_size);
        self.view.page_number = projected.page_number;
        projected
    }

    fn total_pages(&self, records: &[Record]) -> usize {
        view::project(records, &self.view, self.page_size).total_pages
    }
}
