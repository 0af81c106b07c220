use std::collections::HashMap;
use std::error::Error;

use rollcall::fetcher::{FetchError, PageFetcher, PageSource};
use rollcall::model::{Page, Record};
use rollcall::view::{gender_options, project, ViewState};

struct InlinePages(HashMap<String, Page>);

impl PageSource for InlinePages {
    async fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        self.0.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut pages = HashMap::new();
    pages.insert(
        "mem://people/1".to_string(),
        Page::new(
            vec![Record::new("Yoda", "male"), Record::new("R2-D2", "n/a")],
            Some("mem://people/2"),
        ),
    );
    pages.insert(
        "mem://people/2".to_string(),
        Page::new(vec![Record::new("Ahsoka Tano", "female")], None),
    );

    let fetcher = PageFetcher::new(InlinePages(pages));
    let records = fetcher.load("mem://people/1").await?;
    let view = project(&records, &ViewState::default(), 2);

    println!("Genders: {}", gender_options(&records).join(", "));
    for record in view.visible_records.iter() {
        println!("{}", record.name);
    }
    println!("page {}/{}", view.page_number, view.total_pages);

    Ok(())
}
