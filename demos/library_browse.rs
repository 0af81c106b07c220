use rollcall::runner::{Options, Runner};
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut options = Options {
        page_size: 5,
        timeout_seconds: 15,
        ..Options::default()
    };
    options.view.set_search("sky");
    let runner = Runner::new(options)?;
    let result = runner.run().await?;

    println!("Loaded: {}", result.records.len());
    println!(
        "Matching: {} ({} page(s))",
        result.projected.total_matching, result.projected.total_pages
    );
    for record in result.projected.visible_records.iter() {
        println!("{} ({})", record.name, record.gender);
    }

    Ok(())
}
