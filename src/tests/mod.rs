use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::catalog::Catalog;
use crate::fetcher::{FetchError, HttpPageSource, PageFetcher};
use crate::runner::{Options, Runner};
use crate::session::{Command, Session};

/// Serve one canned response per connection, in order, and count requests.
async fn serve<F>(build: F) -> (String, Arc<AtomicUsize>)
where
    F: FnOnce(&str) -> Vec<(u16, String)>,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let responses = build(&base);
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            counter.fetch_add(1, Ordering::SeqCst);
            let head = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(body.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (base, hits)
}

fn people_page(names: &[&str], next: Option<String>) -> String {
    let results: Vec<_> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "gender": if name.starts_with('R') { "n/a" } else { "male" },
                "birth_year": "unknown",
                "height": "100",
                "mass": "50",
                "hair_color": "none",
                "eye_color": "red",
                "homeworld": "https://swapi.dev/api/planets/1/"
            })
        })
        .collect();
    serde_json::json!({ "count": 0, "next": next, "previous": null, "results": results }).to_string()
}

fn http_fetcher() -> PageFetcher<HttpPageSource> {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    PageFetcher::new(HttpPageSource::new(client))
}

#[tokio::test]
async fn http_source_follows_next_links() {
    let (base, hits) = serve(|base| {
        vec![
            (
                200,
                people_page(&["Luke", "R2-D2"], Some(format!("{base}/people/?page=2"))),
            ),
            (200, people_page(&["Biggs"], None)),
        ]
    })
    .await;

    let records = http_fetcher()
        .load(&format!("{base}/people/"))
        .await
        .unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Luke", "R2-D2", "Biggs"]);
    assert_eq!(records[0].extra["homeworld"], "https://swapi.dev/api/planets/1/");
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn http_source_reports_error_status() {
    let (base, hits) = serve(|base| {
        vec![
            (
                200,
                people_page(&["Luke"], Some(format!("{base}/people/?page=2"))),
            ),
            (500, "{}".to_string()),
        ]
    })
    .await;

    let err = http_fetcher()
        .load(&format!("{base}/people/"))
        .await
        .unwrap_err();
    assert_eq!(err.page, 2);
    assert!(matches!(err.source, FetchError::Status { status: 500, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn http_source_reports_undecodable_body() {
    let (base, _) = serve(|_| vec![(200, "<html>maintenance</html>".to_string())]).await;
    let err = http_fetcher()
        .load(&format!("{base}/people/"))
        .await
        .unwrap_err();
    assert_eq!(err.page, 1);
    assert!(matches!(err.source, FetchError::Decode { .. }));
}

#[tokio::test]
async fn runner_loads_and_projects_over_http() {
    let (base, _) = serve(|base| {
        vec![
            (
                200,
                people_page(&["Wedge", "R5-D4"], Some(format!("{base}/people/?page=2"))),
            ),
            (200, people_page(&["R2-D2", "Leia"], None)),
        ]
    })
    .await;

    let mut options = Options {
        start_url: format!("{base}/people/"),
        page_size: 1,
        ..Options::default()
    };
    options.view.set_gender(Some("n/a".to_string()));
    let result = Runner::new(options)
        .unwrap()
        .run_with(&http_fetcher())
        .await
        .unwrap();

    assert_eq!(result.records.len(), 4);
    assert_eq!(result.projected.total_matching, 2);
    assert_eq!(result.projected.total_pages, 2);
    assert_eq!(result.projected.visible_records[0].name, "R2-D2");
    assert_eq!(result.gender_options, vec!["male".to_string(), "n/a".to_string()]);
}

#[tokio::test]
async fn catalog_and_session_walk_through_a_listing() {
    let catalog = Catalog::new();
    let fetcher = PageFetcher::new(crate::fetcher::testing::three_page_listing());
    let mut session = Session::new(12);

    session.apply(&Command::Search("zzz".into()), &[]);
    session.begin_load();
    catalog.load(&fetcher, "http://api/people/").await.unwrap();
    let records = catalog.snapshot().await;

    let first = session.project(&records);
    assert_eq!(records.len(), 25);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.visible_records.len(), 12);

    session.apply(&Command::Page(3), &records);
    assert_eq!(session.project(&records).visible_records.len(), 1);

    session.apply(&Command::Search("B0".into()), &records);
    let searched = session.project(&records);
    assert_eq!(searched.page_number, 1);
    assert_eq!(searched.total_matching, 10);
    assert!(searched
        .visible_records
        .iter()
        .all(|r| r.name.to_lowercase().contains("b0")));
}

#[tokio::test]
async fn failed_reload_keeps_what_the_session_sees() {
    let catalog = Catalog::new();
    let good = PageFetcher::new(crate::fetcher::testing::three_page_listing());
    catalog.load(&good, "http://api/people/").await.unwrap();

    let bad = PageFetcher::new(
        crate::fetcher::testing::FakeSource::default().failing("http://api/people/", 503),
    );
    assert!(catalog.load(&bad, "http://api/people/").await.is_err());

    let mut session = Session::new(12);
    let view = session.project(&catalog.snapshot().await);
    assert_eq!(view.total_matching, 25);
}
