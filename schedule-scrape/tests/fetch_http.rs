//! Integration tests for the HTTP fetch pipeline.
//!
//! A local `wiremock` server stands in for the college site, so these tests
//! exercise the real client, extractor and pacing without network access.

use std::time::Duration;

use schedule_scrape::{FetchOutcome, Fetcher, ScrapeConfig, Weekday};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SCHEDULE_PAGE: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"></head><body>
  <center>Расписание занятий на 01.12.2025-06.12.2025</center>
  <table>
    <tr>
      <td id="monday"><ul>
        <li>1. Математика, Иванов И.И.</li>
        <li>2. Физика, Петров П.П.</li>
      </ul></td>
      <td id="tuesday"><ul></ul></td>
      <td id="wednesday"><ul><li>1. История, Сидорова А.А.</li></ul></td>
      <td id="thursday"><ul></ul></td>
      <td id="friday"><ul></ul></td>
      <td id="saturday"><ul><li>3. Физкультура</li></ul></td>
    </tr>
  </table>
</body></html>"#;

fn config_for(server: &MockServer) -> ScrapeConfig {
    ScrapeConfig {
        base_url: format!("{}/raspisanie", server.uri()),
        timeout_seconds: 1,
        user_agent: Some("ScheduleBotTest/1.0".into()),
        batch_delay_ms: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn fetches_and_extracts_published_schedule() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raspisanie"))
        .and(query_param("group", "2ис1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(SCHEDULE_PAGE),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::http(&config_for(&server)).expect("fetcher");
    let outcome = fetcher.fetch_one("2ис1").await;

    let FetchOutcome::Published(schedule) = outcome else {
        panic!("expected a published schedule, got {outcome:?}");
    };
    assert_eq!(schedule.date_range, "01.12.2025-06.12.2025");
    assert_eq!(schedule.days.len(), 6);
    assert_eq!(
        schedule.days[&Weekday::Monday].lessons,
        vec!["1. Математика, Иванов И.И.", "2. Физика, Петров П.П."]
    );
    assert_eq!(schedule.days[&Weekday::Monday].date, "1 декабря 2025");
    assert_eq!(schedule.days[&Weekday::Saturday].date, "6 декабря 2025");
    assert!(schedule.days[&Weekday::Tuesday].lessons.is_empty());
}

#[tokio::test]
async fn server_error_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = Fetcher::http(&config_for(&server)).expect("fetcher");
    assert!(matches!(
        fetcher.fetch_one("1а1").await,
        FetchOutcome::TransportError(_)
    ));
}

#[tokio::test]
async fn slow_server_hits_the_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(SCHEDULE_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = Fetcher::http(&config_for(&server)).expect("fetcher");
    let started = std::time::Instant::now();
    let outcome = fetcher.fetch_one("1а1").await;

    assert!(matches!(outcome, FetchOutcome::TransportError(_)));
    assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn page_without_day_cells_is_not_published() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Расписание пока не опубликовано</p></body></html>",
        ))
        .mount(&server)
        .await;

    let fetcher = Fetcher::http(&config_for(&server)).expect("fetcher");
    assert_eq!(fetcher.fetch_one("4р3").await, FetchOutcome::NotPublished);
}

#[tokio::test]
async fn fetch_all_issues_one_request_per_group() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("group", "1а1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SCHEDULE_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("group", "1бд1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::http(&config_for(&server)).expect("fetcher");
    let outcomes = fetcher.fetch_all(["1а1", "1бд1"]).await;

    assert!(outcomes["1а1"].is_published());
    assert!(matches!(outcomes["1бд1"], FetchOutcome::TransportError(_)));
}
