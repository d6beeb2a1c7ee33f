//! Integration tests for rendering whole posts from API JSON.

use chrono::DateTime;
use tumblr_post_archiver::assemble::PostAssembler;
use tumblr_post_archiver::npf::Post;
use tumblr_post_archiver::polls::PollClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn offline_assembler() -> PostAssembler<PollClient> {
    PostAssembler::new(PollClient::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9/api/v2",
        None,
    ))
}

fn post(value: serde_json::Value) -> Post {
    serde_json::from_value(value).expect("Failed to decode post")
}

/// Index of `needle` in `haystack`, failing the test if absent.
fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {haystack}"))
}

#[tokio::test]
async fn test_reblog_chain_renders_oldest_first() {
    let p = post(serde_json::json!({
        "id": "300",
        "blog_name": "carol",
        "reblogged_root_timestamp": 1_704_467_040,
        "date": "2024-01-07 10:00:00 GMT",
        "content": [{"type": "text", "text": "third"}],
        "trail": [
            {"blog": {"name": "alice"}, "post": {"id": "100"},
             "content": [{"type": "text", "text": "first"}]},
            {"blog": {"name": "bob"}, "post": {"id": "200", "date": "2024-01-06 08:30:00 GMT"},
             "content": [{"type": "text", "text": "second"}]}
        ]
    }));

    let html = offline_assembler().render_body(&p).await.html;

    let op = position(&html, "<p class=\"user-info\">alice</p>");
    let first = position(&html, "<p>first</p>");
    let bob = position(&html, "<p class=\"user-info\">bob</p>");
    let second = position(&html, "<p>second</p>");
    let carol = position(&html, "<p class=\"user-info\">carol</p>");
    let third = position(&html, "<p>third</p>");
    assert!(op < first && first < bob && bob < second && second < carol && carol < third);

    assert!(html.contains("Posted · <span>January 05, 2024 · 3:04 PM</span>"));
    assert!(html.contains("Reblogged · <span>January 06, 2024 · 8:30 AM</span>"));
    assert!(html.contains("Reblogged · <span>January 07, 2024 · 10:00 AM</span>"));
    assert_eq!(html.matches("op-block").count(), 1);
    assert_eq!(html.matches("class=\"reblog-block\"").count(), 2);
}

#[tokio::test]
async fn test_tag_only_final_reblog_is_suppressed() {
    let p = post(serde_json::json!({
        "id": 2,
        "blog_name": "tagger",
        "tags": ["keep"],
        "content": [],
        "trail": [
            {"blog": {"name": "alice"}, "post": {"id": "1"},
             "content": [{"type": "text", "text": "original"}]}
        ]
    }));

    let html = offline_assembler().render_body(&p).await.html;
    assert!(html.contains("<p>original</p>"));
    assert!(!html.contains("tagger"));
    assert!(!html.contains("reblog-block"));
}

#[tokio::test]
async fn test_formatting_lists_and_fold() {
    let p = post(serde_json::json!({
        "id": 5,
        "blog_name": "writer",
        "content": [
            {"type": "text", "text": "Intro -> here",
             "formatting": [{"start": 0, "end": 5, "type": "bold"}]},
            {"type": "text", "subtype": "ordered-list-item", "text": "one"},
            {"type": "text", "subtype": "ordered-list-item", "text": "two"},
            {"type": "text", "subtype": "heading1", "text": "Later"},
            {"type": "image", "media": [{"url": "https://media.test/a.jpg"}], "alt_text": "A"},
            {"type": "image", "media": [{"url": "https://media.test/b.jpg"}]}
        ],
        "layout": [{"type": "rows", "truncate_after": 3,
                    "display": [{"blocks": [0]}, {"blocks": [1]}, {"blocks": [2]},
                                {"blocks": [3]}, {"blocks": [4, 5]}]}]
    }));

    let rendered = offline_assembler().render_body(&p).await;
    let html = rendered.html;

    assert!(html.contains("<strong>Intro</strong> \u{1F852} here"));
    assert!(html.contains("<ol>\n<li>one</li>\n<li>two</li>\n</ol>"));
    let (visible, folded) = html.split_once("<details>").expect("expected a fold");
    assert!(visible.contains("<h1>Later</h1>"));
    assert!(folded.contains("<summary>Keep Reading</summary>"));
    assert!(folded.contains("<div class=\"image-row-2\">"));
    assert!(folded.contains("alt=\"Tumblr Image\""));
    assert_eq!(
        rendered.media,
        vec!["https://media.test/a.jpg", "https://media.test/b.jpg"]
    );
}

#[tokio::test]
async fn test_live_poll_results_in_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/polls/pollster/77/poll-1/results"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meta": {"status": 200, "msg": "OK"},
            "response": {"results": {"yes": 3000, "no": 1000}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let assembler = PostAssembler::new(PollClient::new(
        reqwest::Client::new(),
        format!("{}/api/v2", server.uri()),
        Some("key".to_string()),
    ));
    let p = post(serde_json::json!({
        "id": 77,
        "blog_name": "pollster",
        "tags": ["poll"],
        "timestamp": 1_709_283_600,
        "content": [{"type": "poll", "question": "Tea or coffee?", "client_id": "poll-1",
                     "answers": [{"answer_text": "Tea", "client_id": "yes"},
                                 {"answer_text": "Coffee", "client_id": "no"}]}]
    }));

    let archived_at = DateTime::from_timestamp(1_709_283_600, 0).expect("valid timestamp");
    let archived = assembler.assemble(&p, archived_at).await;

    assert!(archived.body_html.contains("data-percentage=\"75\">Tea"));
    assert!(archived.body_html.contains("data-percentage=\"25\">Coffee"));
    assert!(archived.body_html.contains("4,000 votes total"));

    let page = archived.render_page();
    assert!(page.contains("<title>pollster - post 77</title>"));
    assert!(page.contains("<link rel=\"stylesheet\" href=\"../style.css\">"));
    assert!(page.contains("<main class=\"archive-post\">"));
    assert!(page.contains("#poll"));
}

#[tokio::test]
async fn test_failed_poll_fetch_renders_zero_votes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let assembler = PostAssembler::new(PollClient::new(
        reqwest::Client::new(),
        format!("{}/api/v2", server.uri()),
        Some("key".to_string()),
    ));
    let p = post(serde_json::json!({
        "id": 8,
        "blog_name": "pollster",
        "content": [{"type": "poll", "client_id": "poll-1",
                     "answers": [{"answer_text": "A", "client_id": "a"}]}]
    }));

    let html = assembler.render_body(&p).await.html;
    assert!(html.contains("<strong>Poll</strong>"));
    assert!(html.contains("(0%)"));
    assert!(!html.contains("votes total"));
}

#[tokio::test]
async fn test_malformed_block_does_not_drop_post() {
    let p = post(serde_json::json!({
        "id": 9,
        "blog_name": "writer",
        "content": [
            {"type": "text", "text": "before"},
            {"text": "no type field"},
            {"type": "image", "media": [{"url": "https://media.test/c.jpg"}]}
        ],
        "layout": [{"type": "rows", "display": [{"blocks": [0]}, {"blocks": [1, 2]}]}]
    }));

    let rendered = offline_assembler().render_body(&p).await;
    assert!(rendered.html.contains("<p>before</p>"));
    assert!(rendered.html.contains("src=\"https://media.test/c.jpg\""));
    assert!(!rendered.html.contains("no type field"));
    assert_eq!(rendered.media, vec!["https://media.test/c.jpg"]);
}
