//! Wire-level tests for the Octocrab gateway against a mock GitHub server.

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

use rstest::{fixture, rstest};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{CommentGateway, LabelGateway, OctocrabGateway};
use crate::github::error::GitHubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::models::Label;
use crate::github::pagination::PageRequest;

const EXPECTED_RATE_LIMIT_RESET_AT: u64 = 1_700_000_000;

struct GatewayFixture {
    runtime: Runtime,
    server: MockServer,
    locator: PullRequestLocator,
    gateway: OctocrabGateway,
}

impl GatewayFixture {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn mount(&self, mock: Mock) {
        self.block_on(mock.mount(&self.server));
    }
}

#[fixture]
fn gateway_fixture() -> FixtureResult<GatewayFixture> {
    let token = PersonalAccessToken::new("valid-token")?;
    let runtime = Runtime::new()?;
    let server = runtime.block_on(MockServer::start());
    let locator = PullRequestLocator::new(&format!("{}/api/v3", server.uri()), "owner/repo", 42)?;
    let _guard = runtime.enter();
    let gateway = OctocrabGateway::for_token(&token, &locator)?;
    Ok(GatewayFixture {
        runtime,
        server,
        locator,
        gateway,
    })
}

#[rstest]
fn list_comments_requests_the_given_page(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/owner/repo/issues/42/comments"))
            .and(query_param("per_page", "100"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 7, "body": "Link to lane: x", "user": { "login": "github-actions[bot]" } },
                { "id": 8, "body": null, "user": null }
            ]))),
    );

    let comments = fixture
        .block_on(
            fixture
                .gateway
                .list_comments(&fixture.locator, PageRequest::default().next()),
        )
        .expect("request should succeed");

    assert_eq!(comments.len(), 2);
    let first = comments.first().expect("first comment");
    assert_eq!(first.id, 7);
    assert_eq!(first.author.as_deref(), Some("github-actions[bot]"));
    let second = comments.get(1).expect("second comment");
    assert!(second.author.is_none(), "missing user should map to None");
}

#[rstest]
fn update_comment_patches_the_comment_body(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("PATCH"))
            .and(path("/api/v3/repos/owner/repo/issues/comments/7"))
            .and(body_json(json!({ "body": "new body" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7, "body": "new body", "user": { "login": "github-actions[bot]" }
            }))),
    );

    let comment = fixture
        .block_on(
            fixture
                .gateway
                .update_comment(&fixture.locator, 7, "new body"),
        )
        .expect("update should succeed");

    assert_eq!(comment.body.as_deref(), Some("new body"));
}

#[rstest]
fn create_label_posts_name_colour_and_description(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/owner/repo/labels"))
            .and(body_json(json!({
                "name": "widget@patch",
                "description": "org.scope/widget requires a patch version bump",
                "color": "0e8a16"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "name": "widget@patch", "description": null, "color": "0e8a16"
            }))),
    );

    let label = Label {
        name: "widget@patch".to_owned(),
        description: Some("org.scope/widget requires a patch version bump".to_owned()),
        color: Some("0e8a16".to_owned()),
    };

    fixture
        .block_on(fixture.gateway.create_label(&fixture.locator, &label))
        .expect("create should succeed");
}

#[rstest]
fn create_label_maps_existing_label_to_validation_error(
    gateway_fixture: FixtureResult<GatewayFixture>,
) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/owner/repo/labels"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Validation Failed",
                "errors": [{ "resource": "Label", "code": "already_exists", "field": "name" }],
                "documentation_url": "https://docs.github.com/rest/issues/labels"
            }))),
    );

    let error = fixture
        .block_on(
            fixture
                .gateway
                .create_label(&fixture.locator, &Label::named("widget@patch")),
        )
        .expect_err("create should fail");

    assert!(
        matches!(error, GitHubError::Validation { .. }),
        "expected Validation, got {error:?}"
    );
}

#[rstest]
fn add_labels_sends_one_batched_request(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("POST"))
            .and(path("/api/v3/repos/owner/repo/issues/42/labels"))
            .and(body_json(json!({ "labels": ["widget@patch", "button@patch"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "name": "widget@patch", "description": null, "color": "0e8a16" },
                { "name": "button@patch", "description": null, "color": "0e8a16" }
            ])))
            .expect(1),
    );

    let names = vec!["widget@patch".to_owned(), "button@patch".to_owned()];
    fixture
        .block_on(fixture.gateway.add_labels(&fixture.locator, &names))
        .expect("attach should succeed");
}

#[rstest]
fn remove_label_maps_missing_label_to_not_found(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("DELETE"))
            .and(path("/api/v3/repos/owner/repo/issues/42/labels/widget@patch"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Label does not exist" })),
            ),
    );

    let error = fixture
        .block_on(
            fixture
                .gateway
                .remove_label(&fixture.locator, "widget@patch"),
        )
        .expect_err("remove should fail");

    assert!(
        matches!(error, GitHubError::NotFound { .. }),
        "expected NotFound, got {error:?}"
    );
}

#[rstest]
fn rate_limited_calls_carry_reset_information(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/owner/repo/labels"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "message": "API rate limit exceeded for user",
                "documentation_url": "https://docs.github.com/rest/rate-limit"
            }))),
    );
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/rate_limit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resources": {
                    "core": { "limit": 5000, "used": 5000, "remaining": 0, "reset": EXPECTED_RATE_LIMIT_RESET_AT },
                    "search": { "limit": 30, "used": 0, "remaining": 30, "reset": EXPECTED_RATE_LIMIT_RESET_AT }
                },
                "rate": { "limit": 5000, "used": 5000, "remaining": 0, "reset": EXPECTED_RATE_LIMIT_RESET_AT }
            }))),
    );

    let error = fixture
        .block_on(
            fixture
                .gateway
                .list_repository_labels(&fixture.locator, PageRequest::default()),
        )
        .expect_err("request should fail");

    match error {
        GitHubError::RateLimitExceeded {
            rate_limit,
            message,
        } => {
            let info = rate_limit.expect("expected rate_limit info to be populated");
            assert_eq!(info.reset_at(), EXPECTED_RATE_LIMIT_RESET_AT);
            assert!(info.is_exhausted());
            assert!(
                message.contains(&EXPECTED_RATE_LIMIT_RESET_AT.to_string()),
                "expected message to include reset time, got `{message}`"
            );
            assert!(
                message.contains("quota exhausted"),
                "expected message to flag the exhausted quota, got `{message}`"
            );
        }
        other => panic!("expected RateLimitExceeded, got {other:?}"),
    }
}

#[rstest]
fn bad_credentials_map_to_authentication(gateway_fixture: FixtureResult<GatewayFixture>) {
    let fixture = gateway_fixture.expect("fixture should succeed");
    fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/owner/repo/issues/42/labels"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })),
            ),
    );

    let error = fixture
        .block_on(
            fixture
                .gateway
                .list_issue_labels(&fixture.locator, PageRequest::default()),
        )
        .expect_err("request should fail");

    match error {
        GitHubError::Authentication { message } => {
            assert!(message.contains("Bad credentials"), "unexpected: {message}");
        }
        other => panic!("expected Authentication, got {other:?}"),
    }
}
