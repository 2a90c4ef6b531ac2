mod common;

use axum::http::StatusCode;
use uuid::Uuid;

use common::{
    READER_EMAIL, TestApp, body_text, editor_session_id, form, location,
};

#[tokio::test]
async fn anonymous_visitors_are_sent_to_sign_in() {
    let app = TestApp::new();
    let post = app.store.seed("Draft", "draft", "Body", false);

    let response = app.get("/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth");

    let uri = format!("/admin/posts/{}/publish", post.id);
    let response = app.post_form(&uri, None, "", false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!app.store.snapshot()[0].is_published);
}

#[tokio::test]
async fn signed_in_readers_are_forbidden() {
    let app = TestApp::new();
    let cookie = app.sign_in(READER_EMAIL).await;

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get("/admin/new", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_sign_in_lands_on_dashboard() {
    let app = TestApp::new();
    app.store.seed("Visible", "visible", "Body", true);
    app.store.seed("Work in progress", "wip", "Body", false);

    let body = form(&[("email", common::ADMIN_EMAIL), ("password", common::PASSWORD)]);
    let response = app.post_form("/auth", None, &body, false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");
    let cookie = common::session_cookie(&response).expect("cookie");

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Visible"));
    assert!(html.contains("Work in progress"));
    assert!(html.contains("Draft"));
    assert!(html.contains("Published"));

    let response = app.get("/auth", Some(&cookie)).await;
    assert_eq!(location(&response), "/admin");
}

#[tokio::test]
async fn toggle_publish_flips_one_post_and_refreshes_the_feed() {
    let app = TestApp::new();
    let target = app.store.seed("Going Live", "going-live", "Body", false);
    let other = app.store.seed("Stays Put", "stays-put", "Body", false);
    let cookie = app.sign_in_admin().await;

    let feed = body_text(app.get("/", None).await).await;
    assert!(!feed.contains("Going Live"));

    let uri = format!("/admin/posts/{}/publish", target.id);
    let response = app.post_form(&uri, Some(&cookie), "", false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin?notice=Post+published");

    let rows = app.store.snapshot();
    let find = |id: Uuid| rows.iter().find(|row| row.id == id).expect("row");
    assert!(find(target.id).is_published);
    assert!(!find(other.id).is_published);

    let feed = body_text(app.get("/", None).await).await;
    assert!(feed.contains("Going Live"));
    assert!(!feed.contains("Stays Put"));
}

#[tokio::test]
async fn datastar_toggle_patches_the_posts_panel() {
    let app = TestApp::new();
    let post = app.store.seed("Live Toggle", "live-toggle", "Body", true);
    let cookie = app.sign_in_admin().await;

    let uri = format!("/admin/posts/{}/publish", post.id);
    let response = app.post_form(&uri, Some(&cookie), "", true).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .expect("header")
            .starts_with("text/event-stream")
    );
    let events = body_text(response).await;
    assert!(events.contains("datastar-patch-elements"));
    assert!(events.contains("Live Toggle"));
    assert!(events.contains("Post unpublished"));
    assert!(!app.store.snapshot()[0].is_published);
}

#[tokio::test]
async fn toggling_a_missing_post_reports_failure() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;

    let uri = format!("/admin/posts/{}/publish", Uuid::new_v4());
    let response = app.post_form(&uri, Some(&cookie), "", false).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/admin?error=Failed+to+update+post"));
}

#[tokio::test]
async fn delete_removes_the_post_everywhere() {
    let app = TestApp::new();
    let post = app.store.seed("Doomed", "doomed", "Body", true);
    let cookie = app.sign_in_admin().await;

    assert!(body_text(app.get("/", None).await).await.contains("Doomed"));

    let uri = format!("/admin/posts/{}/delete", post.id);
    let confirm = app.get(&uri, Some(&cookie)).await;
    assert_eq!(confirm.status(), StatusCode::OK);
    assert!(body_text(confirm).await.contains("Doomed"));

    let response = app.post_form(&uri, Some(&cookie), "", false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin?notice=Post+deleted+successfully"
    );
    assert!(app.store.snapshot().is_empty());

    assert!(!body_text(app.get("/", None).await).await.contains("Doomed"));
    let detail = app.get("/blog/doomed", None).await;
    assert_eq!(detail.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_post_derives_slug_from_title() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;

    let page = app.get("/admin/new", Some(&cookie)).await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("Create New Post"));
    let session = editor_session_id(&html);

    let body = form(&[
        ("title", "Hello, World!"),
        ("slug", ""),
        ("excerpt", ""),
        ("content", "First line\nSecond line"),
        ("image_url", ""),
        ("is_published", "true"),
    ]);
    let uri = format!("/admin/editor/{session}/submit");
    let response = app.post_form(&uri, Some(&cookie), &body, false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        "/admin?notice=Post+created+successfully"
    );

    let rows = app.store.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].slug, "hello-world");
    assert!(rows[0].excerpt.is_none());
    assert!(rows[0].is_published);

    let detail = app.get("/blog/hello-world", None).await;
    assert_eq!(detail.status(), StatusCode::OK);

    // The editor session ends with a successful save.
    let again = app.post_form(&uri, Some(&cookie), &body, false).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn title_edits_stream_the_derived_slug() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;
    let html = body_text(app.get("/admin/new", Some(&cookie)).await).await;
    let session = editor_session_id(&html);

    let body = form(&[("title", "Rust & Friends"), ("slug", "")]);
    let uri = format!("/admin/editor/{session}/fields/title");
    let response = app.post_form(&uri, Some(&cookie), &body, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_text(response).await;
    assert!(events.contains("editor-slug-field"));
    assert!(events.contains("value=\"rust-friends\""));

    // A manual slug stops the title from driving it.
    let body = form(&[("title", "Rust & Friends"), ("slug", "custom")]);
    let uri = format!("/admin/editor/{session}/fields/slug");
    app.post_form(&uri, Some(&cookie), &body, true).await;

    let body = form(&[("title", "Something Else"), ("slug", "custom")]);
    let uri = format!("/admin/editor/{session}/fields/title");
    let events = body_text(app.post_form(&uri, Some(&cookie), &body, true).await).await;
    assert!(!events.contains("editor-slug-field"));
}

#[tokio::test]
async fn unknown_editor_field_is_rejected() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;
    let html = body_text(app.get("/admin/new", Some(&cookie)).await).await;
    let session = editor_session_id(&html);

    let uri = format!("/admin/editor/{session}/fields/author");
    let response = app.post_form(&uri, Some(&cookie), "", true).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_draft_is_shown_again_with_the_error() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;
    let html = body_text(app.get("/admin/new", Some(&cookie)).await).await;
    let session = editor_session_id(&html);

    let body = form(&[("title", ""), ("content", "Kept content")]);
    let uri = format!("/admin/editor/{session}/submit");
    let response = app.post_form(&uri, Some(&cookie), &body, false).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please enter a title"));
    assert!(html.contains("Kept content"));
    assert!(app.store.snapshot().is_empty());
}

#[tokio::test]
async fn duplicate_slug_keeps_the_draft_in_the_editor() {
    let app = TestApp::new();
    app.store.seed("Taken", "taken", "Original body", true);
    let cookie = app.sign_in_admin().await;
    let html = body_text(app.get("/admin/new", Some(&cookie)).await).await;
    let session = editor_session_id(&html);

    let body = form(&[("title", "Taken"), ("content", "Another body")]);
    let uri = format!("/admin/editor/{session}/submit");
    let response = app.post_form(&uri, Some(&cookie), &body, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_text(response).await;
    assert!(events.contains("A post with this slug already exists"));
    assert!(events.contains("Another body"));
    assert_eq!(app.store.snapshot().len(), 1);
}

#[tokio::test]
async fn edit_post_updates_in_place() {
    let app = TestApp::new();
    let post = app.store.seed("Original", "original", "Body", true);
    let cookie = app.sign_in_admin().await;

    let detail = body_text(app.get("/blog/original", None).await).await;
    assert!(detail.contains("Original"));

    let page = app
        .get(&format!("/admin/edit/{}", post.id), Some(&cookie))
        .await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = body_text(page).await;
    assert!(html.contains("Edit Post"));
    assert!(html.contains("value=\"Original\""));
    let session = editor_session_id(&html);

    let body = form(&[
        ("title", "Renamed"),
        ("slug", "original"),
        ("content", "New body"),
        ("is_published", "true"),
    ]);
    let uri = format!("/admin/editor/{session}/submit");
    let response = app.post_form(&uri, Some(&cookie), &body, true).await;
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_text(response).await;
    assert!(events.contains("window.location.assign"));
    assert!(events.contains("Post+updated+successfully"));

    let rows = app.store.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, post.id);
    assert_eq!(rows[0].title, "Renamed");
    assert_eq!(rows[0].slug, "original");

    let detail = body_text(app.get("/blog/original", None).await).await;
    assert!(detail.contains("Renamed"));
    assert!(detail.contains("New body"));
}

#[tokio::test]
async fn editing_a_missing_post_is_not_found() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;

    let response = app
        .get(&format!("/admin/edit/{}", Uuid::new_v4()), Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_discards_the_editor_session() {
    let app = TestApp::new();
    let cookie = app.sign_in_admin().await;
    let html = body_text(app.get("/admin/new", Some(&cookie)).await).await;
    let session = editor_session_id(&html);

    let uri = format!("/admin/editor/{session}/cancel");
    let response = app.post_form(&uri, Some(&cookie), "", false).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/admin");

    let body = form(&[("title", "Late"), ("content", "Body")]);
    let uri = format!("/admin/editor/{session}/submit");
    let response = app.post_form(&uri, Some(&cookie), &body, false).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.store.snapshot().is_empty());
}
