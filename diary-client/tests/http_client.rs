mod common;

use common::{StubBackend, ADMIN_TOKEN, USER_TOKEN};
use diary_client::config::ClientConfig;
use diary_client::feed::{DiaryFeed, SearchFilter};
use diary_client::http_client::UploadFile;
use diary_client::models::{DiaryStatus, UserProfile};
use diary_client::moderation::{ModerationAction, StatusFilter, REVOKE_REASON};
use diary_client::session::{FileStore, Session, SessionSlot, SessionStore};
use diary_client::validation::{RegistrationForm, ValidationError};
use diary_client::{DiaryClient, DiaryClientError, DiaryDraft, DiaryEdit};
use serde_json::json;

fn client_for(backend: &StubBackend) -> DiaryClient {
    DiaryClient::new(ClientConfig::new(backend.base_url.clone()))
}

fn image(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    }
}

fn alice() -> UserProfile {
    serde_json::from_value(json!({
        "id": "u1", "username": "alice", "nickname": "Alice", "role": "user"
    }))
    .unwrap()
}

#[tokio::test]
async fn login_stores_token_for_later_calls() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let auth = client.login("  alice ", "secret").await.unwrap();
    assert_eq!(auth.token, USER_TOKEN);
    assert_eq!(auth.user.nickname, "Alice");
    assert_eq!(client.get_token().await.as_deref(), Some(USER_TOKEN));

    let mine = client.my_diaries().await.unwrap();
    assert_eq!(mine.len(), 2);

    let sent = &backend.calls_to("POST", "/api/auth/login")[0];
    assert_eq!(sent.body.as_ref().unwrap()["username"], "alice");
}

#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let err = client.login("alice", "wrong").await.unwrap_err();
    assert!(matches!(&err, DiaryClientError::Unauthorized(m) if m == "Invalid username or password"));
    assert!(client.get_token().await.is_none());
}

#[tokio::test]
async fn empty_credentials_never_reach_the_server() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let err = client.login("alice", "").await.unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::MissingCredentials)
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn register_checks_form_then_reports_backend_outcome() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let mut form = RegistrationForm {
        username: "bob".into(),
        nickname: "Bob".into(),
        password: "hunter22".into(),
        confirm_password: "hunter23".into(),
    };
    let err = client.register(&form).await.unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::PasswordMismatch)
    ));
    assert!(backend.calls().is_empty());

    form.confirm_password = "hunter22".into();
    let ok = client.register(&form).await.unwrap();
    assert_eq!(ok.message.as_deref(), Some("Registered"));
    // registration does not log in
    assert!(client.get_token().await.is_none());

    form.username = "taken".into();
    let err = client.register(&form).await.unwrap_err();
    assert!(matches!(
        &err,
        DiaryClientError::Api { status: 400, message } if message == "Username already exists"
    ));
}

#[tokio::test]
async fn list_sends_paging_and_only_non_blank_filters() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let mut feed = DiaryFeed::new(12);
    let request = feed.search(SearchFilter {
        title: " bay ".into(),
        author_nickname: "   ".into(),
    });
    let page = client.list_diaries(&request.query).await.unwrap();
    feed.apply(request.ticket, page);

    let call = &backend.calls_to("GET", "/api/diaries")[0];
    let qs = call.query.clone().unwrap();
    assert!(qs.contains("pageNumber=1"));
    assert!(qs.contains("pageSize=12"));
    assert!(qs.contains("title=bay"));
    assert!(!qs.contains("authorNickname"));

    assert_eq!(feed.diaries().len(), 2);
    assert!(feed.has_more());
}

#[tokio::test]
async fn load_more_appends_until_last_page() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    let mut feed = DiaryFeed::default();

    let first = feed.search(SearchFilter::default());
    feed.apply(first.ticket, client.list_diaries(&first.query).await.unwrap());

    let next = feed.load_more().unwrap();
    assert_eq!(next.query.page_number, 2);
    feed.apply(next.ticket, client.list_diaries(&next.query).await.unwrap());

    let ids: Vec<_> = feed.diaries().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["d1", "d2", "d3"]);
    assert!(feed.is_exhausted());
    assert!(feed.load_more().is_none());
}

#[tokio::test]
async fn unknown_diary_is_not_found() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let err = client.get_diary("nope").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Not found: Diary not found");
}

#[tokio::test]
async fn publish_requires_login() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);

    let draft = DiaryDraft {
        title: "Lisbon".into(),
        content: "Trams and tiles".into(),
        images: vec![image("a.jpg")],
        video: None,
    };
    let err = client.publish_diary(draft).await.unwrap_err();
    assert!(matches!(err, DiaryClientError::NotLoggedIn));
}

#[tokio::test]
async fn publish_rejects_too_many_images_before_upload() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let draft = DiaryDraft {
        title: "Lisbon".into(),
        content: "Trams and tiles".into(),
        images: (0..11).map(|i| image(&format!("{}.jpg", i))).collect(),
        video: None,
    };
    let err = client.publish_diary(draft).await.unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::TooManyImages { max: 10 })
    ));
    assert!(backend.calls_to("POST", "/api/diaries").is_empty());
}

#[tokio::test]
async fn publish_uploads_trimmed_text_and_every_file() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let video = UploadFile {
        file_name: "clip.mp4".into(),
        content_type: "video/mp4".into(),
        bytes: vec![0; 16],
    };
    let draft = DiaryDraft {
        title: "  Lisbon  ".into(),
        content: "Trams and tiles".into(),
        images: vec![image("a.jpg"), image("b.jpg")],
        video: Some(video),
    };

    let diary = client.publish_diary(draft).await.unwrap();
    assert_eq!(diary.title, "Lisbon");
    assert_eq!(diary.images, ["a.jpg", "b.jpg"]);
    assert_eq!(diary.status, DiaryStatus::Pending);

    let sent = backend.calls_to("POST", "/api/diaries")[0].body.clone().unwrap();
    assert_eq!(sent["video"], json!(["clip.mp4"]));
    assert_eq!(sent["content"], json!(["Trams and tiles"]));
}

#[tokio::test]
async fn approved_diary_is_not_edited() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let edit = DiaryEdit {
        title: "New".into(),
        content: "Body".into(),
        video_url: None,
    };
    let err = client.edit_diary("approved-1", edit).await.unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::EditLocked)
    ));
    assert!(backend.calls_to("PUT", "/api/diaries/approved-1").is_empty());
}

#[tokio::test]
async fn edit_sends_null_for_blank_video() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let edit = DiaryEdit {
        title: " Porto ".into(),
        content: "Bridges".into(),
        video_url: Some("  ".into()),
    };
    let diary = client.edit_diary("pending-1", edit).await.unwrap();
    assert_eq!(diary.title, "Porto");

    let body = backend.calls_to("PUT", "/api/diaries/pending-1")[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["title"], "Porto");
    assert!(body["videoUrl"].is_null());
}

#[tokio::test]
async fn rejected_token_is_dropped() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token("stale".into()).await;

    let err = client.current_user().await.unwrap_err();
    assert!(err.is_session_expired());
    assert!(client.get_token().await.is_none());

    // next call fails locally
    let err = client.current_user().await.unwrap_err();
    assert!(matches!(err, DiaryClientError::NotLoggedIn));
}

#[tokio::test]
async fn unchanged_profile_sends_nothing() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let changes = client
        .update_profile(&alice(), " Alice ", None, |_| {})
        .await
        .unwrap();
    assert!(changes.is_unchanged());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn profile_update_sends_nickname_then_avatar() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let avatar = UploadFile {
        file_name: "me.png".into(),
        content_type: "image/png".into(),
        bytes: vec![1, 2, 3],
    };
    let mut applied = Vec::new();
    let changes = client
        .update_profile(&alice(), "Ally", Some(avatar), |patch| applied.push(patch.clone()))
        .await
        .unwrap();

    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0].nickname.as_deref(), Some("Ally"));
    assert_eq!(applied[1].avatar_url.as_deref(), Some("/uploads/avatars/u1.png"));
    assert_eq!(changes.nickname.as_deref(), Some("Ally"));
    assert_eq!(changes.avatar_url.as_deref(), Some("/uploads/avatars/u1.png"));

    let paths: Vec<_> = backend.calls().into_iter().map(|c| c.path).collect();
    assert_eq!(paths, ["/api/users/me", "/api/users/me/avatar"]);
}

#[tokio::test]
async fn accepted_nickname_reaches_cache_when_avatar_upload_fails() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let dir = tempfile::tempdir().unwrap();
    let sessions = SessionStore::new(FileStore::new(dir.path().join("session.json")));
    sessions
        .save(
            SessionSlot::User,
            &Session {
                token: USER_TOKEN.into(),
                user: alice(),
            },
        )
        .unwrap();

    let avatar = UploadFile {
        file_name: "broken.png".into(),
        content_type: "image/png".into(),
        bytes: vec![1, 2, 3],
    };
    let err = client
        .update_profile(&alice(), "Ally", Some(avatar), |patch| {
            sessions.update_user(SessionSlot::User, patch).unwrap();
        })
        .await
        .unwrap_err();

    assert!(matches!(&err, DiaryClientError::Api { status: 500, message } if message == "disk full"));
    let paths: Vec<_> = backend.calls().into_iter().map(|c| c.path).collect();
    assert_eq!(paths, ["/api/users/me", "/api/users/me/avatar"]);

    let cached = sessions.load(SessionSlot::User).unwrap().unwrap();
    assert_eq!(cached.user.nickname, "Ally");
    assert_eq!(cached.user.avatar_url, None);
}

#[tokio::test]
async fn oversized_avatar_is_refused_locally() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let avatar = UploadFile {
        file_name: "me.png".into(),
        content_type: "image/png".into(),
        bytes: vec![0; 3 * 1024 * 1024],
    };
    let err = client
        .update_profile(&alice(), "Ally", Some(avatar), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::AvatarTooLarge { .. })
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn admin_list_filters_by_status() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.admin_login("root", "rootpass").await.unwrap();
    assert_eq!(client.get_token().await.as_deref(), Some(ADMIN_TOKEN));

    let all = client.admin_list_diaries(StatusFilter::All).await.unwrap();
    assert_eq!(all.len(), 3);

    let pending = client
        .admin_list_diaries(StatusFilter::Only(DiaryStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "p1");

    let calls = backend.calls_to("GET", "/api/admin/diaries");
    assert_eq!(calls[0].query, None);
    assert_eq!(calls[1].query.as_deref(), Some("status=pending"));
}

#[tokio::test]
async fn rejecting_pending_needs_a_reason() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(ADMIN_TOKEN.into()).await;

    let err = client
        .moderate(
            "p1",
            DiaryStatus::Pending,
            ModerationAction::Reject,
            Some("  "),
            StatusFilter::All,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::MissingRejectReason)
    ));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn revoke_uses_reject_with_fixed_reason_and_refetches() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(ADMIN_TOKEN.into()).await;

    let refreshed = client
        .moderate(
            "a1",
            DiaryStatus::Approved,
            ModerationAction::Revoke,
            None,
            StatusFilter::Only(DiaryStatus::Approved),
        )
        .await
        .unwrap();
    assert_eq!(refreshed.len(), 1);

    let call = &backend.calls_to("PUT", "/api/admin/diaries/a1/reject")[0];
    assert_eq!(call.body.as_ref().unwrap()["rejectReason"], REVOKE_REASON);

    let list_calls = backend.calls_to("GET", "/api/admin/diaries");
    assert_eq!(list_calls.len(), 1);
    assert_eq!(list_calls[0].query.as_deref(), Some("status=approved"));
}

#[tokio::test]
async fn re_review_and_delete_hit_their_endpoints() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(ADMIN_TOKEN.into()).await;

    client
        .moderate(
            "r1",
            DiaryStatus::Rejected,
            ModerationAction::ReReview,
            None,
            StatusFilter::All,
        )
        .await
        .unwrap();
    client
        .moderate(
            "r1",
            DiaryStatus::Rejected,
            ModerationAction::Delete,
            None,
            StatusFilter::All,
        )
        .await
        .unwrap();

    assert_eq!(backend.calls_to("PUT", "/api/admin/diaries/r1/approve").len(), 1);
    assert_eq!(
        backend.calls_to("DELETE", "/api/admin/diaries/r1/delete").len(),
        1
    );
}

#[tokio::test]
async fn unavailable_action_is_refused() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(ADMIN_TOKEN.into()).await;

    let err = client
        .moderate(
            "a1",
            DiaryStatus::Approved,
            ModerationAction::Approve,
            None,
            StatusFilter::All,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DiaryClientError::Validation(ValidationError::ActionUnavailable {
            status: DiaryStatus::Approved
        })
    ));
}

#[tokio::test]
async fn user_token_on_admin_endpoint_ends_session() {
    let backend = StubBackend::start().await;
    let client = client_for(&backend);
    client.set_token(USER_TOKEN.into()).await;

    let err = client
        .admin_list_diaries(StatusFilter::All)
        .await
        .unwrap_err();
    assert!(matches!(err, DiaryClientError::Forbidden(_)));
    assert!(client.get_token().await.is_none());
}
