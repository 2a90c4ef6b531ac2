#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use blogcraft::{
    application::{
        admin::{
            editor::{EditorService, EditorSessions},
            posts::AdminPostService,
        },
        feed::FeedService,
        query::QueryCache,
    },
    config::{AuthSettings, AuthBackend, MemoryUser, SiteSettings},
    infra::{
        auth::MemorySessionProvider,
        http::{self, AdminState, AuthState, HttpState, RouterState, SessionCookie},
        store::MemoryPostStore,
    },
    presentation::views::SiteChrome,
};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const READER_EMAIL: &str = "reader@example.com";
pub const PASSWORD: &str = "correct horse";
pub const COOKIE_NAME: &str = "blogcraft_session";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryPostStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_login_button(true)
    }

    pub fn with_login_button(show_login_button: bool) -> Self {
        let store = Arc::new(MemoryPostStore::new());
        let users = [
            MemoryUser {
                email: ADMIN_EMAIL.into(),
                password: PASSWORD.into(),
                admin: true,
            },
            MemoryUser {
                email: READER_EMAIL.into(),
                password: PASSWORD.into(),
                admin: false,
            },
        ];
        let auth_settings = AuthSettings {
            backend: AuthBackend::Memory {
                users: users.to_vec(),
            },
            cookie_name: COOKIE_NAME.into(),
            cookie_secure: false,
        };
        let provider = Arc::new(MemorySessionProvider::new(&users));

        let cache = Arc::new(QueryCache::new(true, Duration::from_secs(60)));
        let sessions = Arc::new(EditorSessions::new(Duration::from_secs(600)));
        let site = SiteChrome::from(&SiteSettings {
            title: "Test Blog".into(),
            show_login_button,
        });

        let state = RouterState {
            http: HttpState {
                feed: Arc::new(FeedService::new(store.clone(), Arc::clone(&cache))),
                site: site.clone(),
            },
            admin: AdminState {
                posts: Arc::new(AdminPostService::new(store.clone(), Arc::clone(&cache))),
                editor: Arc::new(EditorService::new(store.clone(), cache, sessions)),
                site: site.clone(),
            },
            auth: AuthState {
                provider,
                cookie: SessionCookie::from(&auth_settings),
                site,
            },
        };

        Self {
            router: http::build_router(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).expect("request"))
            .await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        cookie: Option<&str>,
        body: &str,
        datastar: bool,
    ) -> Response<Body> {
        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if datastar {
            builder = builder.header("datastar-request", "true");
        }
        self.send(builder.body(Body::from(body.to_string())).expect("request"))
            .await
    }

    /// Sign in and return the `name=value` pair to send back as a cookie.
    pub async fn sign_in(&self, email: &str) -> String {
        let body = form(&[("email", email), ("password", PASSWORD)]);
        let response = self.post_form("/auth", None, &body, false).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("session cookie issued")
    }

    pub async fn sign_in_admin(&self) -> String {
        self.sign_in(ADMIN_EMAIL).await
    }
}

pub fn form(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{COOKIE_NAME}=")))
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// The editor session id embedded in a rendered editor page.
pub fn editor_session_id(html: &str) -> String {
    let marker = "/admin/editor/";
    let start = html.find(marker).expect("editor action in page") + marker.len();
    html[start..start + 36].to_string()
}
