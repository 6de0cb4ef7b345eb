//! HTTP 接口集成测试
//!
//! 每个测试使用独立临时目录 (数据库 + auth.json), 通过 `oneshot` 直接驱动路由

use aurum_server::{Config, ServerState, build_router};
use axum::Router;
use axum::body::{Body, Bytes};
use http::{HeaderMap, Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::io::{Cursor, Read};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: ServerState,
    _dir: TempDir,
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).unwrap()
    }
}

async fn spawn_app_with(configure: impl FnOnce(&mut Config)) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut config = Config::with_overrides(dir.path().join("resto.db"), dir.path().join("auth.json"));
    configure(&mut config);
    let state = ServerState::initialize(&config).await.unwrap();
    TestApp {
        router: build_router(state.clone()),
        state,
        _dir: dir,
    }
}

async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

impl TestApp {
    /// Re-run startup against the same files, as a process restart would
    async fn restart(self) -> TestApp {
        let state = ServerState::initialize(&self.state.config).await.unwrap();
        TestApp {
            router: build_router(state.clone()),
            state,
            _dir: self._dir,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&value).unwrap())
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).unwrap()).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    /// Set up the account and return an access token
    async fn login(&self) -> String {
        let res = self
            .send(
                Method::POST,
                "/api/v1/auth/setup",
                None,
                Some(json!({"code": "boss", "password": "hunter2"})),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);

        let res = self
            .send(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({"code": "boss", "password": "hunter2"})),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
        res.json()["access_token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;

    for path in ["/health", "/healthz"] {
        let res = app.send(Method::GET, path, None, None).await;
        assert_eq!(res.status, StatusCode::OK);
        let body = res.json();
        assert_eq!(body["ok"], true);
        assert_eq!(body["status"], "ok");
        assert!(body["db"].as_str().unwrap().ends_with("resto.db"));
    }

    let res = app.send(Method::GET, "/", None, None).await;
    assert_eq!(res.json()["health"], "/healthz");
}

#[tokio::test]
async fn test_auth_flow() {
    let app = spawn_app().await;

    let res = app.send(Method::GET, "/api/v1/orders", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], 1001);

    let res = app.send(Method::GET, "/api/v1/orders", Some("garbage"), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.send(Method::GET, "/api/v1/auth/status", None, None).await;
    assert_eq!(res.json()["initialized"], false);

    let res = app
        .send(
            Method::POST,
            "/api/v1/auth/setup",
            None,
            Some(json!({"code": " ", "password": "x"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let token = app.login().await;

    let res = app.send(Method::GET, "/api/v1/auth/status", None, None).await;
    assert_eq!(res.json()["initialized"], true);

    let res = app
        .send(
            Method::POST,
            "/api/v1/auth/setup",
            None,
            Some(json!({"code": "again", "password": "x"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);

    let res = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"code": "boss", "password": "wrong"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], 1002);

    let res = app.get("/api/v1/auth/me", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let me = res.json();
    assert_eq!(me["code"], "boss");
    assert_eq!(me["revenue_unlocked"], false);

    let res = app
        .send(
            Method::PUT,
            "/api/v1/auth/account",
            Some(&token),
            Some(json!({"current_password": "nope", "new_code": "chef"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .send(
            Method::PUT,
            "/api/v1/auth/account",
            Some(&token),
            Some(json!({"current_password": "hunter2", "new_code": "chef"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["code"], "chef");
}

#[tokio::test]
async fn test_order_validation() {
    let app = spawn_app().await;
    let token = app.login().await;

    let bad = [
        json!({"date": "2024-03-01", "shift": "MORNING", "order_no": "A1", "amount": 0}),
        json!({"date": "2024-03-01", "shift": "MORNING", "order_no": "A1", "amount": -5}),
        json!({"date": "2024-3-1", "shift": "MORNING", "order_no": "A1", "amount": 10}),
        json!({"date": "2024-02-30", "shift": "MORNING", "order_no": "A1", "amount": 10}),
        json!({"date": "2024-03-01", "shift": "NOON", "order_no": "A1", "amount": 10}),
        json!({"date": "2024-03-01", "shift": "MORNING", "order_no": "  ", "amount": 10}),
        json!({"date": "2024-03-01", "shift": "MORNING", "order_no": "x".repeat(33), "amount": 10}),
    ];
    for payload in bad {
        let res = app.post("/api/v1/orders", &token, payload.clone()).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "payload {payload}");
    }

    let res = app
        .post(
            "/api/v1/expenses",
            &token,
            json!({"date": "2024-03-01", "category": "食材", "amount": 0}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.get("/api/v1/orders?page_size=500", &token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_order_crud() {
    let app = spawn_app().await;
    let token = app.login().await;

    let res = app
        .post(
            "/api/v1/orders",
            &token,
            json!({"date": "2024-03-01", "shift": "早班", "order_no": " A-1 ", "amount": "1,200", "memo": ""}),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let created = res.json();
    assert_eq!(created["shift"], "MORNING");
    assert_eq!(created["order_no"], "A-1");
    assert_eq!(created["amount"], 1200.0);
    assert!(created["memo"].is_null());
    let id = created["id"].as_i64().unwrap();

    for (no, shift) in [("B-2", "pm"), ("C-3", "EVENING")] {
        let res = app
            .post(
                "/api/v1/orders",
                &token,
                json!({"date": "2024-03-02", "shift": shift, "order_no": no, "amount": 80.5}),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = app.get("/api/v1/orders?page=1&page_size=2", &token).await;
    let page = res.json();
    assert_eq!(page["total"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["items"][0]["order_no"], "C-3");

    let res = app.get("/api/v1/orders?shift=EVENING", &token).await;
    assert_eq!(res.json()["total"], 2);

    let res = app.get("/api/v1/orders?q=1200", &token).await;
    assert_eq!(res.json()["total"], 1);

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v1/orders/{id}"),
            Some(&token),
            Some(json!({"memo": "團體"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let patched = res.json();
    assert_eq!(patched["memo"], "團體");
    assert_eq!(patched["amount"], 1200.0);

    let res = app
        .send(Method::DELETE, &format!("/api/v1/orders/{id}"), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let res = app.get(&format!("/api/v1/orders/{id}"), &token).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["code"], 3001);

    let res = app
        .send(Method::DELETE, &format!("/api/v1/orders/{id}"), Some(&token), None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

async fn seed_ledger(app: &TestApp, token: &str) {
    for (date, shift, amount) in [
        ("2024-02-01", "MORNING", 1000.1),
        ("2024-02-01", "EVENING", 2000.2),
        ("2024-02-29", "EVENING", 0.1),
        ("2024-03-01", "MORNING", 999.0),
    ] {
        let res = app
            .post(
                "/api/v1/orders",
                token,
                json!({"date": date, "shift": shift, "order_no": "N", "amount": amount}),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    for (date, category, amount, note) in [
        ("2024-02-01", "食材", 300.05, "菜市場, 早上"),
        ("2024-02-15", "水電", 200.0, ""),
    ] {
        let res = app
            .post(
                "/api/v1/expenses",
                token,
                json!({"date": date, "category": category, "amount": amount, "note": note}),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_kpi_identities() {
    let app = spawn_app().await;
    let token = app.login().await;
    seed_ledger(&app, &token).await;

    let res = app
        .get("/api/v1/reports/kpi?mode=month&ref_date=2024-02-10", &token)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let kpi = res.json();
    assert_eq!(kpi["date_from"], "2024-02-01");
    assert_eq!(kpi["date_to"], "2024-02-29");
    assert_eq!(kpi["morning"], 1000.1);
    assert_eq!(kpi["evening"], 2000.3);
    assert_eq!(kpi["total"], 3000.4);
    assert_eq!(kpi["expense"], 500.05);
    assert_eq!(kpi["net"], 2500.35);
    assert_eq!(kpi["nav"]["prev"], "2024-01-10");
    assert_eq!(kpi["nav"]["next"], "2024-03-10");

    let res = app.get("/api/v1/kpi/month?y=2024&m=2", &token).await;
    assert_eq!(res.json()["total"], 3000.4);

    let res = app.get("/api/v1/kpi/day?d=2024-02-01", &token).await;
    let day = res.json();
    assert_eq!(day["total"], 3000.3);
    assert_eq!(day["net"], 2700.25);

    let res = app.get("/api/v1/reports/kpi?mode=week", &token).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .get("/api/v1/reports/revenue?date_from=2024-02-29&date_to=2024-02-01", &token)
        .await;
    let report = res.json();
    assert_eq!(report["date_from"], "2024-02-01");
    assert_eq!(report["rows"].as_array().unwrap().len(), 3);
    assert_eq!(report["totals"]["net"], 2500.35);

    let res = app
        .get("/api/v1/reports/expense-categories?mode=year&ref_date=2024-01-01", &token)
        .await;
    let categories = res.json();
    assert_eq!(categories[0]["category"], "食材");
    assert_eq!(categories[0]["amount"], 300.05);
}

#[tokio::test]
async fn test_csv_export() {
    let app = spawn_app().await;
    let token = app.login().await;
    seed_ledger(&app, &token).await;

    let res = app
        .get("/api/v1/export/orders.csv?mode=month&ref_date=2024-02-10", &token)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.headers[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = res.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("filename=orders_month_2024-02-10.csv"));
    assert!(disposition.contains("filename*=UTF-8''"));

    let text = res.text();
    assert!(text.starts_with('\u{feff}'));
    let lines: Vec<&str> = text.trim_start_matches('\u{feff}').split("\r\n").collect();
    assert_eq!(lines[0], "日期,班別,單號,金額,備註");
    assert_eq!(lines[1], "2024-02-01,早班,N,1000.1,");
    assert_eq!(lines.len(), 5);

    let res = app
        .get(
            "/api/v1/export/expenses.csv?date_from=2024-02-01&date_to=2024-02-29",
            &token,
        )
        .await;
    let disposition = res.headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("expenses_range_2024-02-01_2024-02-29.csv"));
    assert!(res.text().contains("2024-02-01,食材,300.05,\"菜市場, 早上\"\r\n"));

    let res = app
        .get("/api/v1/export/sales.csv?mode=month&ref_date=2024-02-10", &token)
        .await;
    assert!(res.text().ends_with("2024-02-01~2024-02-29,3000.4,500.05,2500.35\r\n"));
}

#[tokio::test]
async fn test_revenue_guard() {
    let app = spawn_app_with(|config| config.revenue_guard = true).await;
    let token = app.login().await;

    let res = app.get("/api/v1/reports/kpi", &token).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["code"], 2002);

    // Ledger CRUD stays open
    let res = app.get("/api/v1/orders", &token).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .post("/api/v1/auth/revenue-unlock", &token, json!({"secret": "bad"}))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .post("/api/v1/auth/revenue-unlock", &token, json!({"secret": "hunter2"}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let unlocked = res.json()["access_token"].as_str().unwrap().to_string();

    let res = app.get("/api/v1/reports/kpi", &unlocked).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.get("/api/v1/export/sales.csv", &unlocked).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_backup_and_restore() {
    let app = spawn_app().await;
    let token = app.login().await;
    seed_ledger(&app, &token).await;

    let res = app.get("/api/v1/backup", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.headers[header::CONTENT_TYPE], "application/zip");
    assert!(
        res.headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("aurum_backup_")
    );

    let mut archive = zip::ZipArchive::new(Cursor::new(res.body.to_vec())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["auth.json", "aurum.db"]);
    let mut db = Vec::new();
    archive.by_name("aurum.db").unwrap().read_to_end(&mut db).unwrap();
    assert!(db.starts_with(b"SQLite format 3\0"));
    let backup = res.body.clone();

    let res = app.get("/api/v1/backup?include_db=false", &token).await;
    let archive = zip::ZipArchive::new(Cursor::new(res.body.to_vec())).unwrap();
    assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["auth.json"]);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/backup/restore")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from("not a zip"))
        .unwrap();
    let res = app.dispatch(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 5002);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/backup/restore")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(backup))
        .unwrap();
    let res = app.dispatch(request).await;
    assert_eq!(res.status, StatusCode::OK);
    let report = res.json();
    assert_eq!(report["restart_required"], true);
    assert_eq!(report["restored"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_legacy_shift_rows_stay_readable() {
    let app = spawn_app().await;
    let token = app.login().await;

    // 旧库遗留数据: 一个可识别的别名, 一个无法映射的值
    sqlx::query(
        "INSERT INTO orders (date, shift, order_no, amount) VALUES ('2024-01-01', ' am ', 'Y', 20), ('2024-01-01', 'NOON', 'X', 10)",
    )
    .execute(&app.state.pool)
    .await
    .unwrap();
    let app = app.restart().await;

    let res = app.get("/api/v1/orders", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    let page = res.json();
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["order_no"], "X");
    assert_eq!(page["items"][0]["shift"], "NOON");
    assert_eq!(page["items"][1]["shift"], "MORNING");

    let id = page["items"][0]["id"].as_i64().unwrap();
    let res = app.get(&format!("/api/v1/orders/{id}"), &token).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .get("/api/v1/export/orders.csv?mode=day&ref_date=2024-01-01", &token)
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let text = res.text();
    assert!(text.contains("2024-01-01,早班,Y,20,\r\n"));
    assert!(text.contains("2024-01-01,NOON,X,10,\r\n"));

    // 只改备注时, 遗留班别必须先修正
    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v1/orders/{id}"),
            Some(&token),
            Some(json!({"memo": "fix"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 3004);

    let res = app
        .send(
            Method::PATCH,
            &format!("/api/v1/orders/{id}"),
            Some(&token),
            Some(json!({"shift": "晚班"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["shift"], "EVENING");
}

#[tokio::test]
async fn test_expired_and_tampered_tokens_are_rejected() {
    use aurum_server::auth::jwt::{Claims, TOKEN_TYPE_ACCESS};
    use jsonwebtoken::{EncodingKey, Header, encode};

    let app = spawn_app().await;
    let token = app.login().await;

    let jwt = &app.state.config.jwt;
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: "boss".into(),
        exp: now - 3600,
        iat: now - 7200,
        iss: jwt.issuer.clone(),
        aud: jwt.audience.clone(),
        rev: false,
        token_type: TOKEN_TYPE_ACCESS.into(),
    };
    let expired = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .unwrap();

    let res = app.get("/api/v1/orders", &expired).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], 1003);

    // 改动签名第一个字符
    let sig_start = token.rfind('.').unwrap() + 1;
    let first = &token[sig_start..sig_start + 1];
    let tampered = format!(
        "{}{}{}",
        &token[..sig_start],
        if first == "A" { "B" } else { "A" },
        &token[sig_start + 1..]
    );

    let res = app.get("/api/v1/orders", &tampered).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], 1004);

    let res = app.get("/api/v1/orders", &token).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = spawn_app().await;
    let token = app.login().await;

    let res = app
        .post(
            "/api/v1/orders",
            &token,
            json!({"date": "2024-03-01", "shift": "MORNING", "order_no": "A", "amount": true}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 2);

    let res = app
        .post(
            "/api/v1/orders",
            &token,
            json!({"date": "2024-03-01", "shift": "MORNING", "order_no": "A"}),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 2);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/expenses")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let res = app.dispatch(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["code"], 6);
}
