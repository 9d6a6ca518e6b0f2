//! Wire tests for the reqwest care API adapter.
//!
//! Each test binds an actix stub on an ephemeral port, points the client at
//! it and inspects both the decoded result and the request the stub saw.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use guardian_vision::domain::ports::{CareApi, CareApiError};
use guardian_vision::domain::{
    EventKind, FormField, ImageUpload, LoginCredentials, ProfileUpdate, RecordId, Role,
    UpstreamSession, UserKey,
};
use guardian_vision::outbound::care_api::CareApiHttpClient;
use serde_json::{Value, json};
use url::Url;

const UPSTREAM: &str = "JSESSIONID=abc; jwt=tok";

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    cookie: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Recorded {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("recorded JSON body")
    }
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    fn push(&self, req: &HttpRequest, body: &[u8]) {
        let header_text = |name| {
            req.headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        self.0.lock().expect("recorder lock").push(Recorded {
            method: req.method().to_string(),
            path: req.path().to_owned(),
            cookie: header_text(header::COOKIE),
            content_type: header_text(header::CONTENT_TYPE),
            body: body.to_vec(),
        });
    }

    fn find(&self, method: &str, path: &str) -> Recorded {
        self.0
            .lock()
            .expect("recorder lock")
            .iter()
            .find(|r| r.method == method && r.path == path)
            .cloned()
            .unwrap_or_else(|| panic!("no {method} {path} recorded"))
    }
}

async fn stub(req: HttpRequest, body: web::Bytes, recorder: web::Data<Recorder>) -> HttpResponse {
    recorder.push(&req, &body);
    match (req.method().as_str(), req.path()) {
        ("POST", "/api/auth/login") => HttpResponse::Ok()
            .append_header((header::SET_COOKIE, "JSESSIONID=abc; Path=/; HttpOnly"))
            .append_header((header::SET_COOKIE, "jwt=tok; Secure"))
            .json(json!({ "id": 2, "username": "GV - CC - 2" })),
        ("GET", "/api/admins/users") => HttpResponse::Ok().json(json!({
            "admins": [{ "id": 1, "username": "GV - AA - 1", "firstName": "Ada", "first_name": "Adelaide" }],
            "caregivers": [{ "id": 2, "username": "GV - CC - 2", "first_name": "Carla" }],
            "patients": [{ "id": 3, "username": "GV - PT - 3", "caregiver": { "id": 2 } }]
        })),
        ("GET", "/api/alerts/patient/3") => HttpResponse::Ok().json(json!([
            {
                "id": 11,
                "timestamp": "2024-05-01T08:30:00Z",
                "videoUrl": "https://video.example/11.mp4",
                "lastKnownLocation": "https://maps.example/?q=14.6760,121.0437"
            },
            {
                "id": 12,
                "timestamp": "2024-05-01 09:00:00",
                "video_url": "",
                "last_known_location": "near the market"
            }
        ])),
        ("GET", "/api/alerts/patient/5") => HttpResponse::Ok().json(json!([
            { "id": 21, "timestamp": "2024-05-01T08:30:00Z" },
            { "id": 22, "timestamp": "sometime last week" },
            { "id": 23, "timestamp": "2024-05-02" }
        ])),
        ("GET", "/api/outages/patient/3") => {
            HttpResponse::InternalServerError().body("database   unavailable\n")
        }
        ("GET", "/api/patients/404") => HttpResponse::NotFound().body("no such patient"),
        ("GET", "/api/caregivers/me") => HttpResponse::Ok()
            .content_type("application/json")
            .body("{not json"),
        ("GET", "/api/admins/me") => {
            actix_web::rt::time::sleep(Duration::from_secs(2)).await;
            HttpResponse::Ok().json(json!({ "id": 1 }))
        }
        ("POST", "/api/s3/presign") => {
            let host = req.connection_info().host().to_owned();
            HttpResponse::Ok().json(json!({
                "url": format!("http://{host}/bucket/me.png"),
                "publicUrl": "https://files.example/me.png"
            }))
        }
        ("PUT", "/bucket/me.png") => HttpResponse::Ok().finish(),
        ("PUT", "/api/patients/3") => HttpResponse::NoContent().finish(),
        _ => HttpResponse::NotFound().finish(),
    }
}

struct StubUpstream {
    recorder: Recorder,
    handle: ServerHandle,
    addr: SocketAddr,
}

impl StubUpstream {
    fn start() -> Self {
        let recorder = Recorder::default();
        let data = web::Data::new(recorder.clone());
        let server = HttpServer::new(move || {
            App::new()
                .app_data(data.clone())
                .default_service(web::to(stub))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind stub upstream");
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        Self {
            recorder,
            handle,
            addr,
        }
    }

    fn client(&self, timeout: Duration) -> CareApiHttpClient {
        let base = Url::parse(&format!("http://{}/", self.addr)).expect("stub url");
        CareApiHttpClient::new(base, timeout).expect("client builds")
    }

    async fn stop(self) {
        self.handle.stop(false).await;
    }
}

fn upstream() -> UpstreamSession {
    UpstreamSession::new(UPSTREAM)
}

#[actix_web::test]
async fn authenticate_captures_the_upstream_credential() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));
    let creds = LoginCredentials::try_from_parts("GV - CC - 2", "password").expect("valid");

    let account = client.authenticate(&creds).await.expect("authenticated");

    assert_eq!(account.id, RecordId::new(2));
    assert_eq!(account.username, "GV - CC - 2");
    assert_eq!(account.upstream.expose(), UPSTREAM);
    let sent = stub.recorder.find("POST", "/api/auth/login");
    assert_eq!(sent.cookie, None);
    assert_eq!(
        sent.json(),
        json!({ "identifier": "GV - CC - 2", "password": "password" })
    );
    stub.stop().await;
}

#[actix_web::test]
async fn directory_accepts_both_field_spellings() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));

    let directory = client.directory(&upstream()).await.expect("directory");

    assert_eq!(directory.admins[0].details.first_name, "Ada");
    assert_eq!(directory.caregivers[0].details.first_name, "Carla");
    assert_eq!(directory.patients[0].caregiver_id, Some(RecordId::new(2)));
    let sent = stub.recorder.find("GET", "/api/admins/users");
    assert_eq!(sent.cookie.as_deref(), Some(UPSTREAM));
    stub.stop().await;
}

#[actix_web::test]
async fn alerts_decode_timestamps_and_locations() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));

    let alerts = client
        .alerts(&upstream(), RecordId::new(3))
        .await
        .expect("alerts");

    assert_eq!(alerts.len(), 2);
    assert!(alerts.iter().all(|event| event.kind == EventKind::Alert));
    let located = alerts[0].coordinates.expect("coordinates parsed");
    assert!((located.latitude - 14.676).abs() < 1e-9);
    assert!((located.longitude - 121.0437).abs() < 1e-9);
    assert_eq!(alerts[1].video_url, None);
    assert_eq!(alerts[1].coordinates, None);
    stub.stop().await;
}

#[actix_web::test]
async fn unreadable_events_are_skipped_without_losing_the_panel() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));

    let alerts = client
        .alerts(&upstream(), RecordId::new(5))
        .await
        .expect("panel survives one bad record");

    let ids: Vec<_> = alerts.iter().map(|event| event.id).collect();
    assert_eq!(ids, [RecordId::new(21), RecordId::new(23)]);
    assert_eq!(alerts[1].timestamp.to_rfc3339(), "2024-05-02T00:00:00+00:00");
    stub.stop().await;
}

#[actix_web::test]
async fn error_statuses_map_to_port_errors() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));

    let missing = client
        .fetch_user(&upstream(), UserKey::new(Role::Patient, RecordId::new(404)))
        .await
        .expect_err("missing patient");
    assert!(matches!(missing, CareApiError::NotFound { .. }), "{missing:?}");

    let failed = client
        .outages(&upstream(), RecordId::new(3))
        .await
        .expect_err("server error");
    match failed {
        CareApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let garbled = client
        .current_caregiver(&upstream())
        .await
        .expect_err("undecodable body");
    assert!(matches!(garbled, CareApiError::Decode { .. }), "{garbled:?}");
    stub.stop().await;
}

#[actix_web::test]
async fn slow_responses_time_out() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_millis(200));

    let err = client
        .current_admin(&upstream())
        .await
        .expect_err("deadline exceeded");

    assert!(matches!(err, CareApiError::Timeout { .. }), "{err:?}");
    stub.stop().await;
}

#[actix_web::test]
async fn profile_edits_use_record_keys() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));
    let changes = BTreeMap::from([
        (FormField::MobileNumber, "09171234567".to_owned()),
        (FormField::Age, "81".to_owned()),
    ]);
    let update = ProfileUpdate::try_new(Role::Patient, changes).expect("editable fields");

    client
        .update_user(
            &upstream(),
            UserKey::new(Role::Patient, RecordId::new(3)),
            &update,
        )
        .await
        .expect("update accepted");

    let sent = stub.recorder.find("PUT", "/api/patients/3");
    assert_eq!(
        sent.json(),
        json!({ "mobileNumber": "09171234567", "age": 81 })
    );
    stub.stop().await;
}

#[actix_web::test]
async fn image_uploads_presign_then_put_the_bytes() {
    let stub = StubUpstream::start();
    let client = stub.client(Duration::from_secs(5));
    let image =
        ImageUpload::try_new("me.png", "image/png", vec![137, 80, 78, 71], 1024).expect("image");

    let target = client
        .presign_upload(&upstream(), &image)
        .await
        .expect("presigned");
    assert_eq!(target.file_url, "https://files.example/me.png");
    client
        .upload_object(&target, &image)
        .await
        .expect("uploaded");

    let presign = stub.recorder.find("POST", "/api/s3/presign");
    assert_eq!(
        presign.json(),
        json!({ "fileName": "me.png", "contentType": "image/png" })
    );
    let put = stub.recorder.find("PUT", "/bucket/me.png");
    assert_eq!(put.content_type.as_deref(), Some("image/png"));
    assert_eq!(put.body, vec![137, 80, 78, 71]);
    assert_eq!(put.cookie, None);
    stub.stop().await;
}
