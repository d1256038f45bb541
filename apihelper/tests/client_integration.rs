use std::collections::HashMap;

use apihelper::{
    ApiResponse, Client, ClientConfig, Connectivity, Error, ImageAttachment, Method, Payload,
    Request, Status,
};
use image::{DynamicImage, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use wiremock::matchers::{any, body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u64,
    first_name: String,
}

#[derive(Serialize)]
struct UpdateProfile {
    first_name: String,
    notifications: bool,
}

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn client_for(server: &MockServer) -> Client {
    let config =
        ClientConfig::new(&server.uri(), "api/v1/", "tok-123").with_device_id("device-abc");
    Client::new(config).unwrap()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

#[tokio::test]
async fn get_success_sends_standard_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .and(header("content-type", "application/json"))
        .and(header("device", "device-abc"))
        .and(header("platform", "ios"))
        .and(header("Authorization", "Token tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("user.json")))
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResponse<User> = client_for(&server).get("users/me/", None).await.unwrap();
    assert_eq!(resp.status(), Status::Success);
    assert_eq!(resp.msg, "Profile fetched successfully");
    assert_eq!(resp.data.unwrap().first_name, "Priya");
}

#[tokio::test]
async fn get_with_query_and_header_override() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/feed"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "10"))
        .and(header("Authorization", "Bearer override"))
        .and(header("x-app-version", "4.2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("feed_page.json")))
        .expect(1)
        .mount(&server)
        .await;

    let overrides = HashMap::from([
        ("Authorization".to_string(), "Bearer override".to_string()),
        ("x-app-version".to_string(), "4.2".to_string()),
    ]);
    let resp: ApiResponse<Vec<Value>> = client_for(&server)
        .get("feed?offset=0&limit=10", Some(overrides))
        .await
        .unwrap();
    assert!(resp.has_next());
    assert_eq!(resp.data.unwrap().len(), 2);
}

#[tokio::test]
async fn unreachable_never_hits_network() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let connectivity = Connectivity::new(false);
    let client = client_for(&server).with_reachability(connectivity.clone());

    let err = client.get::<Value>("users/me/", None).await.unwrap_err();
    assert!(matches!(err, Error::Unreachable));
    assert_eq!(err.to_string(), "Please check your internet connection!");

    let err = client
        .post::<Value, _>("users/", None, Payload::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unreachable));

    let err = client
        .multipart::<Value, _>("upload/", None, Method::Post, Payload::empty(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unreachable));
}

#[tokio::test]
async fn unencodable_url_never_hits_network() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get::<Value>("search?q=tab\there", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
    assert_eq!(err.to_string(), "Url can't be encoded");
}

#[tokio::test]
async fn unsafe_characters_are_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/search"))
        .and(query_param("q", "pad thai"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": true, "msg": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResponse<Value> = client_for(&server)
        .get("search?q=pad thai", None)
        .await
        .unwrap();
    assert!(resp.result);
}

#[tokio::test]
async fn post_sends_raw_map_as_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/otp/verify/"))
        .and(body_json(json!({"phone": "+919800000000", "otp": 1234})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "result": true,
            "msg": "Verified",
            "data": {"id": 5, "first_name": "Asha"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = Payload::raw(object(json!({"phone": "+919800000000", "otp": 1234})));
    let resp: ApiResponse<User> = client_for(&server)
        .post("auth/otp/verify/", None, payload)
        .await
        .unwrap();
    assert_eq!(
        resp.data,
        Some(User {
            id: 5,
            first_name: "Asha".to_string()
        })
    );
}

#[tokio::test]
async fn put_sends_structured_payload() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/users/me/"))
        .and(body_json(json!({"first_name": "Priya", "notifications": false})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": true, "msg": "Saved"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = Payload::Structured(UpdateProfile {
        first_name: "Priya".to_string(),
        notifications: false,
    });
    let resp: ApiResponse<Value> = client_for(&server)
        .put("users/me/", None, payload)
        .await
        .unwrap();
    assert_eq!(resp.msg, "Saved");
    assert!(resp.data.is_none());
}

#[tokio::test]
async fn delete_sends_payload() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/posts/9/"))
        .and(body_json(json!({"reason": "duplicate"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": true, "msg": "Deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp: ApiResponse<Value> = client_for(&server)
        .delete("posts/9/", None, Payload::raw(object(json!({"reason": "duplicate"}))))
        .await
        .unwrap();
    assert_eq!(resp.msg, "Deleted");
}

#[tokio::test]
async fn result_false_is_failure_with_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/otp/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("rejected.json")))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .post::<Value, _>("auth/otp/verify/", None, Payload::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Rejected { status: 200, .. }));
    assert_eq!(err.to_string(), "Invalid OTP");

    let resp: ApiResponse<Value> = err.into_response();
    assert_eq!(resp.status(), Status::Failure);
    assert_eq!(resp.data, Some(json!({"attempts_left": 2})));
}

#[tokio::test]
async fn rejected_body_with_mistyped_data_is_decode_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/otp/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": false,
            "msg": "Invalid OTP",
            "data": "oops"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server)
        .post::<User, _>("auth/otp/verify/", None, Payload::empty())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { status: 200, .. }));
    assert_eq!(err.to_string(), "Oops! Can't connect to server");
}

#[tokio::test]
async fn fixed_messages_for_server_and_auth_errors() {
    let server = MockServer::start().await;

    Mock::given(path("/api/v1/a"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"result": true, "msg": "fine"})),
        )
        .mount(&server)
        .await;
    Mock::given(path("/api/v1/b"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;
    Mock::given(path("/api/v1/c"))
        .respond_with(ResponseTemplate::new(401).set_body_string("{not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.get::<Value>("a", None).await.unwrap_err();
    assert!(matches!(err, Error::ServerUnavailable { status: 500 }));
    assert_eq!(err.to_string(), "Oops! Can't connect to server");

    let err = client.get::<Value>("b", None).await.unwrap_err();
    assert!(matches!(err, Error::ServerUnavailable { status: 504 }));

    let err = client.get::<Value>("c", None).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Authorization Failed!");
}

#[tokio::test]
async fn other_status_decodes_envelope_as_failure() {
    let server = MockServer::start().await;

    Mock::given(path("/api/v1/missing/"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"result": true, "msg": "Not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(path("/api/v1/broken/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.get::<Value>("missing/", None).await.unwrap_err();
    assert!(matches!(err, Error::Rejected { status: 404, .. }));
    assert_eq!(err.to_string(), "Not found");

    let err = client.get::<Value>("broken/", None).await.unwrap_err();
    assert!(matches!(err, Error::Decode { status: 400, .. }));
    assert_eq!(err.to_string(), "Oops! Can't connect to server");
}

#[tokio::test]
async fn malformed_success_body_is_generic_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .get::<User>("users/me/", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { status: 200, .. }));
    assert_eq!(err.to_string(), "Oops! Can't connect to server");
}

#[tokio::test]
async fn connection_refused_is_no_response() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new(&format!("http://{}", addr), "api/v1/", "tok");
    let err = Client::new(config)
        .unwrap()
        .get::<Value>("users/me/", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoResponse));
    assert_eq!(err.to_string(), "No Response from server");
}

#[tokio::test]
async fn multipart_skips_non_string_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/users/me/avatar/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"result": true, "msg": "Uploaded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let payload = Payload::raw(object(json!({"name": "bob", "age": 30})));
    let resp: ApiResponse<Value> = client_for(&server)
        .multipart("users/me/avatar/", None, Method::Post, payload, None)
        .await
        .unwrap();
    assert_eq!(resp.msg, "Uploaded");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    let content_types: Vec<_> = request.headers.get_all("content-type").iter().collect();
    assert_eq!(content_types.len(), 1);
    let content_type = content_types[0].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert_eq!(
        request.headers.get("authorization").unwrap().to_str().unwrap(),
        "Token tok-123"
    );

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"name\""));
    assert!(body.contains("bob"));
    assert!(!body.contains("name=\"age\""));
}

#[tokio::test]
async fn multipart_put_with_image() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/posts/3/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"result": true, "msg": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 128, 255])));
    let _: ApiResponse<Value> = client_for(&server)
        .multipart(
            "posts/3/",
            None,
            Method::Put,
            Payload::raw(object(json!({"caption": "sunset"}))),
            Some(ImageAttachment::new("image", image)),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_lowercase();
    assert!(body.contains("name=\"image\""));
    assert!(body.contains("filename=\"image.jpg\""));
    assert!(body.contains("content-type: image/jpg"));
    assert!(body.contains("name=\"caption\""));
    assert!(body.contains("sunset"));
}

#[tokio::test]
async fn repeated_get_yields_equal_envelopes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/feed"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("feed_page.json")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first: ApiResponse<Value> = client.get("feed", None).await.unwrap();
    let second: ApiResponse<Value> = client.get("feed", None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn dispatch_invokes_completion_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture("user.json")))
        .expect(1)
        .mount(&server)
        .await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let handle = client_for(&server).dispatch::<User, _>(
        Request::new(Method::Get, "users/me/"),
        move |status, resp| {
            tx.send((status, resp)).unwrap();
        },
    );
    handle.await.unwrap();

    let (status, resp) = rx.recv().await.unwrap();
    assert_eq!(status, Status::Success);
    assert_eq!(resp.data.unwrap().id, 1042);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn dispatch_reports_server_error_as_failure_envelope() {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (tx, rx) = tokio::sync::oneshot::channel();
    client_for(&server)
        .dispatch::<Value, _>(Request::new(Method::Get, "anything"), move |status, resp| {
            let _ = tx.send((status, resp));
        })
        .await
        .unwrap();

    let (status, resp) = rx.await.unwrap();
    assert_eq!(status, Status::Failure);
    assert!(!resp.result);
    assert_eq!(resp.msg, "Oops! Can't connect to server");
}
