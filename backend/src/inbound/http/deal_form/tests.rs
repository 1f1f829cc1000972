//! Tests for deal body parsing.

use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, test as actix_test, web};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::ApiResult;
use crate::test_support::multipart::MultipartBody;

async fn echo(req: HttpRequest, payload: web::Payload) -> ApiResult<HttpResponse> {
    let form = parse_deal_form(&req, payload).await?;
    let image = form.image.as_ref().map(|image| {
        json!({
            "fileName": image.file_name(),
            "contentType": image.content_type(),
            "len": image.len(),
        })
    });
    Ok(HttpResponse::Ok().json(json!({
        "title": form.draft.title,
        "description": form.draft.description,
        "discount": form.draft.discount,
        "location": form.draft.location,
        "startDate": form.draft.start_date,
        "endDate": form.draft.end_date,
        "image": image,
    })))
}

async fn send(request: actix_test::TestRequest) -> (StatusCode, Value) {
    let app = actix_test::init_service(App::new().route("/echo", web::post().to(echo))).await;
    let response = actix_test::call_service(&app, request.uri("/echo").to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn multipart(body: MultipartBody) -> actix_test::TestRequest {
    actix_test::TestRequest::post()
        .insert_header(("content-type", MultipartBody::content_type()))
        .set_payload(body.finish())
}

#[rstest]
#[actix_web::test]
async fn multipart_text_fields_and_image_are_collected() {
    let body = MultipartBody::new()
        .text("title", "Pizza Night")
        .text("discount", "20")
        .text("startDate", "2025-01-01")
        .text("owner", "someone-else")
        .file("image", "coupon.png", "image/png", &[7; 128]);

    let (status, value) = send(multipart(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["title"], "Pizza Night");
    assert_eq!(value["discount"], "20");
    assert_eq!(value["startDate"], "2025-01-01");
    assert_eq!(value["location"], Value::Null);
    assert_eq!(
        value["image"],
        json!({"fileName": "coupon.png", "contentType": "image/png", "len": 128})
    );
}

#[rstest]
#[actix_web::test]
async fn empty_file_parts_mean_no_image() {
    let body = MultipartBody::new()
        .text("title", "Pizza Night")
        .file("image", "", "application/octet-stream", b"");

    let (status, value) = send(multipart(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["image"], Value::Null);
}

#[rstest]
#[actix_web::test]
async fn disallowed_types_are_passed_on_without_their_body() {
    let body = MultipartBody::new()
        .text("title", "Animated")
        .file("image", "anim.gif", "image/gif", b"GIF89a")
        .text("location", "never read");

    let (status, value) = send(multipart(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["title"], "Animated");
    assert_eq!(value["location"], Value::Null);
    assert_eq!(
        value["image"],
        json!({"fileName": "anim.gif", "contentType": "image/gif", "len": 0})
    );
}

#[rstest]
#[actix_web::test]
async fn oversized_images_stop_streaming_at_the_cap() {
    let body = MultipartBody::new().file(
        "image",
        "huge.jpg",
        "image/jpeg",
        &vec![0; MAX_IMAGE_BYTES + 1],
    );

    let (status, value) = send(multipart(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["image"]["fileName"], "huge.jpg");
    let len = value["image"]["len"].as_u64().expect("length");
    assert!(len > MAX_IMAGE_BYTES as u64);
}

#[rstest]
#[actix_web::test]
async fn a_second_image_part_is_rejected() {
    let body = MultipartBody::new()
        .file("image", "a.png", "image/png", b"a")
        .file("image", "b.png", "image/png", b"b");

    let (status, value) = send(multipart(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["message"], "Only one image may be uploaded");
}

#[rstest]
#[case(json!({"discount": 12.5}), "12.5")]
#[case(json!({"discount": "30"}), "30")]
#[case(json!({"discount": true}), "true")]
#[actix_web::test]
async fn json_discounts_become_text(#[case] payload: Value, #[case] expected: &str) {
    let (status, value) = send(actix_test::TestRequest::post().set_json(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["discount"], expected);
}

#[rstest]
#[actix_web::test]
async fn json_bodies_ignore_protected_keys() {
    let payload = json!({"title": "New", "user": "intruder", "id": "forged"});

    let (status, value) = send(actix_test::TestRequest::post().set_json(payload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["title"], "New");
}

#[rstest]
#[actix_web::test]
async fn bodiless_requests_parse_as_empty_forms() {
    let (status, value) = send(actix_test::TestRequest::post()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["title"], Value::Null);
}

#[rstest]
#[case("application/json", "{broken")]
#[case("text/plain", "title=x")]
#[actix_web::test]
async fn unusable_bodies_are_invalid_requests(#[case] content_type: &str, #[case] body: &str) {
    let request = actix_test::TestRequest::post()
        .insert_header(("content-type", content_type))
        .set_payload(body.to_owned());

    let (status, value) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["code"], "invalid_request");
}
