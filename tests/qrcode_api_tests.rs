use axum::http::StatusCode;
use qrcode_api::error::{EncodingFailure, GENERATION_FAILED_MESSAGE};
use qrcode_api::generator::{ImageRenderer, QrMatrix, SymbolEncoder};
use qrcode_api::{Correction, QrCodeGenerator};
use serde_json::json;
use std::sync::Arc;

mod support;

#[tokio::test]
async fn health_returns_ok() {
    let response = support::get(support::router(), "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "UP");
}

#[tokio::test]
async fn health_ignores_broken_generator() {
    let router = support::router_with(failing_generator());
    let response = support::get(router, "/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn png_has_requested_dimensions() {
    let response = support::get(
        support::router(),
        "/api/qrcode?contents=hello&size=200&type=png&correction=M",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("image/png"));

    let image = image::load_from_memory_with_format(&response.body, image::ImageFormat::Png)
        .expect("valid PNG");
    assert_eq!((image.width(), image.height()), (200, 200));
}

#[tokio::test]
async fn defaults_produce_250_pixel_png() {
    let response = support::get(support::router(), "/api/qrcode?contents=hello").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), Some("image/png"));
    let image = image::load_from_memory(&response.body).expect("valid image");
    assert_eq!((image.width(), image.height()), (250, 250));
}

#[tokio::test]
async fn jpeg_and_gif_are_served_with_matching_content_type() {
    for (image_type, mime, codec) in [
        ("jpeg", "image/jpeg", image::ImageFormat::Jpeg),
        ("JPEG", "image/jpeg", image::ImageFormat::Jpeg),
        ("gif", "image/gif", image::ImageFormat::Gif),
        ("Gif", "image/gif", image::ImageFormat::Gif),
        ("PNG", "image/png", image::ImageFormat::Png),
    ] {
        let uri = format!("/api/qrcode?contents=hello&size=300&type={image_type}");
        let response = support::get(support::router(), &uri).await;

        assert_eq!(response.status, StatusCode::OK, "{image_type}");
        assert_eq!(response.content_type(), Some(mime), "{image_type}");
        let image = image::load_from_memory_with_format(&response.body, codec)
            .unwrap_or_else(|err| panic!("{image_type} does not decode: {err}"));
        assert_eq!((image.width(), image.height()), (300, 300), "{image_type}");
    }
}

#[tokio::test]
async fn lowercase_correction_is_accepted() {
    let response = support::get(support::router(), "/api/qrcode?contents=hello&correction=q").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn missing_contents_is_rejected() {
    let response = support::get(support::router(), "/api/qrcode?size=200").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Contents cannot be null or blank"})
    );
}

#[tokio::test]
async fn blank_contents_are_rejected() {
    let response = support::get(support::router(), "/api/qrcode?contents=%20%20%20").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Contents cannot be null or blank"})
    );
}

#[tokio::test]
async fn small_size_is_rejected() {
    let response = support::get(support::router(), "/api/qrcode?contents=hi&size=100").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Image size must be between 150 and 350 pixels"})
    );
}

#[tokio::test]
async fn size_bounds_are_inclusive() {
    for (size, expected) in [
        (149, StatusCode::BAD_REQUEST),
        (150, StatusCode::OK),
        (350, StatusCode::OK),
        (351, StatusCode::BAD_REQUEST),
    ] {
        let uri = format!("/api/qrcode?contents=hi&size={size}");
        let response = support::get(support::router(), &uri).await;
        assert_eq!(response.status, expected, "size {size}");
    }
}

#[tokio::test]
async fn non_numeric_size_is_rejected() {
    let response = support::get(support::router(), "/api/qrcode?contents=hi&size=big").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Image size must be between 150 and 350 pixels"})
    );
}

#[tokio::test]
async fn unknown_correction_is_rejected() {
    let response = support::get(support::router(), "/api/qrcode?contents=hi&correction=X").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Permitted error correction levels are L, M, Q, H"})
    );
}

#[tokio::test]
async fn unknown_type_is_rejected() {
    let response = support::get(support::router(), "/api/qrcode?contents=hi&type=bmp").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json(),
        json!({"error": "Only png, jpeg and gif image types are supported"})
    );
}

#[tokio::test]
async fn first_failing_check_wins() {
    let cases = [
        (
            "/api/qrcode?contents=&size=1000&correction=X&type=bmp",
            "Contents cannot be null or blank",
        ),
        (
            "/api/qrcode?contents=hi&size=1000&correction=X&type=bmp",
            "Image size must be between 150 and 350 pixels",
        ),
        (
            "/api/qrcode?contents=hi&size=200&correction=X&type=bmp",
            "Permitted error correction levels are L, M, Q, H",
        ),
        (
            "/api/qrcode?contents=hi&size=200&correction=H&type=bmp",
            "Only png, jpeg and gif image types are supported",
        ),
    ];

    for (uri, message) in cases {
        let response = support::get(support::router(), uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.json(), json!({ "error": message }), "{uri}");
    }
}

#[tokio::test]
async fn oversized_contents_return_generic_server_error() {
    let contents = "a".repeat(3000);
    let uri = format!("/api/qrcode?contents={contents}&correction=H");
    let response = support::get(support::router(), &uri).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), GENERATION_FAILED_MESSAGE);
    assert!(
        response
            .content_type()
            .is_some_and(|mime| mime.starts_with("text/plain"))
    );
}

#[tokio::test]
async fn encoder_failure_detail_is_not_leaked() {
    let router = support::router_with(failing_generator());
    let response = support::get(router, "/api/qrcode?contents=hello").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), GENERATION_FAILED_MESSAGE);
    assert!(!response.text().contains("modules"));
}

#[tokio::test]
async fn worker_panic_returns_generic_server_error() {
    let generator = QrCodeGenerator::new(Arc::new(PanickingEncoder), Arc::new(ImageRenderer));
    let response = support::get(support::router_with(generator), "/api/qrcode?contents=hi").await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), GENERATION_FAILED_MESSAGE);
}

#[tokio::test]
async fn repeated_parameter_is_rejected_as_json() {
    let response = support::get(support::router(), "/api/qrcode?contents=a&contents=b").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type(), Some("application/json"));
    let error = response.json()["error"].as_str().unwrap().to_string();
    assert!(error.contains("duplicate field `contents`"), "{error}");
}

#[tokio::test]
async fn identical_requests_return_identical_bytes() {
    let uri = "/api/qrcode?contents=https%3A%2F%2Fexample.com&size=220&type=gif&correction=H";
    let first = support::get(support::router(), uri).await;
    assert_eq!(first.status, StatusCode::OK);

    for _ in 0..3 {
        let again = support::get(support::router(), uri).await;
        assert_eq!(again.body, first.body);
    }
}

#[tokio::test]
async fn concurrent_requests_are_independent() {
    let router = support::router();
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let uri = format!("/api/qrcode?contents=item-{i}&size={}", 150 + i * 25);
                (i, support::get(router, &uri).await)
            })
        })
        .collect();

    for handle in handles {
        let (i, response) = handle.await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        let image = image::load_from_memory(&response.body).unwrap();
        assert_eq!(image.width(), 150 + i * 25);
    }
}

#[tokio::test]
async fn metrics_endpoint_reports_requests() {
    let router = support::router();
    support::get(router.clone(), "/api/qrcode?contents=hello").await;
    support::get(router.clone(), "/api/qrcode?size=200").await;

    let response = support::get(router, "/metrics").await;
    assert_eq!(response.status, StatusCode::OK);
    let text = response.text();
    assert!(text.contains("qrcode_requests_total"));
    assert!(text.contains(r#"outcome="success""#));
    assert!(text.contains(r#"qrcode_validation_failures_total{field="contents"}"#));
}

#[tokio::test]
async fn only_get_is_routed() {
    use axum::body::Body;
    use axum::http::{Method, Request};
    use tower::ServiceExt;

    let response = support::router()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/qrcode?contents=hello")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

struct AlwaysTooSmall;

impl SymbolEncoder for AlwaysTooSmall {
    fn encode(
        &self,
        _contents: &str,
        width: u32,
        height: u32,
        _correction: Correction,
    ) -> Result<QrMatrix, EncodingFailure> {
        Err(EncodingFailure::DoesNotFit {
            modules: 177,
            quiet_zone: 4,
            width,
            height,
        })
    }
}

struct PanickingEncoder;

impl SymbolEncoder for PanickingEncoder {
    fn encode(
        &self,
        _contents: &str,
        _width: u32,
        _height: u32,
        _correction: Correction,
    ) -> Result<QrMatrix, EncodingFailure> {
        panic!("encoder crashed");
    }
}

fn failing_generator() -> QrCodeGenerator {
    QrCodeGenerator::new(Arc::new(AlwaysTooSmall), Arc::new(ImageRenderer))
}
