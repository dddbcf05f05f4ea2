//! HTTP front end: two uploaded images in, diff PNG out.

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{HeaderName, HeaderValue, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::compare::{DiffSettings, ImageComparer, codec};
use crate::config::{ColorSpec, ResolvedRunConfig};
use crate::diff::DiffError;
use crate::error::ApiError;

/// Response header carrying the number of differing pixels.
pub const NUM_DIFFERENT_PIXELS: &str = "numdifferentpixels";

/// Form field holding an optional ignore colour (`R,G,B[,A]` or JSON object).
pub const IGNORE_COLOR_FIELD: &str = "ignoreColor";

/// Settings every request starts from. Requests never modify them.
#[derive(Clone, Debug)]
pub struct AppState {
    pub settings: DiffSettings,
    pub max_upload_bytes: usize,
}

impl From<&ResolvedRunConfig> for AppState {
    fn from(config: &ResolvedRunConfig) -> Self {
        Self {
            settings: config.diff,
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/status", get(|| async { StatusCode::OK }))
        .route("/", post(handle_diff))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

struct DiffForm {
    first: Bytes,
    second: Bytes,
    ignore_color: Option<ColorSpec>,
}

/// File parts in upload order; any other field except `ignoreColor` is skipped.
async fn read_form(mut multipart: Multipart) -> Result<DiffForm, ApiError> {
    let mut files = Vec::new();
    let mut ignore_color = None;

    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            files.push(field.bytes().await?);
        } else if field.name() == Some(IGNORE_COLOR_FIELD) {
            let text = field.text().await?;
            if !text.trim().is_empty() {
                ignore_color = Some(text.parse::<ColorSpec>()?);
            }
        }
    }

    let [first, second] = <[Bytes; 2]>::try_from(files)
        .map_err(|files| ApiError::FileCount(files.len()))?;
    Ok(DiffForm {
        first,
        second,
        ignore_color,
    })
}

fn run_diff(form: &DiffForm, comparer: &ImageComparer) -> Result<(u64, Vec<u8>), ApiError> {
    let result = codec::compare_encoded(&form.first, &form.second, comparer).map_err(|e| {
        match e.downcast::<DiffError>() {
            Ok(diff) => ApiError::Diff(diff),
            Err(e) => ApiError::Decode(format!("{e:#}")),
        }
    })?;
    let png = codec::encode_png(&result.diff_image)
        .map_err(|e| ApiError::Internal(format!("{e:#}")))?;
    Ok((result.diff_pixels, png))
}

async fn handle_diff(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_form(multipart).await?;

    // Fresh comparer per request so one caller's ignore colour never leaks.
    let mut comparer = ImageComparer::from_settings(&state.settings);
    if let Some(color) = form.ignore_color {
        comparer.set_ignore_color(color.into());
    }

    let (diff_pixels, png) = tokio::task::spawn_blocking(move || run_diff(&form, &comparer))
        .await
        .map_err(|e| ApiError::Internal(format!("Diff task panicked: {e}")))??;
    info!(diff_pixels, "diff request served");

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (
                HeaderName::from_static(NUM_DIFFERENT_PIXELS),
                HeaderValue::from(diff_pixels),
            ),
        ],
        png,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Algorithm;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use image::{Rgba, RgbaImage};
    use tower::ServiceExt;

    const BOUNDARY: &str = "imagediff-test-boundary";

    enum Part<'a> {
        File(&'a str, Vec<u8>),
        Text(&'a str, &'a str),
    }

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::File(name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.png\"\r\n\
                             Content-Type: image/png\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                            .as_bytes(),
                    );
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        codec::encode_png(&RgbaImage::from_pixel(w, h, color)).unwrap()
    }

    fn router(algorithm: Algorithm) -> Router {
        build_router(AppState {
            settings: DiffSettings {
                algorithm,
                ..DiffSettings::default()
            },
            max_upload_bytes: 1024 * 1024,
        })
    }

    async fn post(router: Router, parts: &[Part<'_>]) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let request = Request::post("/")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    #[tokio::test]
    async fn status_is_ok() {
        let response = router(Algorithm::Perceptual)
            .oneshot(Request::get("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn returns_png_and_count() {
        let white = Rgba([255, 255, 255, 255]);
        let black = Rgba([0, 0, 0, 255]);
        let (status, headers, body) = post(
            router(Algorithm::Exact),
            &[Part::File("a", png(3, 2, white)), Part::File("b", png(3, 2, black))],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CONTENT_TYPE], "image/png");
        assert_eq!(headers[NUM_DIFFERENT_PIXELS], "6");
        let diff = codec::decode(&body, "diff").unwrap().to_rgba8();
        assert_eq!(diff.dimensions(), (3, 2));
        assert!(diff.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
    }

    #[tokio::test]
    async fn ignore_color_field_is_per_request() {
        let white = Rgba([255, 255, 255, 255]);
        let black = Rgba([0, 0, 0, 255]);
        let app = router(Algorithm::Perceptual);

        let (status, headers, _) = post(
            app.clone(),
            &[
                Part::File("a", png(2, 2, white)),
                Part::File("b", png(2, 2, black)),
                Part::Text(IGNORE_COLOR_FIELD, r#"{"R":255,"G":255,"B":255,"A":255}"#),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[NUM_DIFFERENT_PIXELS], "0");

        // Next request without the field sees the differences again.
        let (_, headers, _) = post(
            app,
            &[Part::File("a", png(2, 2, white)), Part::File("b", png(2, 2, black))],
        )
        .await;
        assert_eq!(headers[NUM_DIFFERENT_PIXELS], "4");
    }

    #[tokio::test]
    async fn size_mismatch_is_bad_request() {
        let gray = Rgba([128, 128, 128, 255]);
        let (status, _, body) = post(
            router(Algorithm::Perceptual),
            &[Part::File("a", png(1, 1, gray)), Part::File("b", png(2, 2, gray))],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "images not same size: 1x1 vs 2x2");
    }

    #[tokio::test]
    async fn wrong_file_count_is_bad_request() {
        let (status, _, body) = post(
            router(Algorithm::Perceptual),
            &[Part::File("a", png(1, 1, Rgba([0, 0, 0, 255])))],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Expected 2 form files, got 1");
    }

    #[tokio::test]
    async fn undecodable_upload_is_bad_request() {
        let (status, _, body) = post(
            router(Algorithm::Perceptual),
            &[
                Part::File("a", b"definitely not a png".to_vec()),
                Part::File("b", png(1, 1, Rgba([0, 0, 0, 255]))),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(
            json["error"]
                .as_str()
                .unwrap()
                .starts_with("Failed to decode first image")
        );
    }

    #[test]
    fn run_diff_maps_errors_by_kind() {
        let black = Rgba([0, 0, 0, 255]);
        let comparer = ImageComparer::new(Algorithm::Exact);
        let mismatch = DiffForm {
            first: Bytes::from(png(1, 1, black)),
            second: Bytes::from(png(1, 2, black)),
            ignore_color: None,
        };
        assert!(matches!(
            run_diff(&mismatch, &comparer),
            Err(ApiError::Diff(DiffError::DimensionMismatch { .. }))
        ));

        let garbage = DiffForm {
            first: Bytes::from(png(1, 1, black)),
            second: Bytes::from_static(b"nope"),
            ignore_color: None,
        };
        assert!(matches!(run_diff(&garbage, &comparer), Err(ApiError::Decode(_))));
    }

    #[tokio::test]
    async fn malformed_ignore_color_is_bad_request() {
        let black = Rgba([0, 0, 0, 255]);
        let (status, _, _) = post(
            router(Algorithm::Perceptual),
            &[
                Part::File("a", png(1, 1, black)),
                Part::File("b", png(1, 1, black)),
                Part::Text(IGNORE_COLOR_FIELD, "1,2"),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
