use crate::{
    routes::{
        index::{get_index_route, internal_get_students},
        sse::sse_feed,
        students::{
            STUDENTS_PATH, delete_student, get_student, get_students, post_student, put_student,
        },
    },
    state::RosterState,
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod index;
pub mod sse;
pub mod students;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route(STUDENTS_PATH, get(get_students).post(post_student))
        .route(
            &format!("{STUDENTS_PATH}/{{id}}"),
            get(get_student).put(put_student).delete(delete_student),
        )
        .route("/internal/get_students", get(internal_get_students))
        .route("/sse_feed", get(sse_feed))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::store::MemoryStudentStore, service::StudentService};
    use axum::{
        body::Body,
        http::{Request, Response, StatusCode},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state() -> RosterState {
        RosterState::new(StudentService::new(Arc::new(MemoryStudentStore::default())))
    }

    fn json_request(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(state: &RosterState, request: Request<Body>) -> Response<Body> {
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn create_list_delete_round_trip() {
        let state = test_state();

        let created = send(
            &state,
            json_request(
                Method::POST,
                "/students",
                &json!({"name": "Ann", "email": "ann@x.com"}),
            ),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(created).await,
            json!({"id": 1, "name": "Ann", "email": "ann@x.com"})
        );

        let listed = send(&state, empty_request(Method::GET, "/students")).await;
        assert_eq!(listed.status(), StatusCode::OK);
        assert_eq!(
            body_json(listed).await,
            json!([{"name": "Ann", "email": "ann@x.com"}])
        );

        let deleted = send(&state, empty_request(Method::DELETE, "/students/1")).await;
        assert_eq!(deleted.status(), StatusCode::OK);
        assert_eq!(body_text(deleted).await, "Student 1 deleted");

        let listed = send(&state, empty_request(Method::GET, "/students")).await;
        assert_eq!(body_json(listed).await, json!([]));
    }

    #[tokio::test]
    async fn get_by_id_returns_the_payload() {
        let state = test_state();
        send(
            &state,
            json_request(
                Method::POST,
                "/students",
                &json!({"name": "Ann", "email": "ann@x.com"}),
            ),
        )
        .await;

        let response = send(&state, empty_request(Method::GET, "/students/1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"name": "Ann", "email": "ann@x.com"})
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_404s_with_an_error_envelope() {
        let state = test_state();

        for request in [
            empty_request(Method::GET, "/students/77"),
            empty_request(Method::DELETE, "/students/77"),
            json_request(
                Method::PUT,
                "/students/77",
                &json!({"name": "Ann", "email": "ann@x.com"}),
            ),
        ] {
            let response = send(&state, request).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(
                body_json(response).await,
                json!({"error": "Unable to find student with ID: 77"})
            );
        }
    }

    #[tokio::test]
    async fn non_numeric_ids_are_rejected() {
        let response = send(&test_state(), empty_request(Method::GET, "/students/ann")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn update_changes_only_the_target() {
        let state = test_state();
        for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@x.com")] {
            send(
                &state,
                json_request(Method::POST, "/students", &json!({"name": name, "email": email})),
            )
            .await;
        }

        let updated = send(
            &state,
            json_request(
                Method::PUT,
                "/students/1",
                &json!({"name": "Annie", "email": "annie@x.com"}),
            ),
        )
        .await;
        assert_eq!(updated.status(), StatusCode::OK);
        assert_eq!(
            body_json(updated).await,
            json!({"id": 1, "name": "Annie", "email": "annie@x.com"})
        );

        let bob = send(&state, empty_request(Method::GET, "/students/2")).await;
        assert_eq!(
            body_json(bob).await,
            json!({"name": "Bob", "email": "bob@x.com"})
        );
    }

    #[tokio::test]
    async fn malformed_payloads_are_rejected_before_the_store() {
        let state = test_state();

        let missing_email = send(
            &state,
            json_request(Method::POST, "/students", &json!({"name": "Ann"})),
        )
        .await;
        assert_eq!(missing_email.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let blank_name = send(
            &state,
            json_request(
                Method::POST,
                "/students",
                &json!({"name": " ", "email": "ann@x.com"}),
            ),
        )
        .await;
        assert_eq!(blank_name.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(blank_name).await,
            json!({"error": "Missing required field `name`"})
        );

        let not_json = send(
            &state,
            Request::builder()
                .method(Method::POST)
                .uri("/students")
                .body(Body::from("name=Ann"))
                .unwrap(),
        )
        .await;
        assert_eq!(not_json.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let listed = send(&state, empty_request(Method::GET, "/students")).await;
        assert_eq!(body_json(listed).await, json!([]));
    }

    #[tokio::test]
    async fn mutations_signal_the_ui() {
        let state = test_state();
        let mut rx = state.subscribe_to_sse_feed();

        send(
            &state,
            json_request(
                Method::POST,
                "/students",
                &json!({"name": "Ann", "email": "ann@x.com"}),
            ),
        )
        .await;
        assert_eq!(rx.recv().await.unwrap(), sse::SseEvent::CrudStudent);

        send(&state, empty_request(Method::DELETE, "/students/1")).await;
        assert_eq!(rx.recv().await.unwrap(), sse::SseEvent::CrudStudent);
    }

    #[tokio::test]
    async fn index_page_has_the_form_and_the_list() {
        let response = send(&test_state(), empty_request(Method::GET, "/")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let page = body_text(response).await;
        assert!(page.contains(r#"hx-post="/students""#));
        assert!(page.contains(r#"hx-ext="json-enc""#));
        assert!(page.contains(r#"hx-trigger="load, sse:crud_student""#));
        assert!(page.contains(r#"sse-connect="/sse_feed""#));
    }

    #[tokio::test]
    async fn student_list_fragment_escapes_names() {
        let state = test_state();

        let empty =
            body_text(send(&state, empty_request(Method::GET, "/internal/get_students")).await)
                .await;
        assert!(empty.contains("No students yet."));

        send(
            &state,
            json_request(
                Method::POST,
                "/students",
                &json!({"name": "<i>Ann</i>", "email": "ann@x.com"}),
            ),
        )
        .await;

        let list =
            body_text(send(&state, empty_request(Method::GET, "/internal/get_students")).await)
                .await;
        assert!(list.contains("&lt;i&gt;Ann&lt;/i&gt;"));
        assert!(list.contains("ann@x.com"));
    }

    #[tokio::test]
    async fn sse_feed_is_an_event_stream() {
        let response = send(&test_state(), empty_request(Method::GET, "/sse_feed")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/event-stream"
        );
    }

    #[tokio::test]
    async fn cors_allows_only_the_configured_origin() {
        let app = router(test_state()).layer(cors_layer(HeaderValue::from_static(
            "http://localhost:3000",
        )));

        let preflight = |origin: &'static str| {
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/students")
                .header(header::ORIGIN, origin)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap()
        };

        let allowed = app
            .clone()
            .oneshot(preflight("http://localhost:3000"))
            .await
            .unwrap();
        assert_eq!(
            allowed.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );

        //exact-origin mode always echoes the configured origin, the browser rejects the mismatch
        let denied = app.oneshot(preflight("http://evil.example")).await.unwrap();
        let echoed = &denied.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN];
        assert_eq!(echoed, "http://localhost:3000");
        assert_ne!(echoed, "http://evil.example");
    }
}
