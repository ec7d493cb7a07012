//! Integration tests for the gateway event endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use relay::api::public::event::GatewayResponse;
    use relay::forwarder::ProviderShape;
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use crate::test_utils::{body_to_string, test_app};

    fn event_request(event: Value) -> Request<Body> {
        Request::builder()
            .uri("/api/event")
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(event.to_string()))
            .unwrap()
    }

    async fn envelope(response: axum::response::Response) -> GatewayResponse {
        let body = body_to_string(response.into_body()).await;
        serde_json::from_str(&body).expect("Response is not a gateway envelope")
    }

    /// Tests an authenticated event is forwarded and wrapped in an envelope
    #[tokio::test]
    async fn it_handles_authenticated_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJson(json!({
                "messages": [{"role": "user", "content": [{"text": "Bonjour"}]}]
            })))
            .with_status(200)
            .with_body(r#"{"output": {"message": {"content": [{"text": "Salut!"}]}}}"#)
            .create_async()
            .await;

        let app = test_app(&server.url(), ProviderShape::Structured);
        let response = app
            .oneshot(event_request(json!({
                "body": json!({"message": "Bonjour"}).to_string(),
                "requestContext": {
                    "authorizer": {
                        "claims": {"email": "user@example.com", "cognito:username": "user"}
                    }
                }
            })))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::OK);

        let envelope = envelope(response).await;
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(
            envelope.headers["Access-Control-Allow-Headers"],
            "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token"
        );

        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["response"], json!("Salut!"));
        assert_eq!(body["conversationHistory"].as_array().unwrap().len(), 2);
    }

    /// Tests an anonymous event is still forwarded
    #[tokio::test]
    async fn it_handles_anonymous_event() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"generated_text": "42"}"#)
            .create_async()
            .await;

        let app = test_app(&server.url(), ProviderShape::Prompt);
        let response = app
            .oneshot(event_request(json!({
                "body": json!({"message": "What is the answer?"}).to_string()
            })))
            .await
            .unwrap();

        let envelope = envelope(response).await;
        assert_eq!(envelope.status_code, 200);
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["response"], json!("42"));
    }

    /// Tests an event whose body lacks a message gets a 400 envelope
    #[tokio::test]
    async fn it_returns_400_envelope_for_missing_message() {
        let app = test_app("http://127.0.0.1:9", ProviderShape::Structured);
        let response = app
            .oneshot(event_request(json!({"body": "{\"history\": []}"})))
            .await
            .unwrap();

        let envelope = envelope(response).await;
        assert_eq!(envelope.status_code, 400);
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("message"));
    }

    async fn post_raw_event(body: &'static str, content_type: Option<&str>) -> GatewayResponse {
        let app = test_app("http://127.0.0.1:9", ProviderShape::Structured);
        let mut builder = Request::builder().uri("/api/event").method("POST");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let response = app
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        envelope(response).await
    }

    fn assert_bad_event(envelope: &GatewayResponse) {
        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(envelope.headers["Content-Type"], "application/json");
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("event"));
    }

    /// Tests an event that isn't JSON gets a 400 envelope
    #[tokio::test]
    async fn it_returns_400_envelope_for_invalid_json_event() {
        let envelope = post_raw_event("{invalid json}", Some("application/json")).await;
        assert_bad_event(&envelope);
    }

    /// Tests an event sent without a content type is still read as JSON
    #[tokio::test]
    async fn it_accepts_event_without_content_type() {
        let envelope = post_raw_event(r#"{"body": "{\"history\": []}"}"#, None).await;
        assert_eq!(envelope.status_code, 400);
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().unwrap().contains("message"));

        let envelope = post_raw_event("not an event", None).await;
        assert_bad_event(&envelope);
    }

    /// Tests an event whose body is an object rather than a string
    #[tokio::test]
    async fn it_returns_400_envelope_for_object_body() {
        let envelope = post_raw_event(r#"{"body": {"message": "hi"}}"#, Some("application/json")).await;
        assert_bad_event(&envelope);
    }

    /// Tests an empty event gets a 400 envelope
    #[tokio::test]
    async fn it_returns_400_envelope_for_empty_event() {
        let envelope = post_raw_event("", Some("application/json")).await;
        assert_bad_event(&envelope);
    }

    /// Tests a provider failure is reported inside the envelope
    #[tokio::test]
    async fn it_wraps_provider_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("ngrok endpoint offline")
            .create_async()
            .await;

        let app = test_app(&server.url(), ProviderShape::Passthrough);
        let response = app
            .oneshot(event_request(json!({
                "body": json!({"message": "hi"}).to_string()
            })))
            .await
            .unwrap();

        let envelope = envelope(response).await;
        assert_eq!(envelope.status_code, 503);
        let body: Value = serde_json::from_str(&envelope.body).unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["details"], json!("ngrok endpoint offline"));
    }
}
