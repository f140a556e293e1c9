use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use quickpack_api_rest::{RestServer, RestServerConfig};
use quickpack_core_contact_contracts::{ContactSendMessageError, MockContactService};
use quickpack_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use quickpack_core_order_contracts::{MockOrderService, OrderSubmitError};
use quickpack_email_contracts::{ContentType, Delivery, EmailSendError, MockEmailService};
use quickpack_models::{
    contact::ContactSubmission,
    order::{OrderSubmission, ProductDetail, ProductDetails},
};
use quickpack_templates_impl::TemplateServiceImpl;
use serde_json::{json, Value};
use tower::ServiceExt;

fn router(contact: MockContactService, order: MockOrderService) -> Router {
    RestServer {
        contact,
        order,
        config: RestServerConfig {
            expose_errors: false,
        },
    }
    .router()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
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

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn failure(message: &str) -> Value {
    json!({"success": false, "message": message})
}

fn order_fields(mut extra: Value) -> Value {
    let fields = extra.as_object_mut().unwrap();
    for (key, value) in [
        ("name", "Jane Roe"),
        ("email", "jane@example.com"),
        ("phone", "555-0100"),
        ("address", "1 Main St"),
        ("city", "Toronto"),
        ("province", "ON"),
        ("postalCode", "M5V 1A1"),
    ] {
        fields.insert(key.into(), value.into());
    }
    extra
}

#[tokio::test]
async fn index() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(router, empty_request(Method::GET, "/")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Quick Pack Canada API is running",
            "endpoints": {
                "health": "/api/health",
                "contact": "/api/contact",
                "order": "/api/order",
            },
        })
    );
}

#[tokio::test]
async fn api_index() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(router, empty_request(Method::GET, "/api")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "API routes are working");
    assert_eq!(body["availableRoutes"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn health() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(router, empty_request(Method::GET, "/api/health")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Server is running");
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'), "{timestamp}");
    chrono::DateTime::parse_from_rfc3339(timestamp).unwrap();
}

#[tokio::test]
async fn not_found() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(router, empty_request(Method::DELETE, "/api/missing")).await;

    // Assert
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "success": false,
            "message": "Route not found",
            "path": "/api/missing",
            "method": "DELETE",
        })
    );
}

#[tokio::test]
async fn request_id_header() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let response = router
        .oneshot(empty_request(Method::GET, "/api/health"))
        .await
        .unwrap();

    // Assert
    assert!(response.headers().contains_key("X-Request-Id"));
}

#[tokio::test]
async fn contact_sends_email() {
    // Arrange
    let mut email = MockEmailService::new();
    email
        .expect_send()
        .once()
        .withf(|email| {
            email.subject.contains("John Doe")
                && email.content_type == ContentType::Html
                && email.reply_to.as_deref() == Some("john@example.com")
                && email.body.contains("<p>Hi</p>")
        })
        .return_once(|_| {
            Box::pin(std::future::ready(Ok(Delivery {
                code: 250,
                message: vec!["Ok".into()],
            })))
        });

    let contact = ContactServiceImpl {
        email,
        template: TemplateServiceImpl::new().unwrap(),
        config: ContactServiceConfig {
            recipient: Arc::new("contact@example.com".parse().unwrap()),
        },
    };

    let router = RestServer {
        contact,
        order: MockOrderService::new(),
        config: RestServerConfig {
            expose_errors: false,
        },
    }
    .router();

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/contact",
            json!({"name": "John Doe", "email": "john@example.com", "message": "Hi"}),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Email sent successfully!"})
    );
}

#[tokio::test]
async fn contact_from_query_string() {
    // Arrange
    let contact = MockContactService::new().with_send_message(
        ContactSubmission {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: None,
            message: "Hi".into(),
        },
        Ok(()),
    );
    let router = router(contact, MockOrderService::new());

    // Act
    let (status, _) = send(
        router,
        empty_request(
            Method::GET,
            "/api/contact?name=John%20Doe&email=john%40example.com&message=Hi",
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn contact_from_form_body() {
    // Arrange
    let contact = MockContactService::new().with_send_message(
        ContactSubmission {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: Some("555".into()),
            message: "Hi".into(),
        },
        Ok(()),
    );
    let router = router(contact, MockOrderService::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "name=John+Doe&email=john%40example.com&phone=555&message=Hi",
        ))
        .unwrap();

    // Act
    let (status, _) = send(router, request).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn contact_missing_fields() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(
        router,
        json_request(Method::POST, "/api/contact", json!({"name": "John Doe"})),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, failure("email, message are required"));
}

#[tokio::test]
async fn contact_invalid_email() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/contact",
            json!({"name": "John Doe", "email": "john@example", "message": "Hi"}),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, failure("Invalid email format"));
}

#[tokio::test]
async fn contact_invalid_body() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/contact")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();

    // Act
    let (status, body) = send(router, request).await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, failure("Invalid request body"));
}

#[tokio::test]
async fn contact_not_configured() {
    // Arrange
    let contact = MockContactService::new().with_send_message(
        ContactSubmission {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: None,
            message: "Hi".into(),
        },
        Err(ContactSendMessageError::Email(EmailSendError::NotConfigured)),
    );
    let router = router(contact, MockOrderService::new());

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/contact",
            json!({"name": "John Doe", "email": "john@example.com", "message": "Hi"}),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        failure("Server configuration error. Please contact administrator.")
    );
}

#[tokio::test]
async fn contact_unexpected_error() {
    // Arrange
    let contact = MockContactService::new().with_send_message(
        ContactSubmission {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            phone: None,
            message: "Hi".into(),
        },
        Err(ContactSendMessageError::Other(anyhow!("template missing"))),
    );
    let router = router(contact, MockOrderService::new());

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/contact",
            json!({"name": "John Doe", "email": "john@example.com", "message": "Hi"}),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, failure("Failed to send email. Please try again later."));
}

#[tokio::test]
async fn order_custom_without_items() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/order",
            order_fields(json!({"orderType": "custom", "productDetails": []})),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        failure("Custom orders require an array of product details")
    );
}

#[tokio::test]
async fn order_missing_fields() {
    // Arrange
    let router = router(MockContactService::new(), MockOrderService::new());

    // Act
    let (status, body) = send(
        router,
        json_request(Method::POST, "/api/order", json!({"name": "Jane Roe"})),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, failure("All required fields must be filled"));
}

#[tokio::test]
async fn order_single() {
    // Arrange
    let order = MockOrderService::new().with_submit_order(
        OrderSubmission {
            product_details: ProductDetails::Single(ProductDetail {
                size: Some("12\"".into()),
                product_type: Some("pizza-box".into()),
                dimensions: None,
                quantity: None,
            }),
            quantity: Some("100".into()),
            name: "Jane Roe".into(),
            email: "jane@example.com".into(),
            phone: "555-0100".into(),
            address: "1 Main St".into(),
            city: "Toronto".into(),
            province: "ON".into(),
            postal_code: "M5V 1A1".into(),
            additional_notes: None,
        },
        Ok(()),
    );
    let router = router(MockContactService::new(), order);

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/order",
            order_fields(json!({
                "orderType": "single",
                "productDetails": {"size": "12\"", "type": "pizza-box"},
                "quantity": 100,
            })),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Order submitted successfully! We will contact you soon."})
    );
}

#[tokio::test]
async fn order_provider_error() {
    // Arrange
    let mut order = MockOrderService::new();
    order.expect_submit_order().once().return_once(|_| {
        Box::pin(std::future::ready(Err(OrderSubmitError::Email(
            EmailSendError::Provider {
                code: 421,
                source: anyhow!("try again later"),
            },
        ))))
    });
    let router = router(MockContactService::new(), order);

    // Act
    let (status, body) = send(
        router,
        json_request(
            Method::POST,
            "/api/order",
            order_fields(json!({
                "orderType": "custom",
                "productDetails": [{"size": "10\"", "quantity": 5}],
            })),
        ),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        failure("Email service error: 421. Please try again later.")
    );
}
