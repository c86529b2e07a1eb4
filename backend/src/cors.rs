//! Cross-origin access for the browser client.

use crate::config::ServiceConfig;
use actix_cors::Cors;
use actix_web::http::header;

/// Builds the CORS middleware from `CERTS_CORS_ORIGIN`.
///
/// With no origins configured, or with `*` among them, any origin may call the API.
pub fn cors(config: &ServiceConfig) -> Cors {
    let base = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600);

    let origins = config.cors_origins();
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return base.allow_any_origin();
    }

    origins
        .iter()
        .fold(base, |cors, origin| cors.allowed_origin(origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services;
    use actix_web::http::{Method, StatusCode};
    use actix_web::{test, App};

    fn preflight(origin: &str) -> test::TestRequest {
        test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/certificates/import")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization"))
    }

    #[actix_web::test]
    async fn preflight_from_a_configured_origin_is_allowed() {
        let config = ServiceConfig {
            cors_origin: Some("http://localhost:5173,https://certs.example.org".to_string()),
            ..ServiceConfig::default()
        };
        let app =
            test::init_service(App::new().wrap(cors(&config)).configure(services::configure)).await;

        let resp = test::call_service(&app, preflight("https://certs.example.org").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://certs.example.org"
        );
    }

    #[actix_web::test]
    async fn preflight_from_an_unlisted_origin_gets_no_grant() {
        let config = ServiceConfig {
            cors_origin: Some("http://localhost:5173".to_string()),
            ..ServiceConfig::default()
        };
        let app =
            test::init_service(App::new().wrap(cors(&config)).configure(services::configure)).await;

        // Rejected either as an error response or as a 4xx without the grant header
        if let Ok(resp) = test::try_call_service(&app, preflight("http://evil.test").to_request()).await {
            assert!(resp.status().is_client_error());
            assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        }
    }

    #[actix_web::test]
    async fn any_origin_is_allowed_when_none_are_configured() {
        let app = test::init_service(
            App::new()
                .wrap(cors(&ServiceConfig::default()))
                .configure(services::configure),
        )
        .await;

        let resp = test::call_service(&app, preflight("http://localhost:3000").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
