//! OpenAPI document for the HTTP surface.
//!
//! Handlers are annotated with `#[utoipa::path]`; this derive collects them
//! and the swagger UI serves the result under `/swagger-ui`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::auth::register::register,
        crate::api::handlers::auth::login::login,
        crate::api::handlers::auth::verify::verify_otp,
        crate::api::handlers::auth::verify::resend_otp,
    ),
    components(schemas(
        crate::api::handlers::health::Health,
        crate::api::handlers::auth::types::RegisterRequest,
        crate::api::handlers::auth::types::RegisterResponse,
        crate::api::handlers::auth::types::LoginRequest,
        crate::api::handlers::auth::types::LoginUser,
        crate::api::handlers::auth::types::LoginResponse,
        crate::api::handlers::auth::types::RequireOtpResponse,
        crate::api::handlers::auth::types::VerifyOtpRequest,
        crate::api::handlers::auth::types::ResendOtpRequest,
        crate::api::handlers::auth::types::MessageResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and OTP verification"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_auth_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/auth/register"));
        assert!(paths.contains_key("/api/v1/auth/login"));
        assert!(paths.contains_key("/api/v1/auth/verify-otp"));
        assert!(paths.contains_key("/api/v1/auth/resend-otp"));
        assert!(paths.contains_key("/health"));
    }
}
