//! OpenAPI documentation configuration.

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa_swagger_ui::SwaggerUi;

use super::{auth, cloud, grades, health, lunches, messages, people, timeline, timetable};
use crate::pipeline::TOKEN_HEADER;

/// OpenAPI documentation for the edubridge API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "edubridge API",
        description = "REST gateway to a school portal",
        version = "1.0.0",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Local server"),
    ),
    paths(
        // Health
        health::health,
        // Auth
        auth::authenticate_handler,
        auth::authenticate_auto_handler,
        auth::logout_handler,
        // Timetable
        timetable::timetable_handler,
        timetable::timetable_changes_handler,
        timetable::foreign_timetable_handler,
        timetable::next_ringing_handler,
        // People
        people::students_handler,
        people::teachers_handler,
        people::missing_teachers_handler,
        // Messages
        messages::send_message_handler,
        // Lunches
        lunches::get_lunches_handler,
        lunches::choose_lunch_handler,
        lunches::sign_off_lunch_handler,
        // Timeline
        timeline::timeline_handler,
        // Cloud
        cloud::cloud_upload_handler,
        // Grades
        grades::grades_handler,
        grades::school_year_handler,
    ),
    components(
        schemas(
            health::HealthResponse,
            auth::AuthenticateRequest,
            auth::AuthenticateAutoRequest,
            auth::TokenResponse,
            messages::MessageRequest,
            lunches::ChooseLunchRequest,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Login and session management"),
        (name = "timetable", description = "Timetables and bells"),
        (name = "people", description = "Students and teachers"),
        (name = "messages", description = "Messaging"),
        (name = "lunches", description = "Canteen"),
        (name = "timeline", description = "Notification feed"),
        (name = "cloud", description = "File uploads"),
        (name = "grades", description = "Grades and school year"),
    )
)]
pub struct ApiDoc;

/// Add the session token header scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(TOKEN_HEADER))),
            );
        }
    }
}

/// Create the Swagger UI router.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/api/docs").url("/api/openapi.json", ApiDoc::openapi())
}
