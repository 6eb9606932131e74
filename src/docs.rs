use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use schoolbook_models::{
    BloodGroup, ClassDto, ClassResponse, ClassSummary, CreateStudentDto, CreateUserDto, Gender,
    LoginForm, MessageResponse, PhotoUploadResponse, StudentListResponse, StudentResponse,
    TokenResponse, UpdateStudentDto, UserResponse, UserRole,
};

use crate::modules::system::controller::{HealthResponse, WelcomeResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::system::controller::root,
        crate::modules::system::controller::health,
        crate::modules::auth::controller::register_user,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_current_user,
        crate::modules::auth::controller::logout_user,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::list_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::list_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::upload_photo,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            CreateUserDto,
            LoginForm,
            TokenResponse,
            MessageResponse,
            ClassDto,
            ClassResponse,
            ClassSummary,
            Gender,
            BloodGroup,
            CreateStudentDto,
            UpdateStudentDto,
            StudentResponse,
            StudentListResponse,
            PhotoUploadResponse,
            WelcomeResponse,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Service information and health"),
        (name = "Authentication", description = "Registration, login and current user"),
        (name = "Classes", description = "Class management endpoints"),
        (name = "Students", description = "Student management endpoints")
    ),
    info(
        title = "Schoolbook API",
        description = "School management REST API built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
