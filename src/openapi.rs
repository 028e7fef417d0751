use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    entities::{
        faqs::{Answer, AuthorSnapshot},
        leads::{LeadStatus, VehicleSnapshot},
        products::Category,
        users::{Provider, Role},
    },
    error::ErrorResponse,
    handler::{
        self,
        auth::{
            AvatarResponse, GoogleLoginRequest, LoginRequest, MeResponse, ProfilePictureForm,
            RegisterRequest, SessionResponse, UpdateAvatarRequest, UploadResponse, UserResponse,
        },
        faq::{AnswerRequest, FaqResponse, QuestionRequest},
        health::{Banner, Endpoints, Health},
        leads::{
            CreateLeadRequest, DeletedLeadResponse, LeadResponse, LeadStatsResponse,
            UpdateStatusRequest, VehiclePayload,
        },
        products::{ProductPayload, ProductResponse},
        users::{BulkDeleteRequest, BulkDeleteResponse, CreateAdminRequest},
        MessageResponse, Numeric,
    },
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::banner,
        handler::health::health,
        handler::auth::register,
        handler::auth::login,
        handler::auth::google,
        handler::auth::me,
        handler::auth::upload_profile_picture,
        handler::auth::update_avatar,
        handler::products::list_products,
        handler::products::get_product,
        handler::products::create_product,
        handler::products::update_product,
        handler::products::delete_product,
        handler::leads::create_lead,
        handler::leads::list_leads,
        handler::leads::lead_stats,
        handler::leads::get_lead,
        handler::leads::update_lead_status,
        handler::leads::delete_lead,
        handler::users::list_users,
        handler::users::create_admin,
        handler::users::delete_user,
        handler::users::bulk_delete,
        handler::faq::list_faqs,
        handler::faq::ask_question,
        handler::faq::add_answer,
        handler::faq::edit_question,
        handler::faq::delete_question,
        handler::faq::edit_answer,
        handler::faq::delete_answer
    ),
    components(schemas(
        ErrorResponse, MessageResponse, Numeric,
        Banner, Endpoints, Health,
        Role, Provider, UserResponse, SessionResponse, MeResponse,
        RegisterRequest, LoginRequest, GoogleLoginRequest, UpdateAvatarRequest,
        UploadResponse, AvatarResponse, ProfilePictureForm,
        Category, ProductPayload, ProductResponse,
        LeadStatus, VehicleSnapshot, VehiclePayload, CreateLeadRequest, UpdateStatusRequest,
        LeadResponse, LeadStatsResponse, DeletedLeadResponse,
        CreateAdminRequest, BulkDeleteRequest, BulkDeleteResponse,
        AuthorSnapshot, Answer, QuestionRequest, AnswerRequest, FaqResponse
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Banner and health check"),
        (name = "auth", description = "Registration, sign-in and profile pictures"),
        (name = "products", description = "Vehicle catalog"),
        (name = "leads", description = "Sales inquiries"),
        (name = "users", description = "Account administration"),
        (name = "faq", description = "Questions and answers")
    )
)]
pub struct ApiDoc;
