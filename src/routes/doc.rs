use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, ForgotPasswordResponse,
            LoginRequest, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
        },
        bookings::{
            BookingList, CancelBookingRequest, CreateBookingRequest, RescheduleBookingRequest,
            UpdateBookingStatusRequest,
        },
        lawyers::{
            AvailabilityResponse, CreateLawyerRequest, LawyerList, LawyerStats,
            SetAvailabilityRequest, UpdateLawyerRequest,
        },
        legal_info::{ArticleList, CreateArticleRequest, UpdateArticleRequest},
        reviews::{CreateReviewRequest, LawyerReviewList, MyReviewList, UpdateReviewRequest},
    },
    models::{
        AvailabilitySlot, Booking, BookingDetail, BookingStatus, Lawyer, LawyerDetail,
        LawyerRating, LegalArticle, Review, ReviewWithClient, ReviewWithLawyer, Role, Urgency,
        User,
    },
    response::{ApiResponse, Meta},
    routes::{auth, bookings, health, lawyers, legal_info, params, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
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
        health::health_check,
        health::service_info,
        auth::register,
        auth::login,
        auth::profile,
        auth::update_profile,
        auth::change_password,
        auth::forgot_password,
        auth::reset_password,
        lawyers::list_lawyers,
        lawyers::search_lawyers,
        lawyers::get_lawyer,
        lawyers::create_lawyer,
        lawyers::update_lawyer,
        lawyers::get_availability,
        lawyers::set_availability,
        lawyers::lawyer_stats,
        bookings::create_booking,
        bookings::my_bookings,
        bookings::lawyer_bookings,
        bookings::get_booking,
        bookings::update_status,
        bookings::cancel_booking,
        bookings::complete_booking,
        bookings::reschedule_booking,
        reviews::create_review,
        reviews::lawyer_reviews,
        reviews::lawyer_rating,
        reviews::my_reviews,
        reviews::update_review,
        reviews::delete_review,
        legal_info::list_articles,
        legal_info::search_articles,
        legal_info::articles_by_category,
        legal_info::popular_articles,
        legal_info::get_article,
        legal_info::related_articles,
        legal_info::create_article,
        legal_info::update_article,
        legal_info::delete_article
    ),
    components(
        schemas(
            Role,
            BookingStatus,
            Urgency,
            User,
            Lawyer,
            LawyerDetail,
            AvailabilitySlot,
            Booking,
            BookingDetail,
            Review,
            ReviewWithClient,
            ReviewWithLawyer,
            LawyerRating,
            LegalArticle,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            ForgotPasswordRequest,
            ForgotPasswordResponse,
            ResetPasswordRequest,
            CreateLawyerRequest,
            UpdateLawyerRequest,
            SetAvailabilityRequest,
            AvailabilityResponse,
            LawyerList,
            LawyerStats,
            CreateBookingRequest,
            UpdateBookingStatusRequest,
            CancelBookingRequest,
            RescheduleBookingRequest,
            BookingList,
            CreateReviewRequest,
            UpdateReviewRequest,
            LawyerReviewList,
            MyReviewList,
            CreateArticleRequest,
            UpdateArticleRequest,
            ArticleList,
            params::Pagination,
            params::LawyerSortBy,
            params::LawyerSearchQuery,
            health::HealthData,
            health::ServiceInfo,
            Meta,
            ApiResponse<User>,
            ApiResponse<AuthResponse>,
            ApiResponse<LawyerList>,
            ApiResponse<BookingList>,
            ApiResponse<Booking>,
            ApiResponse<Review>,
            ApiResponse<ArticleList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and account endpoints"),
        (name = "Lawyers", description = "Lawyer profiles, search and availability"),
        (name = "Bookings", description = "Consultation bookings"),
        (name = "Reviews", description = "Reviews and lawyer ratings"),
        (name = "Legal Info", description = "Legal information articles"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_booking_routes() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/bookings"));
        assert!(spec.paths.paths.contains_key("/api/bookings/{id}/reschedule"));
        assert!(spec.paths.paths.contains_key("/api/legal-info/{id}/related"));
    }
}
