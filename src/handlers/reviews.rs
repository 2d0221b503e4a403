use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppState;
use crate::domain::ports::Store;
use crate::domain::review::{NewReview, Review, ReviewPatch};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub product_id: Uuid,
    pub user_id: Uuid,
    /// 1 to 5
    pub rating: i32,
    pub comment: Option<String>,
}

/// Fields left out of the body keep their current value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(r: Review) -> Self {
        ReviewResponse {
            id: r.id,
            product_id: r.product_id,
            user_id: r.user_id,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AverageRatingResponse {
    pub product_id: Uuid,
    pub average_rating: f64,
}

fn to_responses(reviews: Vec<Review>) -> Vec<ReviewResponse> {
    reviews.into_iter().map(ReviewResponse::from).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/reviews
///
/// Stores the review and refreshes the product's cached rating and count.
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Unknown product or user"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn create_review<S: Store>(
    state: web::Data<AppState<S>>,
    body: web::Json<CreateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let new_review = NewReview {
        product_id: body.product_id,
        user_id: body.user_id,
        rating: body.rating,
        comment: body.comment,
    };
    let review = web::block(move || state.reviews.create_review(new_review)).await??;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review UUID"),
    ),
    responses(
        (status = 200, description = "Review found", body = ReviewResponse),
        (status = 404, description = "Review not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn get_review<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();
    let review = web::block(move || state.reviews.get_review(review_id)).await??;
    Ok(HttpResponse::Ok().json(ReviewResponse::from(review)))
}

/// PUT /api/reviews/{id}
///
/// Changes rating and/or comment, then refreshes the product's cached rating.
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review UUID"),
    ),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ReviewResponse),
        (status = 400, description = "Rating out of range"),
        (status = 404, description = "Review not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn update_review<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();
    let body = body.into_inner();
    let patch = ReviewPatch {
        rating: body.rating,
        comment: body.comment,
    };
    let review = web::block(move || state.reviews.update_review(review_id, patch)).await??;
    Ok(HttpResponse::Ok().json(ReviewResponse::from(review)))
}

/// DELETE /api/reviews/{id}
///
/// Succeeds whether or not the review existed.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(
        ("id" = Uuid, Path, description = "Review UUID"),
    ),
    responses(
        (status = 204, description = "Review deleted or already absent"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn delete_review<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let review_id = path.into_inner();
    web::block(move || state.reviews.delete_review(review_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/reviews/product/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Reviews of the product, newest first", body = [ReviewResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn reviews_for_product<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let reviews = web::block(move || state.reviews.reviews_for_product(product_id)).await??;
    Ok(HttpResponse::Ok().json(to_responses(reviews)))
}

#[utoipa::path(
    get,
    path = "/api/reviews/product/{product_id}/average",
    params(
        ("product_id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Average rating, 0.0 without reviews", body = AverageRatingResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn average_rating<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let product_id = path.into_inner();
    let average = web::block(move || state.reviews.average_rating(product_id)).await??;
    Ok(HttpResponse::Ok().json(AverageRatingResponse {
        product_id,
        average_rating: average,
    }))
}

#[utoipa::path(
    get,
    path = "/api/reviews/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "Author UUID"),
    ),
    responses(
        (status = 200, description = "Reviews written by the user, newest first", body = [ReviewResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn reviews_for_user<S: Store>(
    state: web::Data<AppState<S>>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let reviews = web::block(move || state.reviews.reviews_for_user(user_id)).await??;
    Ok(HttpResponse::Ok().json(to_responses(reviews)))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Every review, newest first", body = [ReviewResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "reviews"
)]
pub async fn list_reviews<S: Store>(
    state: web::Data<AppState<S>>,
) -> Result<HttpResponse, AppError> {
    let reviews = web::block(move || state.reviews.list_reviews()).await??;
    Ok(HttpResponse::Ok().json(to_responses(reviews)))
}
