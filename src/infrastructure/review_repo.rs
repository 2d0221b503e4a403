use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ReviewRepository;
use crate::domain::review::{NewReview, Review};
use crate::schema::reviews;

use super::models::{NewReviewRow, ReviewRow};
use super::DieselStore;

impl ReviewRepository for DieselStore {
    fn insert_review(&self, review: NewReview) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(reviews::table)
            .values(&NewReviewRow {
                id: Uuid::new_v4(),
                product_id: review.product_id,
                user_id: review.user_id,
                rating: review.rating,
                comment: review.comment,
            })
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn find_review(&self, id: Uuid) -> Result<Option<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = reviews::table
            .find(id)
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Review::from))
    }

    fn list_reviews(&self) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = reviews::table
            .select(ReviewRow::as_select())
            .order((reviews::created_at.desc(), reviews::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    fn find_reviews_by_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = reviews::table
            .filter(reviews::product_id.eq(product_id))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.desc(), reviews::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    fn find_reviews_by_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = reviews::table
            .filter(reviews::user_id.eq(user_id))
            .select(ReviewRow::as_select())
            .order((reviews::created_at.desc(), reviews::id.asc()))
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    fn save_review(&self, review: &Review) -> Result<Review, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(reviews::table.find(review.id))
            .set((
                reviews::rating.eq(review.rating),
                reviews::comment.eq(review.comment.as_deref()),
                reviews::updated_at.eq(Utc::now()),
            ))
            .returning(ReviewRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .ok_or_else(|| DomainError::not_found("Review", review.id))?;
        Ok(row.into())
    }

    fn delete_review(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(reviews::table.find(id)).execute(&mut conn)?;
        Ok(deleted > 0)
    }
}
