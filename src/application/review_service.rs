use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{ProductRepository, ReviewRepository, UserRepository};
use crate::domain::review::{validate_rating, NewReview, RatingSummary, Review, ReviewPatch};

use super::rating_aggregator::RatingAggregator;

/// Review writes. Each one finishes by recomputing the product's cached rating.
pub struct ReviewService<S> {
    store: S,
    aggregator: RatingAggregator<S>,
}

impl<S> ReviewService<S>
where
    S: ReviewRepository + ProductRepository + UserRepository + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            aggregator: RatingAggregator::new(store.clone()),
            store,
        }
    }

    pub fn create_review(&self, review: NewReview) -> Result<Review, DomainError> {
        validate_rating(review.rating)?;
        if self.store.find_product(review.product_id)?.is_none() {
            return Err(DomainError::not_found("Product", review.product_id));
        }
        if self.store.find_user(review.user_id)?.is_none() {
            return Err(DomainError::not_found("User", review.user_id));
        }

        let saved = self.store.insert_review(review)?;
        self.aggregator.recompute_rating(saved.product_id)?;
        log::info!(
            "Review {} created for product {} (rating {})",
            saved.id,
            saved.product_id,
            saved.rating
        );
        Ok(saved)
    }

    pub fn update_review(&self, id: Uuid, patch: ReviewPatch) -> Result<Review, DomainError> {
        patch.validate()?;
        let mut review = self
            .store
            .find_review(id)?
            .ok_or_else(|| DomainError::not_found("Review", id))?;

        review.apply(patch);
        let saved = self.store.save_review(&review)?;
        self.aggregator.recompute_rating(saved.product_id)?;
        log::info!("Review {} updated (rating {})", saved.id, saved.rating);
        Ok(saved)
    }

    /// Deleting a review that does not exist is a no-op.
    pub fn delete_review(&self, id: Uuid) -> Result<(), DomainError> {
        let Some(review) = self.store.find_review(id)? else {
            log::debug!("Review {} already gone, nothing to delete", id);
            return Ok(());
        };

        self.store.delete_review(id)?;
        self.aggregator.recompute_rating(review.product_id)?;
        log::info!("Review {} deleted from product {}", id, review.product_id);
        Ok(())
    }

    pub fn get_review(&self, id: Uuid) -> Result<Review, DomainError> {
        self.store
            .find_review(id)?
            .ok_or_else(|| DomainError::not_found("Review", id))
    }

    pub fn list_reviews(&self) -> Result<Vec<Review>, DomainError> {
        self.store.list_reviews()
    }

    pub fn reviews_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.store.find_reviews_by_product(product_id)
    }

    pub fn reviews_for_user(&self, user_id: Uuid) -> Result<Vec<Review>, DomainError> {
        self.store.find_reviews_by_user(user_id)
    }

    /// Live average over the product's reviews, 0.0 when there are none.
    pub fn average_rating(&self, product_id: Uuid) -> Result<f64, DomainError> {
        let ratings: Vec<i32> = self
            .store
            .find_reviews_by_product(product_id)?
            .iter()
            .map(|r| r.rating)
            .collect();
        Ok(RatingSummary::from_ratings(&ratings).average)
    }
}
