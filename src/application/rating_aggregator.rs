use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::Product;
use crate::domain::review::RatingSummary;

/// Keeps a product's cached `rating` and `review_count` in line with its reviews.
pub struct RatingAggregator<R> {
    products: R,
}

impl<R: ProductRepository> RatingAggregator<R> {
    pub fn new(products: R) -> Self {
        Self { products }
    }

    pub fn recompute_rating(&self, product_id: Uuid) -> Result<Product, DomainError> {
        let product = self
            .products
            .update_product_with_ratings(product_id, &mut |p, ratings| {
                p.apply_rating(RatingSummary::from_ratings(ratings));
                Ok(())
            })?;
        log::debug!(
            "Product {} rating recomputed: {:.2} over {} reviews",
            product_id,
            product.rating,
            product.review_count
        );
        Ok(product)
    }
}
