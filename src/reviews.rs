//! Recipe reviews.
//!
//! Reviews live in memory for the duration of a run; the shipped apps
//! never persist them. The average rating is derived on read.

use chrono::Utc;
use parking_lot::Mutex;

use crate::store::local_id;
use crate::types::Review;

#[derive(Default)]
pub struct ReviewBook {
    reviews: Mutex<Vec<Review>>,
}

impl ReviewBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a review. Ratings are clamped to whole stars, 1–5.
    pub fn add(&self, recipe_id: &str, rating: u8, comment: &str, author: &str) -> Review {
        let review = Review {
            id: local_id("review"),
            recipe_id: recipe_id.to_string(),
            rating: rating.clamp(1, 5),
            comment: comment.to_string(),
            author: author.to_string(),
            date: Utc::now().to_rfc3339(),
        };
        self.reviews.lock().push(review.clone());
        review
    }

    /// Change an existing review's rating and comment. Returns false when
    /// the review is gone.
    pub fn edit(&self, review_id: &str, rating: u8, comment: &str) -> bool {
        let mut reviews = self.reviews.lock();
        match reviews.iter_mut().find(|r| r.id == review_id) {
            Some(review) => {
                review.rating = rating.clamp(1, 5);
                review.comment = comment.to_string();
                true
            }
            None => false,
        }
    }

    pub fn delete(&self, review_id: &str) -> bool {
        let mut reviews = self.reviews.lock();
        let before = reviews.len();
        reviews.retain(|r| r.id != review_id);
        reviews.len() != before
    }

    /// All reviews for a recipe, oldest first.
    pub fn for_recipe(&self, recipe_id: &str) -> Vec<Review> {
        self.reviews
            .lock()
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    /// Arithmetic mean of the recipe's ratings; 0.0 when it has none.
    pub fn average_rating(&self, recipe_id: &str) -> f64 {
        let reviews = self.reviews.lock();
        let ratings: Vec<u8> = reviews
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .map(|r| r.rating)
            .collect();
        if ratings.is_empty() {
            return 0.0;
        }
        ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_five_three_four_is_four() {
        let book = ReviewBook::new();
        book.add("r1", 5, "Great", "Asha");
        book.add("r1", 3, "Fine", "Ben");
        book.add("r1", 4, "Good", "Chloe");
        assert_eq!(book.average_rating("r1"), 4.0);
    }

    #[test]
    fn no_reviews_means_zero() {
        let book = ReviewBook::new();
        assert_eq!(book.average_rating("unrated"), 0.0);
    }

    #[test]
    fn ratings_clamp_to_five_stars() {
        let book = ReviewBook::new();
        let high = book.add("r1", 9, "!!", "Asha");
        let low = book.add("r1", 0, "..", "Ben");
        assert_eq!(high.rating, 5);
        assert_eq!(low.rating, 1);
    }

    #[test]
    fn reviews_are_scoped_per_recipe() {
        let book = ReviewBook::new();
        book.add("r1", 5, "", "Asha");
        book.add("r2", 1, "", "Ben");
        assert_eq!(book.for_recipe("r1").len(), 1);
        assert_eq!(book.average_rating("r1"), 5.0);
        assert_eq!(book.average_rating("r2"), 1.0);
    }

    #[test]
    fn edit_and_delete_round_trip() {
        let book = ReviewBook::new();
        let review = book.add("r1", 2, "meh", "Asha");

        assert!(book.edit(&review.id, 4, "better on reheating"));
        assert_eq!(book.average_rating("r1"), 4.0);

        assert!(book.delete(&review.id));
        assert!(!book.delete(&review.id));
        assert!(book.for_recipe("r1").is_empty());
    }
}
