use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use futures::StreamExt;
use mongodb::bson::doc;
use mongodb::Collection;
use serde_json::json;
use uuid::Uuid;

use crate::db;
use crate::errors::ApiError;
use crate::middleware::current_user;
use crate::models::{Product, RateInput, Rating, User};

// Mean rounded to one decimal place; 0.0 for an unrated product.
fn average(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i32 = ratings.iter().sum();
    let mean = f64::from(sum) / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

fn empty_aggregate() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "ratings": [],
        "averageRating": 0.0,
        "totalRatings": 0,
    }))
}

pub async fn get_ratings(
    ratings: web::Data<Collection<Rating>>,
    users: web::Data<Collection<User>>,
    product_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let product_id = product_id.into_inner();

    // Lenient read path: a malformed id yields an empty aggregate, not an error.
    if Uuid::parse_str(&product_id).is_err() {
        return Ok(empty_aggregate());
    }

    let mut all = vec![];
    let mut cursor = ratings.find(doc! { "product": &product_id }, None).await?;
    while let Some(result) = cursor.next().await {
        all.push(result?);
    }

    let mut resolved = Vec::with_capacity(all.len());
    for rating in &all {
        let rater = users
            .find_one(doc! { "id": &rating.user }, None)
            .await?
            .map(|user| json!({ "id": user.id, "name": user.name }));

        resolved.push(json!({
            "id": rating.id,
            "product": rating.product,
            "user": rater,
            "rating": rating.rating,
            "review": rating.review,
            "createdAt": rating.created_at,
        }));
    }

    let scores: Vec<i32> = all.iter().map(|r| r.rating).collect();

    Ok(HttpResponse::Ok().json(json!({
        "ratings": resolved,
        "averageRating": average(&scores),
        "totalRatings": all.len(),
    })))
}

pub async fn rate_product(
    ratings: web::Data<Collection<Rating>>,
    products: web::Data<Collection<Product>>,
    product_id: web::Path<String>,
    input: web::Json<RateInput>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;
    let product_id = product_id.into_inner();

    let score = match input.rating {
        Some(score) if (1..=5).contains(&score) => score,
        _ => {
            return Err(ApiError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ))
        }
    };

    products
        .find_one(doc! { "id": &product_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let existing = ratings
        .find_one(doc! { "product": &product_id, "user": &user.id }, None)
        .await?;

    if let Some(mut rating) = existing {
        rating.rating = score;
        if input.review.is_some() {
            rating.review = input.review.clone();
        }
        rating.updated_at = Utc::now();

        ratings
            .replace_one(doc! { "id": &rating.id }, &rating, None)
            .await?;

        return Ok(HttpResponse::Ok().json(json!({
            "message": "Rating updated successfully",
            "rating": rating,
        })));
    }

    let now = Utc::now();
    let rating = Rating {
        id: Uuid::new_v4().to_string(),
        product: product_id,
        user: user.id,
        rating: score,
        review: input.review.clone(),
        created_at: now,
        updated_at: now,
    };

    // The unique (product, user) index catches the race where two first-time
    // rate calls from the same user interleave.
    if let Err(err) = ratings.insert_one(&rating, None).await {
        if db::is_duplicate_key(&err) {
            return Err(ApiError::Validation(
                "You have already rated this product".to_string(),
            ));
        }
        return Err(err.into());
    }

    Ok(HttpResponse::Created().json(json!({
        "message": "Rating added successfully",
        "rating": rating,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_five_and_three_is_four() {
        assert_eq!(average(&[5, 3]), 4.0);
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average(&[]), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average(&[3, 4]), 3.5);
        assert_eq!(average(&[2, 2, 3]), 2.3);
        assert_eq!(average(&[1, 1, 2]), 1.3);
        assert_eq!(average(&[5]), 5.0);
    }
}
