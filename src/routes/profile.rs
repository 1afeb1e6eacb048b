use actix_web::{web, HttpRequest, HttpResponse};
use mongodb::bson::doc;
use mongodb::Collection;
use serde_json::json;

use crate::errors::ApiError;
use crate::middleware::current_user;
use crate::models::{Dealer, User};

// Sanitized views: the password hash never leaves the credential store.

pub async fn user_profile(
    users: web::Data<Collection<User>>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let auth = current_user(&req)?;

    let user = users
        .find_one(doc! { "id": &auth.id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "msg": "Profile",
        "userData": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        }
    })))
}

pub async fn dealer_profile(
    dealers: web::Data<Collection<Dealer>>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let auth = current_user(&req)?;

    let dealer = dealers
        .find_one(doc! { "id": &auth.id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Dealer not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "dealer": {
            "id": dealer.id,
            "name": dealer.name,
            "mobile": dealer.mobile,
            "email": dealer.email,
            "storeName": dealer.store_name,
            "gstn": dealer.gstn,
            "location": dealer.location,
            "role": dealer.role,
            "createdAt": dealer.created_at,
        }
    })))
}
