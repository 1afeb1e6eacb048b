use actix_web::{web, HttpRequest, HttpResponse};
use mongodb::bson::doc;
use mongodb::Collection;
use serde_json::json;

use crate::errors::ApiError;
use crate::middleware::current_user;
use crate::models::{AddToCartInput, Cart, Product};
use crate::storage::BlobStore;
use crate::views;

pub async fn get_cart(
    carts: web::Data<Collection<Cart>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    match carts.find_one(doc! { "user": &user.id }, None).await? {
        // No cart yet: an empty virtual cart, not an error.
        None => Ok(HttpResponse::Ok().json(json!({ "cart": { "products": [] } }))),
        Some(cart) => {
            let cart = views::cart_view(&products, &store, cart).await?;
            Ok(HttpResponse::Ok().json(json!({ "cart": cart })))
        }
    }
}

pub async fn add_to_cart(
    carts: web::Data<Collection<Cart>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    input: web::Json<AddToCartInput>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;
    let quantity = input.quantity.filter(|q| *q != 0).unwrap_or(1);

    match carts.find_one(doc! { "user": &user.id }, None).await? {
        None => {
            let cart = Cart::new(&user.id, &input.product_id, quantity);
            carts.insert_one(&cart, None).await?;

            let cart = views::cart_view(&products, &store, cart).await?;
            Ok(HttpResponse::Created().json(json!({
                "message": "Cart created",
                "cart": cart,
            })))
        }
        Some(mut cart) => {
            cart.add_item(&input.product_id, quantity);
            carts
                .replace_one(doc! { "id": &cart.id }, &cart, None)
                .await?;

            let cart = views::cart_view(&products, &store, cart).await?;
            Ok(HttpResponse::Ok().json(json!({
                "message": "Product added to cart",
                "cart": cart,
            })))
        }
    }
}

pub async fn remove_from_cart(
    carts: web::Data<Collection<Cart>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    product_id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    let mut cart = carts
        .find_one(doc! { "user": &user.id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

    // A product that is not in the cart is a silent no-op.
    cart.remove_item(&product_id.into_inner());
    carts
        .replace_one(doc! { "id": &cart.id }, &cart, None)
        .await?;

    let cart = views::cart_view(&products, &store, cart).await?;
    Ok(HttpResponse::Ok().json(json!({ "cart": cart })))
}

pub async fn decrement_cart_item(
    carts: web::Data<Collection<Cart>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    product_id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    let mut cart = carts
        .find_one(doc! { "user": &user.id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;

    if !cart.decrement_item(&product_id.into_inner()) {
        return Err(ApiError::NotFound("Product not found in cart".to_string()));
    }

    carts
        .replace_one(doc! { "id": &cart.id }, &cart, None)
        .await?;

    let cart = views::cart_view(&products, &store, cart).await?;
    Ok(HttpResponse::Ok().json(json!({ "cart": cart })))
}
