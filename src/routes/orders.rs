use actix_web::{web, HttpRequest, HttpResponse};
use futures::StreamExt;
use mongodb::bson::doc;
use mongodb::Collection;
use serde_json::json;

use crate::errors::ApiError;
use crate::middleware::current_user;
use crate::models::{Cart, Order, OrderStatus, Product};
use crate::storage::BlobStore;
use crate::views;

pub async fn list_orders(
    orders: web::Data<Collection<Order>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    let mut all = vec![];
    let mut cursor = orders.find(doc! { "user": &user.id }, None).await?;
    while let Some(result) = cursor.next().await {
        all.push(result?);
    }

    let mut resolved = Vec::with_capacity(all.len());
    for order in all {
        resolved.push(views::order_view(&products, &store, order).await?);
    }

    Ok(HttpResponse::Ok().json(json!({ "orders": resolved })))
}

pub async fn place_order(
    orders: web::Data<Collection<Order>>,
    carts: web::Data<Collection<Cart>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    let mut cart = match carts.find_one(doc! { "user": &user.id }, None).await? {
        Some(cart) if !cart.is_empty() => cart,
        _ => return Err(ApiError::EmptyCart),
    };

    let order = Order::from_cart(&user.id, cart.products.clone());
    orders.insert_one(&order, None).await?;

    // The cart survives as an empty shell.
    cart.products.clear();
    carts
        .replace_one(doc! { "id": &cart.id }, &cart, None)
        .await?;

    let order = views::order_view(&products, &store, order).await?;
    Ok(HttpResponse::Created().json(json!({ "order": order })))
}

pub async fn get_order(
    orders: web::Data<Collection<Order>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    order_id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    let order = orders
        .find_one(doc! { "id": &order_id.into_inner(), "user": &user.id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    let order = views::order_view(&products, &store, order).await?;
    Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

async fn find_owned_order(
    orders: &Collection<Order>,
    order_id: &str,
    user_id: &str,
) -> Result<Order, ApiError> {
    orders
        .find_one(doc! { "id": order_id, "user": user_id }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
}

pub async fn increase_order_item(
    orders: web::Data<Collection<Order>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;
    let (order_id, product_id) = path.into_inner();

    let mut order = find_owned_order(&orders, &order_id, &user.id).await?;
    if !order.increase_item(&product_id) {
        return Err(ApiError::NotFound("Product not found in order".to_string()));
    }

    orders
        .replace_one(doc! { "id": &order.id }, &order, None)
        .await?;

    let order = views::order_view(&products, &store, order).await?;
    Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

pub async fn decrease_order_item(
    orders: web::Data<Collection<Order>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    path: web::Path<(String, String)>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;
    let (order_id, product_id) = path.into_inner();

    let mut order = find_owned_order(&orders, &order_id, &user.id).await?;
    if !order.decrease_item(&product_id) {
        return Err(ApiError::NotFound("Product not found in order".to_string()));
    }

    orders
        .replace_one(doc! { "id": &order.id }, &order, None)
        .await?;

    let order = views::order_view(&products, &store, order).await?;
    Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

pub async fn mark_order_placed(
    orders: web::Data<Collection<Order>>,
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    order_id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = current_user(&req)?;

    let mut order = find_owned_order(&orders, &order_id.into_inner(), &user.id).await?;

    // Unconditional: placing an already-placed order is an idempotent no-op.
    order.order_status = OrderStatus::Placed;
    orders
        .replace_one(doc! { "id": &order.id }, &order, None)
        .await?;

    let order = views::order_view(&products, &store, order).await?;
    Ok(HttpResponse::Ok().json(json!({ "order": order })))
}
