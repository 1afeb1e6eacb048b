//! Display-ready views of catalog data: product references populated to full
//! records and image keys exchanged for signed URLs before anything leaves
//! the API.

use std::collections::HashMap;

use futures::future::join_all;
use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Collection;
use serde::Serialize;

use crate::models::{Cart, LineItem, Order, OrderStatus, Product};
use crate::storage::BlobStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub title: String,
    pub new_price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    // Signed URL or null, never the stored object key.
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_features: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction_to_use: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LineItemView {
    // Null when the referenced product no longer exists in the catalog.
    pub product: Option<ProductView>,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: String,
    pub user: String,
    pub products: Vec<LineItemView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub user: String,
    pub products: Vec<LineItemView>,
    pub order_status: OrderStatus,
}

pub async fn product_view(store: &BlobStore, product: Product) -> ProductView {
    let img = match &product.img {
        Some(key) => store.signed_url(key).await,
        None => None,
    };
    ProductView {
        id: product.id,
        title: product.title,
        new_price: product.new_price,
        old_price: product.old_price,
        discount: product.discount,
        brand: product.brand,
        category: product.category,
        img,
        description: product.description,
        net_weight: product.net_weight,
        product_features: product.product_features,
        direction_to_use: product.direction_to_use,
    }
}

// All images are signed concurrently; one slow or failing signature does not
// hold up or poison the rest.
pub async fn product_views(store: &BlobStore, products: Vec<Product>) -> Vec<ProductView> {
    join_all(products.into_iter().map(|p| product_view(store, p))).await
}

async fn populate_items(
    products: &Collection<Product>,
    store: &BlobStore,
    items: &[LineItem],
) -> Result<Vec<LineItemView>, mongodb::error::Error> {
    let ids: Vec<String> = items.iter().map(|i| i.product.clone()).collect();

    let mut found: HashMap<String, Product> = HashMap::new();
    if !ids.is_empty() {
        let mut cursor = products.find(doc! { "id": { "$in": ids } }, None).await?;
        while let Some(product) = cursor.try_next().await? {
            found.insert(product.id.clone(), product);
        }
    }

    let paired: Vec<(Option<Product>, i32)> = items
        .iter()
        .map(|item| (found.remove(&item.product), item.quantity))
        .collect();

    let views = join_all(paired.into_iter().map(|(product, quantity)| async move {
        let product = match product {
            Some(p) => Some(product_view(store, p).await),
            None => None,
        };
        LineItemView { product, quantity }
    }))
    .await;

    Ok(views)
}

pub async fn cart_view(
    products: &Collection<Product>,
    store: &BlobStore,
    cart: Cart,
) -> Result<CartView, mongodb::error::Error> {
    let items = populate_items(products, store, &cart.products).await?;
    Ok(CartView {
        id: cart.id,
        user: cart.user,
        products: items,
    })
}

pub async fn order_view(
    products: &Collection<Product>,
    store: &BlobStore,
    order: Order,
) -> Result<OrderView, mongodb::error::Error> {
    let items = populate_items(products, store, &order.products).await?;
    Ok(OrderView {
        id: order.id,
        user: order.user,
        products: items,
        order_status: order.order_status,
    })
}
