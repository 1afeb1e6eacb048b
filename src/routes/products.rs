use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::doc;
use mongodb::Collection;
use serde_json::json;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::Product;
use crate::storage::BlobStore;
use crate::views;

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub async fn list_products(
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
) -> Result<HttpResponse, ApiError> {
    let mut all = vec![];
    let mut cursor = products.find(None, None).await?;
    while let Some(result) = cursor.next().await {
        all.push(result?);
    }

    let resolved = views::product_views(&store, all).await;
    Ok(HttpResponse::Ok().json(resolved))
}

pub async fn get_product(
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let product = products
        .find_one(doc! { "id": &id.into_inner() }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product Not Found".to_string()))?;

    let resolved = views::product_view(&store, product).await;
    Ok(HttpResponse::Ok().json(resolved))
}

#[derive(Default)]
struct NewProductForm {
    title: Option<String>,
    new_price: Option<String>,
    old_price: Option<String>,
    discount: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    description: Option<String>,
    net_weight: Option<String>,
    product_features: Option<String>,
    direction_to_use: Option<String>,
    img: Option<UploadedFile>,
}

struct UploadedFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

async fn read_form(mut payload: Multipart) -> Result<NewProductForm, ApiError> {
    let mut form = NewProductForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|err| ApiError::Validation(err.to_string()))?
    {
        let name = field.name().to_string();

        if name == "img" {
            let filename = field
                .content_disposition()
                .get_filename()
                .unwrap_or("image")
                .to_string();
            let content_type = field
                .content_type()
                .map(|mime| mime.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let mut bytes = Vec::new();
            while let Some(chunk) = field
                .try_next()
                .await
                .map_err(|err| ApiError::Validation(err.to_string()))?
            {
                if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::Validation(
                        "Image must be smaller than 5MB".to_string(),
                    ));
                }
                bytes.extend_from_slice(&chunk);
            }

            if !bytes.is_empty() {
                form.img = Some(UploadedFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            continue;
        }

        let mut value = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|err| ApiError::Validation(err.to_string()))?
        {
            value.extend_from_slice(&chunk);
        }
        let text = String::from_utf8(value)
            .map_err(|_| ApiError::Validation(format!("Field {} is not valid UTF-8", name)))?;

        match name.as_str() {
            "title" => form.title = Some(text),
            "newPrice" => form.new_price = Some(text),
            "oldPrice" => form.old_price = Some(text),
            "discount" => form.discount = Some(text),
            "brand" => form.brand = Some(text),
            "category" => form.category = Some(text),
            "description" => form.description = Some(text),
            "netWeight" => form.net_weight = Some(text),
            "productFeatures" => form.product_features = Some(text),
            "directionToUse" => form.direction_to_use = Some(text),
            _ => {}
        }
    }

    Ok(form)
}

pub async fn create_product(
    products: web::Data<Collection<Product>>,
    store: web::Data<BlobStore>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_form(payload).await?;

    let title = form
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("title is required".to_string()))?;
    let new_price = form
        .new_price
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("newPrice is required".to_string()))?;

    // Upload first; only the object key goes into the database.
    let img = match form.img {
        Some(file) => Some(
            store
                .upload(&file.filename, &file.content_type, file.bytes)
                .await?,
        ),
        None => None,
    };

    let product = Product {
        id: Uuid::new_v4().to_string(),
        title,
        new_price,
        old_price: form.old_price,
        discount: form.discount,
        brand: form.brand,
        category: form.category,
        img,
        description: form.description,
        net_weight: form.net_weight,
        product_features: form.product_features,
        direction_to_use: form.direction_to_use,
    };

    products.insert_one(&product, None).await?;

    let resolved = views::product_view(&store, product).await;
    Ok(HttpResponse::Created().json(resolved))
}

pub async fn delete_product(
    products: web::Data<Collection<Product>>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    // Lenient like the original: deleting an unknown id still reports success.
    products.delete_one(doc! { "id": &id.into_inner() }, None).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Product Deleted Successfully" })))
}
