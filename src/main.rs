use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;

mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod storage;
mod token;
mod views;

use models::{Cart, Dealer, Order, Product, Rating, User};

async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "e-shop API" }))
}

async fn about() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "e-shop: catalog, cart, orders and ratings" }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok(); // Load environment variables from .env file
    env_logger::init();

    // All required configuration is validated here; a missing secret or
    // bucket name aborts startup instead of failing mid-request.
    let config = config::Config::from_env();

    let db = db::connect(&config).await;
    db::ensure_indexes(&db)
        .await
        .expect("Failed to create database indexes");

    let store = storage::BlobStore::new(config.bucket_name.clone()).await;
    let tokens = token::TokenService::new(&config.jwt_secret);

    let users = db.collection::<User>("users");
    let dealers = db.collection::<Dealer>("dealers");
    let products = db.collection::<Product>("products");
    let carts = db.collection::<Cart>("carts");
    let orders = db.collection::<Order>("orders");
    let ratings = db.collection::<Rating>("ratings");

    log::info!("Server is running on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .app_data(web::Data::new(users.clone()))
            .app_data(web::Data::new(dealers.clone()))
            .app_data(web::Data::new(products.clone()))
            .app_data(web::Data::new(carts.clone()))
            .app_data(web::Data::new(orders.clone()))
            .app_data(web::Data::new(ratings.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(tokens.clone()))
            // Public routes
            .route("/", web::get().to(index))
            .route("/about", web::get().to(about))
            .service(
                web::scope("/api/auth")
                    .route("/register", web::post().to(routes::auth::register))
                    .route("/login", web::post().to(routes::auth::login))
                    .route("/dealer/register", web::post().to(routes::auth::dealer_register))
                    .route("/dealer/login", web::post().to(routes::auth::dealer_login)),
            )
            .route("/products", web::get().to(routes::products::list_products))
            .route("/products", web::post().to(routes::products::create_product))
            .route("/products/{id}", web::get().to(routes::products::get_product))
            .route("/products/{id}", web::delete().to(routes::products::delete_product))
            .route(
                "/products/{productId}/ratings",
                web::get().to(routes::ratings::get_ratings),
            )
            // Owner-scoped routes behind the auth gate
            .service(
                web::scope("")
                    .wrap(middleware::AuthMiddleware::new(tokens.clone()))
                    .route("/profile", web::get().to(routes::profile::user_profile))
                    .route("/dealer/profile", web::get().to(routes::profile::dealer_profile))
                    .route("/cart", web::get().to(routes::cart::get_cart))
                    .route("/cart", web::post().to(routes::cart::add_to_cart))
                    .route(
                        "/cart/{productId}",
                        web::delete().to(routes::cart::remove_from_cart),
                    )
                    .route(
                        "/cart/{productId}",
                        web::patch().to(routes::cart::decrement_cart_item),
                    )
                    .route("/order", web::get().to(routes::orders::list_orders))
                    .route("/order", web::post().to(routes::orders::place_order))
                    .route("/order/{orderId}", web::get().to(routes::orders::get_order))
                    .route(
                        "/order/{orderId}/increase/{productId}",
                        web::patch().to(routes::orders::increase_order_item),
                    )
                    .route(
                        "/order/{orderId}/decrease/{productId}",
                        web::patch().to(routes::orders::decrease_order_item),
                    )
                    .route(
                        "/order/{orderId}/place",
                        web::patch().to(routes::orders::mark_order_placed),
                    )
                    .route(
                        "/products/{productId}/rate",
                        web::post().to(routes::ratings::rate_product),
                    ),
            )
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
