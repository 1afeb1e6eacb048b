use std::env;

// Startup configuration. Every required value is checked here once, so a
// misconfigured deployment dies before the server starts accepting traffic.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_name: String,
    pub jwt_secret: String,
    pub bucket_name: String,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let database_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "ecommerce".to_string());
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let bucket_name = env::var("S3_BUCKET_NAME").expect("S3_BUCKET_NAME is not set");

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        let bind_addr = format!("{}:{}", host, port);

        Config {
            database_url,
            database_name,
            jwt_secret,
            bucket_name,
            bind_addr,
        }
    }
}
