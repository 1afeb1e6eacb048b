use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

use crate::config::Config;
use crate::models::{Cart, Dealer, Rating, User};

pub async fn connect(config: &Config) -> Database {
    let client_options = ClientOptions::parse(&config.database_url)
        .await
        .expect("Failed to parse MongoDB connection string");

    let client = Client::with_options(client_options).expect("Failed to initialize MongoDB client");

    client.database(&config.database_name)
}

// The schema-level uniqueness the data model relies on: one account per
// email, one cart per user, one rating per (product, user) pair. The rating
// index also backstops the check-then-insert race in the rate handler.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    fn unique(keys: mongodb::bson::Document) -> IndexModel {
        IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build()
    }

    db.collection::<User>("users")
        .create_index(unique(doc! { "email": 1 }), None)
        .await?;
    db.collection::<Dealer>("dealers")
        .create_index(unique(doc! { "email": 1 }), None)
        .await?;
    db.collection::<Cart>("carts")
        .create_index(unique(doc! { "user": 1 }), None)
        .await?;
    db.collection::<Rating>("ratings")
        .create_index(unique(doc! { "product": 1, "user": 1 }), None)
        .await?;

    Ok(())
}

pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}
