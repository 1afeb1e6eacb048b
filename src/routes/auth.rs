use actix_web::{web, HttpResponse};
use argon2::Config as ArgonConfig;
use mongodb::bson::doc;
use mongodb::Collection;
use rand::Rng;
use serde_json::json;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{
    Dealer, DealerLoginInput, DealerRegisterInput, LoginInput, RegisterInput, Role, User,
};
use crate::token::TokenService;

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt: [u8; 16] = rand::thread_rng().gen();
    argon2::hash_encoded(password.as_bytes(), &salt, &ArgonConfig::default()).map_err(|err| {
        log::error!("Password hashing failed: {}", err);
        ApiError::Internal("Internal Server Error".to_string())
    })
}

fn verify_password(hash: &str, password: &str) -> bool {
    argon2::verify_encoded(hash, password.as_bytes()).unwrap_or(false)
}

// Role gate for login. An admin mismatch is told apart loudly (403); a user
// mismatch answers exactly like a missing account so the response does not
// reveal that the email belongs to a privileged role.
fn check_role_policy(requested: Option<Role>, stored: Role) -> Result<(), ApiError> {
    match requested {
        Some(Role::Admin) if stored != Role::Admin => {
            Err(ApiError::Forbidden("Invalid admin credentials".to_string()))
        }
        Some(Role::User) if stored != Role::User => {
            Err(ApiError::NotFound("User not found".to_string()))
        }
        _ => Ok(()),
    }
}

pub async fn register(
    users: web::Data<Collection<User>>,
    input: web::Json<RegisterInput>,
) -> Result<HttpResponse, ApiError> {
    let existing = users.find_one(doc! { "email": &input.email }, None).await?;
    if existing.is_some() {
        return Err(ApiError::DuplicateEmail(
            "User with this email already exists".to_string(),
        ));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        name: input.name.clone(),
        email: input.email.clone(),
        password: hash_password(&input.password)?,
        role: input.role.unwrap_or(Role::User),
    };

    users.insert_one(&user, None).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User created successfully",
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        }
    })))
}

pub async fn login(
    users: web::Data<Collection<User>>,
    tokens: web::Data<TokenService>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, ApiError> {
    let user = users
        .find_one(doc! { "email": &input.email }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    check_role_policy(input.role, user.role)?;

    if !verify_password(&user.password, &input.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = tokens.issue(&user.id, &user.email, user.role).map_err(|err| {
        log::error!("Failed to issue token: {}", err);
        ApiError::Internal("Internal Server Error".to_string())
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Login successful",
        "token": token,
        "role": user.role,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "role": user.role,
        }
    })))
}

struct DealerFields<'a> {
    name: &'a str,
    mobile: &'a str,
    email: &'a str,
    store_name: &'a str,
    gstn: &'a str,
    location: &'a str,
    password: &'a str,
}

fn validate_dealer_input(input: &DealerRegisterInput) -> Result<DealerFields<'_>, ApiError> {
    fn required(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.is_empty())
    }

    let fields = match (
        required(&input.name),
        required(&input.mobile),
        required(&input.email),
        required(&input.store_name),
        required(&input.gstn),
        required(&input.location),
        required(&input.password),
    ) {
        (
            Some(name),
            Some(mobile),
            Some(email),
            Some(store_name),
            Some(gstn),
            Some(location),
            Some(password),
        ) => DealerFields {
            name,
            mobile,
            email,
            store_name,
            gstn,
            location,
            password,
        },
        _ => {
            return Err(ApiError::Validation(
                "All fields are required".to_string(),
            ))
        }
    };

    if fields.mobile.chars().count() != 10 {
        return Err(ApiError::Validation(
            "Mobile number must be 10 digits".to_string(),
        ));
    }

    let gstn_len = fields.gstn.chars().count();
    if !(15..=17).contains(&gstn_len) {
        return Err(ApiError::Validation(
            "GSTN must be between 15 and 17 characters".to_string(),
        ));
    }

    Ok(fields)
}

pub async fn dealer_register(
    dealers: web::Data<Collection<Dealer>>,
    input: web::Json<DealerRegisterInput>,
) -> Result<HttpResponse, ApiError> {
    let fields = validate_dealer_input(&input)?;

    let existing = dealers
        .find_one(doc! { "email": fields.email }, None)
        .await?;
    if existing.is_some() {
        return Err(ApiError::DuplicateEmail(
            "Dealer with this email already exists".to_string(),
        ));
    }

    let dealer = Dealer {
        id: Uuid::new_v4().to_string(),
        name: fields.name.to_string(),
        mobile: fields.mobile.to_string(),
        email: fields.email.to_string(),
        store_name: fields.store_name.to_string(),
        gstn: fields.gstn.to_string(),
        location: fields.location.to_string(),
        password: hash_password(fields.password)?,
        role: Role::Dealer,
        created_at: chrono::Utc::now(),
    };

    dealers.insert_one(&dealer, None).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Dealer registered successfully",
        "dealer": {
            "id": dealer.id,
            "name": dealer.name,
            "email": dealer.email,
            "storeName": dealer.store_name,
            "role": dealer.role,
        }
    })))
}

pub async fn dealer_login(
    dealers: web::Data<Collection<Dealer>>,
    tokens: web::Data<TokenService>,
    input: web::Json<DealerLoginInput>,
) -> Result<HttpResponse, ApiError> {
    let dealer = dealers
        .find_one(doc! { "email": &input.email }, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("Dealer not found".to_string()))?;

    if !verify_password(&dealer.password, &input.password) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = tokens
        .issue(&dealer.id, &dealer.email, dealer.role)
        .map_err(|err| {
            log::error!("Failed to issue token: {}", err);
            ApiError::Internal("Internal Server Error".to_string())
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Dealer Login successful",
        "token": token,
        "role": dealer.role,
        "dealer": {
            "id": dealer.id,
            "name": dealer.name,
            "email": dealer.email,
            "storeName": dealer.store_name,
            "role": dealer.role,
        }
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password(&hash, "hunter2"));
        assert!(!verify_password(&hash, "hunter3"));
    }

    #[test]
    fn admin_login_against_non_admin_account_is_forbidden() {
        let err = check_role_policy(Some(Role::Admin), Role::User).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn user_login_against_admin_account_looks_like_a_missing_account() {
        // deliberately NotFound, not Forbidden: must not leak the account's role
        let err = check_role_policy(Some(Role::User), Role::Admin).unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn matching_or_absent_role_requests_pass() {
        assert!(check_role_policy(Some(Role::Admin), Role::Admin).is_ok());
        assert!(check_role_policy(Some(Role::User), Role::User).is_ok());
        assert!(check_role_policy(None, Role::Admin).is_ok());
        assert!(check_role_policy(Some(Role::Dealer), Role::Dealer).is_ok());
    }

    fn dealer_input() -> DealerRegisterInput {
        DealerRegisterInput {
            name: Some("Asha".into()),
            mobile: Some("9876543210".into()),
            email: Some("asha@store.com".into()),
            store_name: Some("Asha Stores".into()),
            gstn: Some("22AAAAA0000A1Z5".into()),
            location: Some("Kochi".into()),
            password: Some("secret".into()),
        }
    }

    #[test]
    fn complete_dealer_input_passes() {
        assert!(validate_dealer_input(&dealer_input()).is_ok());
    }

    #[test]
    fn missing_or_empty_dealer_fields_are_rejected() {
        let mut input = dealer_input();
        input.location = None;
        assert!(matches!(
            validate_dealer_input(&input),
            Err(ApiError::Validation(msg)) if msg == "All fields are required"
        ));

        let mut input = dealer_input();
        input.store_name = Some(String::new());
        assert!(validate_dealer_input(&input).is_err());
    }

    #[test]
    fn mobile_must_be_exactly_ten_characters() {
        let mut input = dealer_input();
        input.mobile = Some("123456789".into());
        assert!(validate_dealer_input(&input).is_err());

        input.mobile = Some("12345678901".into());
        assert!(validate_dealer_input(&input).is_err());
    }

    #[test]
    fn gstn_length_bounds_are_inclusive() {
        let mut input = dealer_input();

        input.gstn = Some("A".repeat(15));
        assert!(validate_dealer_input(&input).is_ok());

        input.gstn = Some("A".repeat(17));
        assert!(validate_dealer_input(&input).is_ok());

        input.gstn = Some("A".repeat(14));
        assert!(validate_dealer_input(&input).is_err());

        input.gstn = Some("A".repeat(18));
        assert!(validate_dealer_input(&input).is_err());
    }
}
