use diesel::prelude::*;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::APIError;

pub const COOKIE_SESSION_TOKEN: &str = "session_token";

/// Claims the hosted auth provider signs into its access tokens. The backend
/// shares the provider's signing secret and never mints end-user tokens itself.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
}

fn request_token<'r>(req: &'r Request<'_>) -> Option<&'r str> {
    if let Some(header) = req.headers().get_one("Authorization") {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token);
        }
    }
    req.cookies().get(COOKIE_SESSION_TOKEN).map(|c| c.value())
}

pub fn decode_claims(token: &str) -> Option<Claims> {
    let jwt_secret = std::env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set");

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|decoded| decoded.claims)
    .ok()
}

/// Any signed-in user. Handlers turn a missing guard into a 401.
pub struct AuthedUser {
    pub id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthedUser {
    type Error = APIError;
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = match request_token(req) {
            Some(token) => token,
            None => return Outcome::Forward(Status::Unauthorized),
        };

        match decode_claims(token) {
            Some(claims) => Outcome::Success(AuthedUser { id: claims.sub }),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

/// A signed-in user with an `admin` row in user_roles. Membership is checked
/// against the database on every request.
pub struct AdminUser {
    pub id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = APIError;
    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        use crate::schema::user_roles::dsl::{role, user_id, user_roles};

        let token = match request_token(req) {
            Some(token) => token,
            None => return Outcome::Forward(Status::Unauthorized),
        };

        let claims = match decode_claims(token) {
            Some(claims) => claims,
            None => return Outcome::Forward(Status::Unauthorized),
        };

        let db_connection = match req.rocket().state::<Mutex<PgConnection>>() {
            Some(db_connection) => db_connection,
            None => return Outcome::Error((Status::InternalServerError, APIError::default())),
        };

        let admin_rows: Result<i64, _> = user_roles
            .filter(user_id.eq(&claims.sub))
            .filter(role.eq("admin"))
            .count()
            .get_result(&*db_connection.lock().unwrap());

        match admin_rows {
            Ok(count) if count > 0 => Outcome::Success(AdminUser { id: claims.sub }),
            Ok(_) => Outcome::Forward(Status::Unauthorized),
            Err(_) => Outcome::Error((Status::InternalServerError, APIError::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const TEST_SECRET: &str = "test-secret";

    fn create_token(user_id: &str, exp: i64) -> String {
        std::env::set_var("AUTH_JWT_SECRET", TEST_SECRET);
        let claims = Claims {
            sub: user_id.into(),
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn decodes_a_valid_provider_token() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = create_token("user-abc", exp);
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "user-abc");
    }

    #[test]
    fn rejects_an_expired_token() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = create_token("user-abc", exp);
        assert!(decode_claims(&token).is_none());
    }

    #[test]
    fn rejects_garbage() {
        std::env::set_var("AUTH_JWT_SECRET", TEST_SECRET);
        assert!(decode_claims("not-a-jwt").is_none());
    }
}
