use super::*;
use axum::http::{Request, StatusCode};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::env;

const SECRET: &str = "supersecretjwtsecretforunittesting123";
const USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

fn claims(role: Option<&str>, exp: usize) -> SupabaseClaims {
    SupabaseClaims {
        sub: USER_ID.to_string(),
        role: "authenticated".to_string(),
        aud: "authenticated".to_string(),
        email: Some("test@example.com".to_string()),
        exp,
        user_metadata: UserMetadata {
            role: role.map(str::to_string),
        },
    }
}

fn token_for(claims: &SupabaseClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_decode_supabase_jwt_success() {
    let my_claims = claims(Some("company"), 9999999999);
    let token = token_for(&my_claims, SECRET);

    let decoded = decode_supabase_jwt(&token, SECRET).expect("Valid token should pass");
    assert_eq!(decoded.sub, my_claims.sub);
    assert_eq!(decoded.email, my_claims.email);
    assert_eq!(decoded.user_metadata.role.as_deref(), Some("company"));
}

#[test]
fn test_decode_supabase_jwt_expired() {
    let token = token_for(&claims(Some("company"), 1), SECRET);

    assert!(decode_supabase_jwt(&token, SECRET).is_err());
}

#[test]
fn test_decode_supabase_jwt_invalid_signature() {
    let token = token_for(&claims(Some("company"), 9999999999), "wrongsecret");

    assert!(decode_supabase_jwt(&token, SECRET).is_err());
}

#[test]
fn test_decode_supabase_jwt_wrong_audience() {
    let mut my_claims = claims(Some("company"), 9999999999);
    my_claims.aud = "anon".to_string();
    let token = token_for(&my_claims, SECRET);

    assert!(decode_supabase_jwt(&token, SECRET).is_err());
}

#[test]
fn marketplace_role_comes_from_user_metadata() {
    let user = AuthUser::try_from(claims(Some(" Artist "), 9999999999)).unwrap();

    assert_eq!(user.role, Some(UserRole::Artist));
    assert!(user.has_role(&[UserRole::Artist, UserRole::Admin]));
    assert!(user.require_role(&[UserRole::Company]).is_err());
    assert_eq!(
        user.require_role(&[UserRole::Company, UserRole::Artist]).unwrap(),
        UserRole::Artist
    );
}

#[test]
fn missing_role_is_forbidden_everywhere() {
    let user = AuthUser::try_from(claims(None, 9999999999)).unwrap();

    let err = user
        .require_role(&[UserRole::Artist, UserRole::Company, UserRole::Admin])
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
}

#[test]
fn non_uuid_subject_is_unauthenticated() {
    let mut my_claims = claims(Some("admin"), 9999999999);
    my_claims.sub = "service".to_string();

    let err = AuthUser::try_from(my_claims).unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn extractor_reads_bearer_token() {
    unsafe {
        env::set_var("SUPABASE_JWT_SECRET", SECRET);
    }
    let token = token_for(&claims(Some("admin"), 9999999999), SECRET);
    let (mut parts, _) = Request::builder()
        .header("Authorization", format!("Bearer {token}"))
        .body(())
        .unwrap()
        .into_parts();

    let user = AuthUser::from_request_parts(&mut parts, &()).await.unwrap();
    assert_eq!(user.user_id.to_string(), USER_ID);
    assert_eq!(user.role, Some(UserRole::Admin));
}

#[tokio::test]
async fn extractor_rejects_missing_header() {
    let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();

    let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn extractor_rejects_non_bearer_scheme() {
    let (mut parts, _) = Request::builder()
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(())
        .unwrap()
        .into_parts();

    let err = AuthUser::from_request_parts(&mut parts, &()).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
}
