use axum::http::StatusCode;
use axum::response::IntoResponse;
use jsonwebtoken::{encode, EncodingKey, Header};
use locumdesk_api::middleware::auth::{bearer_token, decode_claims};
use locumdesk_api::middleware::error_handling::AppError;
use locumdesk_api::tax::{accepted, candidate_urls};
use locumdesk_core::errors::LocumError;
use locumdesk_core::models::auth::{Claims, Role};
use rstest::rstest;

use crate::test_utils::{clinic_admin, staff_user, TEST_JWT_SECRET};

#[rstest]
#[case(LocumError::NotFound("x".to_string()), StatusCode::NOT_FOUND)]
#[case(LocumError::Validation("x".to_string()), StatusCode::BAD_REQUEST)]
#[case(LocumError::Authentication("x".to_string()), StatusCode::UNAUTHORIZED)]
#[case(LocumError::Authorization("x".to_string()), StatusCode::FORBIDDEN)]
#[case(LocumError::Conflict("x".to_string()), StatusCode::CONFLICT)]
#[case(LocumError::Upstream("x".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] err: LocumError, #[case] expected: StatusCode) {
    let response = AppError(err).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_database_error_is_500() {
    let response = AppError(LocumError::Database(eyre::eyre!("boom"))).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[rstest]
#[case("Bearer abc.def.ghi", Some("abc.def.ghi"))]
#[case("bearer abc.def.ghi", Some("abc.def.ghi"))]
#[case("BEARER abc.def.ghi", Some("abc.def.ghi"))]
#[case("Bearer \"abc.def.ghi\"", Some("abc.def.ghi"))]
#[case("abc.def.ghi", Some("abc.def.ghi"))]
#[case("  Bearer   abc.def.ghi  ", Some("abc.def.ghi"))]
#[case("Bearer ", None)]
#[case("", None)]
fn test_bearer_token_parsing(#[case] header: &str, #[case] expected: Option<&str>) {
    assert_eq!(bearer_token(header), expected);
}

fn make_token(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("token encodes")
}

fn valid_claims(role: &str) -> Claims {
    Claims {
        user_id: "user-1".to_string(),
        clinic_id: "clinic-1".to_string(),
        role: role.to_string(),
        staff_id: "staff-1".to_string(),
        full_name: "A. Assistant".to_string(),
        phone: "0812345678".to_string(),
        email: "a@example.com".to_string(),
        exp: 4_000_000_000,
    }
}

#[test]
fn test_decode_claims_round_trip() {
    let token = make_token(&valid_claims("employee"), TEST_JWT_SECRET);

    let user = decode_claims(&token, TEST_JWT_SECRET).expect("valid token decodes");
    assert_eq!(user.role, Role::Staff);
    assert_eq!(user.staff_id, "staff-1");
    assert_eq!(user.clinic_id, "clinic-1");
}

#[test]
fn test_decode_claims_rejects_wrong_secret() {
    let token = make_token(&valid_claims("admin"), "some-other-secret");

    let err = decode_claims(&token, TEST_JWT_SECRET).expect_err("wrong secret must fail");
    assert!(matches!(err, LocumError::Authentication(_)));
}

#[test]
fn test_decode_claims_rejects_expired_token() {
    let mut claims = valid_claims("admin");
    claims.exp = 1_000; // long past

    let token = make_token(&claims, TEST_JWT_SECRET);
    let err = decode_claims(&token, TEST_JWT_SECRET).expect_err("expired token must fail");
    assert!(matches!(err, LocumError::Authentication(_)));
}

#[test]
fn test_decode_claims_rejects_unknown_role() {
    let token = make_token(&valid_claims("superuser"), TEST_JWT_SECRET);

    let err = decode_claims(&token, TEST_JWT_SECRET).expect_err("unknown role must fail");
    assert!(matches!(err, LocumError::Authorization(_)));
}

#[test]
fn test_role_guards() {
    let staff = staff_user("staff-1");
    assert_eq!(staff.require_staff().unwrap(), "staff-1");
    assert!(staff.require_admin().is_err());
    assert!(staff.require_admin_or_system().is_err());

    let admin = clinic_admin("clinic-1");
    assert_eq!(admin.require_clinic_admin().unwrap(), "clinic-1");
    assert!(admin.require_admin_or_system().is_ok());
    assert!(admin.require_staff().is_err());
}

#[test]
fn test_tax_candidate_urls() {
    let urls = candidate_urls("http://tax.local/", 2026);

    assert_eq!(
        urls,
        vec![
            "http://tax.local/internal/payroll/calc-tax-ytd?year=2026",
            "http://tax.local/api/internal/payroll/calc-tax-ytd?year=2026",
            "http://tax.local/users/internal/payroll/calc-tax-ytd?year=2026",
            "http://tax.local/api/users/internal/payroll/calc-tax-ytd?year=2026",
        ]
    );
}

#[rstest]
#[case(reqwest::StatusCode::OK, true)]
#[case(reqwest::StatusCode::CREATED, false)]
#[case(reqwest::StatusCode::NO_CONTENT, false)]
#[case(reqwest::StatusCode::NOT_FOUND, false)]
#[case(reqwest::StatusCode::BAD_GATEWAY, false)]
fn test_tax_answer_must_be_exactly_200(
    #[case] status: reqwest::StatusCode,
    #[case] expected: bool,
) {
    assert_eq!(accepted(status), expected);
}
