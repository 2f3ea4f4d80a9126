use aeropark_api::middleware::auth::{CustomerClaims, SupplierClaims};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

const SECRET: &[u8] = b"test-secret";

fn expiry_in(seconds: i64) -> usize {
    (Utc::now() + Duration::seconds(seconds)).timestamp() as usize
}

#[test]
fn test_customer_token_round_trip() {
    let claims = CustomerClaims {
        sub: format!("guest-{}", Uuid::new_v4()),
        email: None,
        role: "GUEST".to_string(),
        exp: expiry_in(3600),
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

    let decoded = decode::<CustomerClaims>(
        &token,
        &DecodingKey::from_secret(SECRET),
        &Validation::default(),
    )
    .unwrap();

    assert_eq!(decoded.claims.sub, claims.sub);
    assert_eq!(decoded.claims.role, "GUEST");
}

#[test]
fn test_expired_token_rejected() {
    let claims = CustomerClaims {
        sub: "guest-1".to_string(),
        email: None,
        role: "GUEST".to_string(),
        exp: expiry_in(-3600),
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

    let result = decode::<CustomerClaims>(
        &token,
        &DecodingKey::from_secret(SECRET),
        &Validation::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_wrong_secret_rejected() {
    let claims = CustomerClaims {
        sub: "guest-1".to_string(),
        email: None,
        role: "GUEST".to_string(),
        exp: expiry_in(3600),
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

    let result = decode::<CustomerClaims>(
        &token,
        &DecodingKey::from_secret(b"other-secret"),
        &Validation::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_supplier_claims_carry_supplier_id() {
    let supplier_id = Uuid::new_v4();
    let claims = SupplierClaims {
        sub: "supplier-user-1".to_string(),
        email: Some("ops@skypark.example".to_string()),
        role: "SUPPLIER".to_string(),
        supplier_id,
        exp: expiry_in(3600),
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();

    let decoded = decode::<SupplierClaims>(
        &token,
        &DecodingKey::from_secret(SECRET),
        &Validation::default(),
    )
    .unwrap();

    assert_eq!(decoded.claims.supplier_id, supplier_id);
    assert_eq!(decoded.claims.role, "SUPPLIER");
}
