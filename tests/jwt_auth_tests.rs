// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests verify that tokens issued at login can be decoded by the auth
//! middleware, catching compatibility issues early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use safehaven::error::AppError;
use safehaven::middleware::auth::{create_jwt, create_jwt_with_ttl, verify_jwt, TOKEN_TTL};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Claims structure that clients and the middleware agree on.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

const SIGNING_KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

#[test]
fn test_jwt_roundtrip() {
    let user_id = "0b6c3a51-8a3c-4a57-9d0c-3f0c5d2e9e11";

    let token = create_jwt(user_id, SIGNING_KEY).unwrap();

    // Decode independently of the middleware
    let key = DecodingKey::from_secret(SIGNING_KEY);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, user_id);
    assert!(token_data.claims.exp > token_data.claims.iat);

    assert_eq!(verify_jwt(&token, SIGNING_KEY).unwrap(), user_id);
}

#[test]
fn test_jwt_expiration_is_seven_days() {
    let token = create_jwt("user-1", SIGNING_KEY).unwrap();

    let key = DecodingKey::from_secret(SIGNING_KEY);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false; // We'll check manually

    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    assert_eq!(
        token_data.claims.exp - token_data.claims.iat,
        TOKEN_TTL.as_secs() as usize
    );

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    assert!(token_data.claims.exp > now + 6 * 86400);
}

#[test]
fn test_tampered_token_rejected() {
    let token = create_jwt("user-1", SIGNING_KEY).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let other = create_jwt("user-2", SIGNING_KEY).unwrap();
    parts[1] = other.split('.').nth(1).unwrap().to_string();
    let forged = parts.join(".");

    assert!(matches!(
        verify_jwt(&forged, SIGNING_KEY),
        Err(AppError::InvalidToken)
    ));
}

#[test]
fn test_expired_token_rejected() {
    // A zero lifetime expires at issue time; the validator has no leeway.
    let token = create_jwt_with_ttl("user-1", SIGNING_KEY, Duration::ZERO).unwrap();
    std::thread::sleep(Duration::from_millis(1100));

    assert!(matches!(
        verify_jwt(&token, SIGNING_KEY),
        Err(AppError::InvalidToken)
    ));
}

#[test]
fn test_empty_subject_rejected() {
    let token = create_jwt("", SIGNING_KEY).unwrap();

    assert!(matches!(
        verify_jwt(&token, SIGNING_KEY),
        Err(AppError::InvalidToken)
    ));
}
