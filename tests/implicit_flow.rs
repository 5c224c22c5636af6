//! Implicit grant: the token comes back in the redirect fragment.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use serde_json::json;

use uclif_auth::{
    AuthError, Authority, ImplicitCallback, PublicClient, Scope, TokenVerifier, create_uri,
};

const SIGNING_KEY: &str = include_str!("fixtures/signing_key.pem");
const VERIFYING_KEY: &str = include_str!("fixtures/verifying_key.pem");

const ISSUER: &str = "auth.test";
const CLIENT_ID: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
const REDIRECT_URI: &str = "https://app.example/callback";

fn client() -> PublicClient {
    let verifier = TokenVerifier::from_ec_pem(VERIFYING_KEY, ISSUER).expect("test key loads");
    let authority = Authority::new(
        "https://auth.test/oauth2/authorize",
        "https://auth.test/oauth2/token",
        verifier,
    );
    PublicClient::new(CLIENT_ID, REDIRECT_URI)
        .expect("valid credentials")
        .with_authority(authority)
}

fn access_token() -> String {
    let now = get_current_timestamp();
    let claims = json!({
        "iss": ISSUER,
        "aud": format!("{CLIENT_ID}@{ISSUER}"),
        "iat": now,
        "nbf": now,
        "exp": now + 600,
        "username": "jdoe",
    });
    let key = EncodingKey::from_ec_pem(SIGNING_KEY.as_bytes()).expect("signing key loads");
    encode(&Header::new(Algorithm::ES256), &claims, &key).expect("token encodes")
}

/// What the authorization server would redirect the browser to.
fn redirect_with(token: &str, state: &str) -> String {
    create_uri(
        REDIRECT_URI,
        &[],
        &[
            ("access_token", token),
            ("token_type", "Bearer"),
            ("expires_in", "600"),
            ("state", state),
        ],
        true,
    )
    .expect("redirect builds")
}

#[test]
fn completes_round_trip_through_fragment() {
    let client = client();
    let request = client
        .build_authorization_url(&[Scope::Username])
        .expect("request builds");

    let token = access_token();
    let callback = ImplicitCallback::from_url(&redirect_with(&token, &request.state))
        .expect("fragment parses");
    assert_eq!(callback.expires_in, Some(600));

    let claims = client
        .verify_callback(&callback.access_token, &callback.state, &request.state)
        .expect("callback verifies");
    assert_eq!(claims.get("username"), Some(&json!("jdoe")));
    assert_eq!(claims.token_id(), None);
}

#[test]
fn replayed_callback_from_another_request_is_rejected() {
    let client = client();
    let victim = client
        .build_authorization_url(&[Scope::Username])
        .expect("request builds");
    let attacker = client
        .build_authorization_url(&[Scope::Username])
        .expect("request builds");

    let callback = ImplicitCallback::from_url(&redirect_with(&access_token(), &attacker.state))
        .expect("fragment parses");

    let result = client.verify_callback(&callback.access_token, &callback.state, &victim.state);
    assert!(matches!(result, Err(AuthError::StateMismatch)));

    // verify_token alone does not look at state.
    assert!(client.verify_token(&callback.access_token).is_ok());
}
