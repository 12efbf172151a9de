use chrono::TimeDelta;
use serde_json::{json, Map};
use utilkit::config::ToolkitConfig;
use utilkit::error::ErrorKind;
use utilkit::jwt::{self, Algorithm, TokenService};

use crate::fixtures::TestFixtures;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_for_several_subjects() {
        let claims = TestFixtures::claims();
        for subject in ["ada", "user@example.com", "Zoë", "42"] {
            let token = jwt::generate_token(TestFixtures::SECRET, subject, &claims, TimeDelta::minutes(5)).unwrap();

            assert!(jwt::validate_token(TestFixtures::SECRET, &token));
            assert_eq!(jwt::extract_subject(TestFixtures::SECRET, &token).unwrap(), subject);
            assert_eq!(
                jwt::extract_claim_as::<i64>(TestFixtures::SECRET, &token, "level").unwrap(),
                Some(3)
            );
        }
    }

    #[test]
    fn test_negative_lifetime_is_expired() {
        let token = jwt::generate_token(TestFixtures::SECRET, "ada", &Map::new(), TimeDelta::seconds(-30)).unwrap();

        assert!(!jwt::validate_token(TestFixtures::SECRET, &token));
        let err = jwt::extract_claims(TestFixtures::SECRET, &token).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TokenExpired);

        let details = jwt::validate_token_with_details(TestFixtures::SECRET, &token);
        assert!(!details.is_valid());
        assert_eq!(details.message(), "Token is expired");

        assert!(jwt::get_token_remaining_time(TestFixtures::SECRET, &token).unwrap().is_zero());
        assert_eq!(jwt::decode_token_without_validation(&token).unwrap().sub.as_deref(), Some("ada"));
    }

    #[test]
    fn test_recently_expired_token_can_be_refreshed() {
        let token = jwt::generate_token(TestFixtures::SECRET, "ada", &TestFixtures::claims(), TimeDelta::seconds(-60)).unwrap();
        let fresh = jwt::refresh_token(TestFixtures::SECRET, &token, TimeDelta::minutes(10)).unwrap();

        assert!(jwt::validate_token(TestFixtures::SECRET, &fresh));
        assert_eq!(
            jwt::extract_claim(TestFixtures::SECRET, &fresh, "tenant").unwrap(),
            Some(json!("acme"))
        );
    }

    #[test]
    fn test_wrong_secret_is_invalid_signature() {
        let token = jwt::generate_access_token(TestFixtures::SECRET, "ada", &Map::new()).unwrap();
        let other = "another-secret-0123456789abcdef!";

        let details = jwt::validate_token_with_details(other, &token);
        assert_eq!(details.message(), "Invalid JWT signature");
        assert!(jwt::extract_claims_safely(other, &token).is_none());
    }

    #[test]
    fn test_service_uses_configured_lifetime() {
        let config = ToolkitConfig::load(&TestFixtures::sample_config_path()).unwrap();
        let service = TokenService::new(TestFixtures::SECRET, config.jwt).unwrap();
        let token = service.issue_access_token("ada", &TestFixtures::claims()).unwrap();

        let claims = service.claims(&token).unwrap();
        let lifetime = claims.exp.unwrap() - claims.iat.unwrap();
        assert_eq!(lifetime, 900);

        let refresh = service.issue_refresh_token("ada").unwrap();
        assert_eq!(
            service.claims(&refresh).unwrap().get("token_type"),
            Some(json!("refresh"))
        );
    }

    #[test]
    fn test_service_rejects_short_secret() {
        let err = TokenService::new("short", Default::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailure);
    }

    #[test]
    fn test_rsa_token_checked_with_public_key_only() {
        let pair = jwt::generate_rsa_key_pair().unwrap();
        let token = jwt::generate_token_with_rsa_key(
            pair.private_pem.as_bytes(),
            "ada",
            &TestFixtures::claims(),
            TimeDelta::minutes(5),
            Algorithm::RS256,
        )
        .unwrap();

        assert!(jwt::validate_token_with_rsa_key(pair.public_pem.as_bytes(), &token));
        assert!(!jwt::validate_token(TestFixtures::SECRET, &token));
    }
}
