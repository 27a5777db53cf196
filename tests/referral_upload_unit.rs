use edu_checkout::referral::{self, ReferralError};
use edu_checkout::upload::{MAX_PROOF_BYTES, UploadError, sanitize_filename, validate_proof};

#[test]
fn referral_read_from_query() {
    assert_eq!(
        referral::referral_from_query("utm_source=ig&ref=AFF123"),
        Some("AFF123".to_string())
    );
    assert_eq!(referral::referral_from_query("ref=%20%20"), None);
    assert_eq!(referral::referral_from_query("utm_source=ig"), None);
}

#[test]
fn query_wins_over_cookie() {
    assert_eq!(
        referral::resolve("ref=NEW", Some("OLD")),
        Some("NEW".to_string())
    );
    assert_eq!(referral::resolve("", Some("OLD")), Some("OLD".to_string()));
    assert_eq!(referral::resolve("", Some(" ")), None);
}

#[test]
fn link_gets_referral_appended() {
    let url = referral::with_referral("https://academy.example.com/bootcamp/data", "AFF1")
        .expect("link");
    assert_eq!(url, "https://academy.example.com/bootcamp/data?ref=AFF1");
}

#[test]
fn blank_code_leaves_link_alone() {
    let url = referral::with_referral("https://academy.example.com/webinar/9?x=1", "  ")
        .expect("link");
    assert_eq!(url, "https://academy.example.com/webinar/9?x=1");
}

#[test]
fn relative_link_is_rejected() {
    let err = referral::with_referral("/course/rust", "AFF1").unwrap_err();
    assert!(matches!(err, ReferralError::InvalidUrl { .. }));
}

#[test]
fn proof_must_be_small_image() {
    assert_eq!(validate_proof(Some("image/png"), 1024), Ok(()));
    assert_eq!(validate_proof(Some("image/jpeg; charset=binary"), MAX_PROOF_BYTES), Ok(()));
    assert_eq!(
        validate_proof(Some("image/png"), MAX_PROOF_BYTES + 1),
        Err(UploadError::TooLarge {
            size: MAX_PROOF_BYTES + 1
        })
    );
    assert_eq!(
        validate_proof(Some("application/pdf"), 10),
        Err(UploadError::UnsupportedType("application/pdf".to_string()))
    );
    assert_eq!(
        validate_proof(None, 10),
        Err(UploadError::UnsupportedType("unknown".to_string()))
    );
    assert_eq!(validate_proof(Some("image/webp"), 0), Err(UploadError::Empty));
}

#[test]
fn filenames_are_sanitized() {
    assert_eq!(sanitize_filename("../bukti transfer.png"), "..buktitransfer.png");
    assert_eq!(sanitize_filename("///"), "proof");
}
