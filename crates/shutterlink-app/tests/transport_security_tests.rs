//! Integration tests for transport security URL checks.

use shutterlink_upload::validate_upload_endpoint;

#[test]
fn transport_security_tests_rejects_non_https_endpoints() {
    assert!(validate_upload_endpoint("https://api.cloudinary.com/v1_1/demo/image/upload").is_ok());
    assert!(validate_upload_endpoint("http://api.cloudinary.com/v1_1/demo/image/upload").is_err());
    assert!(validate_upload_endpoint("not a url").is_err());
}
