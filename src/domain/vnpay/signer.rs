//! VNPay request signing and callback verification.
//!
//! The gateway scheme is HMAC-SHA512 over the canonical query string,
//! rendered as uppercase hex. The signature and its type tag ride along as
//! two extra query parameters that are themselves never part of the signed
//! payload.

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::ParamSet;

/// Query parameter carrying the signature.
pub const SECURE_HASH_PARAM: &str = "vnp_SecureHash";

/// Query parameter carrying the signature algorithm tag.
pub const SECURE_HASH_TYPE_PARAM: &str = "vnp_SecureHashType";

/// The only algorithm tag this integration emits.
pub const SECURE_HASH_TYPE: &str = "HmacSHA512";

/// Prefix of every gateway-owned parameter.
pub const PARAM_PREFIX: &str = "vnp_";

/// Signs outbound payment requests and verifies inbound callbacks.
///
/// The shared secret is injected at construction; the signer holds no other
/// state and is cheap to clone.
#[derive(Clone)]
pub struct VnpaySigner {
    secret: String,
}

impl VnpaySigner {
    /// Creates a signer keyed with the merchant's shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Builds the signed redirect URL for an outbound payment request.
    ///
    /// The canonical query is signed, then the hash-type tag and the
    /// signature are appended last, unsigned.
    pub fn payment_url(&self, base_url: &str, params: &ParamSet) -> String {
        let query = params.canonical_query();
        let secure_hash = self.sign(&query);
        format!(
            "{base_url}?{query}&{SECURE_HASH_TYPE_PARAM}={SECURE_HASH_TYPE}&{SECURE_HASH_PARAM}={secure_hash}"
        )
    }

    /// Verifies an inbound callback parameter mapping.
    ///
    /// Extracts the signature and its type tag, re-signs the remaining
    /// gateway-prefixed parameters, and compares case-insensitively in
    /// constant time. A missing or malformed signature is simply invalid;
    /// this never fails with an error.
    pub fn verify(&self, params: &ParamSet) -> bool {
        let mut payload = params.clone();
        let provided = match payload.remove(SECURE_HASH_PARAM) {
            Some(hash) => hash,
            None => return false,
        };
        payload.remove(SECURE_HASH_TYPE_PARAM);
        payload.retain_prefixed(PARAM_PREFIX);

        let expected = self.sign(&payload.canonical_query());
        constant_time_eq_ignore_case(&provided, &expected)
    }

    /// HMAC-SHA512 over the canonical query, as uppercase hex.
    fn sign(&self, canonical_query: &str) -> String {
        let mut mac = Hmac::<Sha512>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(canonical_query.as_bytes());
        hex::encode_upper(mac.finalize().into_bytes())
    }
}

/// Constant-time, case-insensitive comparison of two hex strings.
fn constant_time_eq_ignore_case(provided: &str, expected: &str) -> bool {
    let provided = provided.to_ascii_uppercase();
    if provided.len() != expected.len() {
        return false;
    }
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "KMJYDQ929Y6E0EV5QFCCKAI35T7NI2NK";

    fn signed_callback(pairs: &[(&str, &str)]) -> ParamSet {
        // Signs pairs the way the gateway does, then attaches the hash
        // fields to simulate an inbound callback.
        let payload = ParamSet::from_pairs(pairs.iter().copied());
        let hash = {
            let mut mac = Hmac::<Sha512>::new_from_slice(TEST_SECRET.as_bytes()).unwrap();
            mac.update(payload.canonical_query().as_bytes());
            hex::encode_upper(mac.finalize().into_bytes())
        };
        let mut callback = payload;
        callback.insert(SECURE_HASH_TYPE_PARAM, SECURE_HASH_TYPE);
        callback.insert(SECURE_HASH_PARAM, hash);
        callback
    }

    #[test]
    fn payment_url_appends_hash_fields_last_unsigned() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let mut params = ParamSet::new();
        params.insert("vnp_Amount", "50000000");
        params.insert("vnp_TxnRef", "42");

        let url = signer.payment_url("https://sandbox.vnpayment.vn/paymentv2/vpcpay.html", &params);

        assert!(url.starts_with(
            "https://sandbox.vnpayment.vn/paymentv2/vpcpay.html?vnp_Amount=50000000&vnp_TxnRef=42&vnp_SecureHashType=HmacSHA512&vnp_SecureHash="
        ));
        // SHA-512 digest: 128 uppercase hex chars.
        let hash = url.rsplit('=').next().unwrap();
        assert_eq!(hash.len(), 128);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn verify_round_trips_own_signature() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let callback = signed_callback(&[
            ("vnp_Amount", "50000000"),
            ("vnp_ResponseCode", "00"),
            ("vnp_TxnRef", "42"),
        ]);
        assert!(signer.verify(&callback));
    }

    #[test]
    fn verify_is_case_insensitive_on_provided_hash() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let mut callback = signed_callback(&[("vnp_TxnRef", "42")]);
        let lower = callback.remove(SECURE_HASH_PARAM).unwrap().to_lowercase();
        callback.insert(SECURE_HASH_PARAM, lower);

        assert!(signer.verify(&callback));
    }

    #[test]
    fn verify_rejects_tampered_value() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let mut callback = signed_callback(&[("vnp_Amount", "50000000"), ("vnp_TxnRef", "42")]);
        callback.insert("vnp_Amount", "50000001");

        assert!(!signer.verify(&callback));
    }

    #[test]
    fn verify_rejects_any_single_flipped_hash_character() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let callback = signed_callback(&[("vnp_TxnRef", "42")]);
        let good = callback.get(SECURE_HASH_PARAM).unwrap().to_string();

        for i in 0..good.len() {
            let mut bad = good.clone();
            let flipped = if bad.as_bytes()[i] == b'0' { '1' } else { '0' };
            bad.replace_range(i..i + 1, &flipped.to_string());

            let mut tampered = callback.clone();
            tampered.insert(SECURE_HASH_PARAM, bad);
            assert!(!signer.verify(&tampered), "flip at {} accepted", i);
        }
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let callback = signed_callback(&[("vnp_TxnRef", "42")]);

        let other = VnpaySigner::new("some-other-secret");
        assert!(!other.verify(&callback));
    }

    #[test]
    fn verify_missing_signature_is_false_not_error() {
        let signer = VnpaySigner::new(TEST_SECRET);
        let callback = ParamSet::from_pairs([("vnp_TxnRef", "42")]);
        assert!(!signer.verify(&callback));
    }

    #[test]
    fn verify_ignores_non_gateway_parameters() {
        // Query noise without the vnp_ prefix is not part of the signed
        // payload and must not break verification.
        let signer = VnpaySigner::new(TEST_SECRET);
        let mut callback = signed_callback(&[("vnp_TxnRef", "42")]);
        callback.insert("utm_campaign", "summer");

        assert!(signer.verify(&callback));
    }

    #[test]
    fn signature_covers_canonical_encoding() {
        // Signing the same logical payload twice yields the same digest.
        let signer = VnpaySigner::new(TEST_SECRET);
        let mut a = ParamSet::new();
        a.insert("vnp_OrderInfo", "Thanh toan goi 1 thang");
        a.insert("vnp_TxnRef", "42");

        let mut b = ParamSet::new();
        b.insert("vnp_TxnRef", "42");
        b.insert("vnp_OrderInfo", "Thanh toan goi 1 thang");

        let base = "https://gw.example/pay";
        assert_eq!(signer.payment_url(base, &a), signer.payment_url(base, &b));
    }
}
