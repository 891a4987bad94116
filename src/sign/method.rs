//! Signature methods and the [`Signer`] that applies them.

// crates.io
use base64::{Engine, prelude::BASE64_STANDARD};
use hmac::{Hmac, Mac};
use rsa::{
	RsaPrivateKey,
	pkcs1::DecodeRsaPrivateKey,
	pkcs1v15::SigningKey,
	pkcs8::DecodePrivateKey,
	signature::{SignatureEncoding, Signer as _},
};
use sha1::Sha1;
// self
use crate::{
	_prelude::*,
	sign::{SignError, SignatureInput, percent_encode},
};

/// Signature methods defined by RFC 5849 §3.4.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// HMAC-SHA1 keyed with the consumer and token secrets.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// RSA-SHA1 (PKCS#1 v1.5) using the consumer's private key.
	#[serde(rename = "RSA-SHA1")]
	RsaSha1,
	/// Sends the signing key itself; only safe over TLS.
	#[serde(rename = "PLAINTEXT")]
	Plaintext,
}
impl SignatureMethod {
	/// Returns the value sent as `oauth_signature_method`.
	pub const fn as_str(self) -> &'static str {
		match self {
			SignatureMethod::HmacSha1 => "HMAC-SHA1",
			SignatureMethod::RsaSha1 => "RSA-SHA1",
			SignatureMethod::Plaintext => "PLAINTEXT",
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for SignatureMethod {
	type Err = SignError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"HMAC-SHA1" => Ok(Self::HmacSha1),
			"RSA-SHA1" => Ok(Self::RsaSha1),
			"PLAINTEXT" => Ok(Self::Plaintext),
			_ => Err(SignError::UnsupportedSignatureMethod(s.to_owned())),
		}
	}
}

#[derive(Clone)]
enum KeyMaterial {
	Secret(String),
	Rsa(Arc<SigningKey<Sha1>>),
}

/// Computes `oauth_signature` values for a fixed consumer.
///
/// Signing is deterministic: the same [`SignatureInput`] always yields the same signature.
/// For RSA-SHA1 the consumer secret must be a PEM-encoded RSA private key (PKCS#8 or
/// PKCS#1); it is parsed once here so malformed keys fail at configuration time.
#[derive(Clone)]
pub struct Signer {
	method: SignatureMethod,
	key: KeyMaterial,
}
impl Signer {
	/// Builds a signer for `method` using the consumer secret.
	pub fn new(method: SignatureMethod, consumer_secret: &str) -> Result<Self, SignError> {
		let key = match method {
			SignatureMethod::RsaSha1 =>
				KeyMaterial::Rsa(Arc::new(SigningKey::<Sha1>::new(load_private_key(consumer_secret)?))),
			SignatureMethod::HmacSha1 | SignatureMethod::Plaintext =>
				KeyMaterial::Secret(consumer_secret.to_owned()),
		};

		Ok(Self { method, key })
	}

	/// Returns the configured signature method.
	pub fn method(&self) -> SignatureMethod {
		self.method
	}

	/// Signs the canonical base string of `input` and returns the encoded signature.
	pub fn sign(&self, input: &SignatureInput<'_>) -> Result<String, SignError> {
		match (&self.key, self.method) {
			(KeyMaterial::Secret(secret), SignatureMethod::Plaintext) =>
				Ok(signing_key(secret, input.token_secret)),
			(KeyMaterial::Secret(secret), _) => {
				let mut mac = Hmac::<Sha1>::new_from_slice(
					signing_key(secret, input.token_secret).as_bytes(),
				)
				.map_err(|_| SignError::InvalidHmacKey)?;

				mac.update(input.base_string().as_bytes());

				Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
			},
			(KeyMaterial::Rsa(key), _) => {
				let signature = key
					.try_sign(input.base_string().as_bytes())
					.map_err(|e| SignError::Rsa { source: Box::new(e) })?;

				Ok(BASE64_STANDARD.encode(signature.to_bytes()))
			},
		}
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Signer").field("method", &self.method).field("key", &"<redacted>").finish()
	}
}

/// Returns `enc(consumer_secret)&enc(token_secret)`, the HMAC key and PLAINTEXT signature.
pub fn signing_key(consumer_secret: &str, token_secret: Option<&str>) -> String {
	format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret.unwrap_or_default()))
}

fn load_private_key(pem: &str) -> Result<RsaPrivateKey, SignError> {
	if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
		return Ok(key);
	}

	RsaPrivateKey::from_pkcs1_pem(pem).map_err(|e| SignError::InvalidPrivateKey { source: Box::new(e) })
}

#[cfg(test)]
mod tests {
	// crates.io
	use rsa::{
		RsaPublicKey,
		pkcs1v15::{Signature, VerifyingKey},
		signature::Verifier,
	};
	// self
	use super::*;

	const PKCS8_KEY: &str = include_str!("../../tests/fixtures/rsa_pkcs8.pem");
	const PKCS1_KEY: &str = include_str!("../../tests/fixtures/rsa_pkcs1.pem");

	fn photos_parameters() -> Vec<(String, String)> {
		[
			("file", "vacation.jpg"),
			("size", "original"),
			("oauth_consumer_key", "dpf43f3p2l4k3l03"),
			("oauth_token", "nnch734d00sl2jdk"),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", "1191242096"),
			("oauth_nonce", "kllo9940pd9333jh"),
			("oauth_version", "1.0"),
		]
		.into_iter()
		.map(|(k, v)| (k.to_owned(), v.to_owned()))
		.collect()
	}

	fn photos_url() -> Url {
		Url::parse("http://photos.example.net/photos").expect("Failed to parse photos URL fixture.")
	}

	#[test]
	fn method_names_parse_and_reject_unknown_values() {
		assert_eq!("hmac-sha1".parse::<SignatureMethod>().ok(), Some(SignatureMethod::HmacSha1));
		assert_eq!("RSA-SHA1".parse::<SignatureMethod>().ok(), Some(SignatureMethod::RsaSha1));
		assert_eq!("PLAINTEXT".parse::<SignatureMethod>().ok(), Some(SignatureMethod::Plaintext));
		assert!(matches!(
			"HMAC-SHA256".parse::<SignatureMethod>(),
			Err(SignError::UnsupportedSignatureMethod(name)) if name == "HMAC-SHA256"
		));
		assert_eq!(
			serde_json::from_str::<SignatureMethod>("\"RSA-SHA1\"")
				.expect("Signature method should deserialize from its wire name."),
			SignatureMethod::RsaSha1
		);
	}

	#[test]
	fn hmac_sha1_matches_published_vector_and_is_deterministic() {
		let signer = Signer::new(SignatureMethod::HmacSha1, "kd94hf93k423kf44")
			.expect("HMAC signer should build from any secret.");
		let url = photos_url();
		let parameters = photos_parameters();
		let input =
			SignatureInput::new("GET", &url, &parameters).with_token_secret(Some("pfkkdhi9sl3r4s00"));
		let first = signer.sign(&input).expect("HMAC-SHA1 signing should succeed.");

		assert_eq!(first, "tR3+Ty81lMeYAr/Fid0kMTYa/WM=");

		for _ in 0..8 {
			assert_eq!(signer.sign(&input).expect("Repeated signing should succeed."), first);
		}
	}

	#[test]
	fn hmac_sha1_matches_reserved_character_vector() {
		let signer =
			Signer::new(SignatureMethod::HmacSha1, "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw")
				.expect("HMAC signer should build from any secret.");
		let url = Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
			.expect("Failed to parse status URL fixture.");
		let parameters = crate::sign::collect_parameters(
			&url,
			[
				("status", "Hello Ladies + Gentlemen, a signed OAuth request!"),
				("oauth_consumer_key", "xvz1evFS4wEEPTGEFPHBog"),
				("oauth_nonce", "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg"),
				("oauth_signature_method", "HMAC-SHA1"),
				("oauth_timestamp", "1318622958"),
				("oauth_token", "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb"),
				("oauth_version", "1.0"),
			]
			.into_iter()
			.map(|(k, v)| (k.to_owned(), v.to_owned())),
		);
		let input = SignatureInput::new("POST", &url, &parameters)
			.with_token_secret(Some("LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE"));

		assert_eq!(
			signer.sign(&input).expect("HMAC-SHA1 signing should succeed."),
			"hCtSmYh+iHYCEqBWrE7C7hYmtUk="
		);
	}

	#[test]
	fn plaintext_signature_is_the_encoded_key() {
		let signer = Signer::new(SignatureMethod::Plaintext, "djr9rjt0jd78jf88")
			.expect("PLAINTEXT signer should build from any secret.");
		let url = photos_url();
		let without_token = SignatureInput::new("POST", &url, &[]);

		assert_eq!(
			signer.sign(&without_token).expect("PLAINTEXT signing should succeed."),
			"djr9rjt0jd78jf88&"
		);

		let with_token = without_token.with_token_secret(Some("jjd99$tj88uiths3"));

		assert_eq!(
			signer.sign(&with_token).expect("PLAINTEXT signing should succeed."),
			"djr9rjt0jd78jf88&jjd99%24tj88uiths3"
		);
	}

	#[test]
	fn rsa_sha1_signature_verifies_with_public_key() {
		let signer = Signer::new(SignatureMethod::RsaSha1, PKCS8_KEY)
			.expect("RSA signer should accept a PKCS#8 key.");
		let url = photos_url();
		let parameters = photos_parameters();
		let input = SignatureInput::new("GET", &url, &parameters);
		let encoded = signer.sign(&input).expect("RSA-SHA1 signing should succeed.");

		assert_eq!(
			encoded,
			"ak2iEEkdx4c+clo9skL8dAurrvvcwE57yYlzP9kj4DbwiaEf6BGNnGSxcj9eUD4dLVWpmv6GiIYXCIi/cgtdiensLPfe0l9vh77uY0csBQ3qixlczTaMc0UPccarxX6oW7uvIxqAqsRRu7ptpk2O8xS6TeCn7JD6TbvygeEfiQLDNA9ApbEtc8ogERMCJT4MWfXA1YuvDW8AHeNjm9bJqoBIS/flg4xHkEO5jCnERwwLbjfs4Aal3tCkipHOAR99tv7p3NGrb14607or5iFg+1mwC8hUaULsk1V72Yi8tR7J8u+uvrUmMRZ25ducNesqedPZL+9uQkDn2IBlevUg1g=="
		);

		let private = RsaPrivateKey::from_pkcs8_pem(PKCS8_KEY).expect("Fixture key should parse.");
		let verifying = VerifyingKey::<Sha1>::new(RsaPublicKey::from(&private));
		let raw = BASE64_STANDARD.decode(&encoded).expect("Signature should be valid base64.");
		let signature =
			Signature::try_from(raw.as_slice()).expect("Signature bytes should decode.");

		verifying
			.verify(input.base_string().as_bytes(), &signature)
			.expect("Public key should verify the RSA-SHA1 signature.");
	}

	#[test]
	fn rsa_sha1_accepts_pkcs1_and_rejects_garbage() {
		let pkcs1 = Signer::new(SignatureMethod::RsaSha1, PKCS1_KEY)
			.expect("RSA signer should accept a PKCS#1 key.");
		let pkcs8 = Signer::new(SignatureMethod::RsaSha1, PKCS8_KEY)
			.expect("RSA signer should accept a PKCS#8 key.");
		let url = photos_url();
		let input = SignatureInput::new("GET", &url, &[]);

		assert_eq!(
			pkcs1.sign(&input).expect("PKCS#1 signing should succeed."),
			pkcs8.sign(&input).expect("PKCS#8 signing should succeed.")
		);
		assert!(matches!(
			Signer::new(SignatureMethod::RsaSha1, "not a key"),
			Err(SignError::InvalidPrivateKey { .. })
		));
	}

	#[test]
	fn debug_output_redacts_key_material() {
		let signer = Signer::new(SignatureMethod::HmacSha1, "very-secret")
			.expect("HMAC signer should build from any secret.");
		let rendered = format!("{signer:?}");

		assert!(rendered.contains("HmacSha1"));
		assert!(!rendered.contains("very-secret"));
	}
}
