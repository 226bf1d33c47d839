use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Per-session form tokens: hex(HMAC-SHA256(secret, session id)).
#[derive(Clone)]
pub struct CsrfService {
    secret: Vec<u8>,
}

impl CsrfService {
    pub fn new(secret: &str) -> Self {
        CsrfService {
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn mac(&self, session_id: &Uuid) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).ok()?;
        mac.update(session_id.as_bytes());
        Some(mac)
    }

    pub fn issue(&self, session_id: &Uuid) -> String {
        self.mac(session_id)
            .map(|mac| hex::encode(mac.finalize().into_bytes()))
            .unwrap_or_default()
    }

    pub fn verify(&self, session_id: &Uuid, token: &str) -> bool {
        let Ok(signature) = hex::decode(token.trim()) else {
            return false;
        };

        self.mac(session_id)
            .is_some_and(|mac| mac.verify_slice(&signature).is_ok())
    }
}
