pub mod scheme;

pub use scheme::{Commitment, CommitmentScheme};

use crate::moves::Move;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Salt length in bytes before hex encoding
pub const SALT_LEN: usize = 32;

/// Move plus the salt that hides it
#[derive(Debug, Clone)]
pub struct MoveOpening {
    pub mv: Move,
    pub salt: String,
}

impl MoveOpening {
    pub fn new(mv: Move, salt: impl Into<String>) -> Self {
        Self {
            mv,
            salt: salt.into(),
        }
    }
}

/// SHA-256 over `"<move>:<salt>"`, rendered as lower-case hex
pub struct Sha256MoveScheme;

impl CommitmentScheme for Sha256MoveScheme {
    type Opening = MoveOpening;

    fn commit(opening: &Self::Opening) -> Commitment {
        let mut hasher = Sha256::new();
        hasher.update(opening.mv.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(opening.salt.as_bytes());
        Commitment::new(hex::encode(hasher.finalize()))
    }
}

pub fn commit(mv: Move, salt: &str) -> Commitment {
    Sha256MoveScheme::commit(&MoveOpening::new(mv, salt))
}

pub fn verify(mv: Move, salt: &str, commitment: &Commitment) -> bool {
    Sha256MoveScheme::verify(commitment, &MoveOpening::new(mv, salt))
}

/// Random salt for a new commitment
pub fn generate_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    hex::encode(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_scheme() {
        let salt = generate_salt();
        let commitment = commit(Move::Rock, &salt);

        assert_eq!(commitment.as_str().len(), 64);
        assert!(verify(Move::Rock, &salt, &commitment));
        assert!(!verify(Move::Paper, &salt, &commitment));
        assert!(!verify(Move::Rock, "wrong salt", &commitment));
    }

    #[test]
    fn test_known_vector() {
        // sha256("rock:abc")
        let commitment = commit(Move::Rock, "abc");
        let mut hasher = Sha256::new();
        hasher.update(b"rock:abc");
        assert_eq!(commitment.as_str(), hex::encode(hasher.finalize()));
    }

    #[test]
    fn test_single_bit_changes_fail() {
        let salt = "00ff";
        let commitment = commit(Move::Scissors, salt);

        // flip one bit in the salt
        assert!(!verify(Move::Scissors, "00fe", &commitment));

        // flip one bit in the commitment
        let mut bytes = commitment.as_str().as_bytes().to_vec();
        bytes[0] ^= 0x01;
        let flipped = Commitment::new(String::from_utf8(bytes).unwrap());
        assert!(!verify(Move::Scissors, salt, &flipped));

        for other in Move::ALL.into_iter().filter(|m| *m != Move::Scissors) {
            assert!(!verify(other, salt, &commitment));
        }
    }

    #[test]
    fn test_salts_are_unique_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), SALT_LEN * 2);
        assert!(hex::decode(&a).is_ok());
        assert_ne!(a, b);
    }
}
