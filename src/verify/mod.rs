//! Provably-fair roll verification
//!
//! Recomputes a dice roll from published seed material and checks it
//! against what the service reported. The construction is pinned to the
//! service's published scheme and must match it bit-for-bit: HMAC-SHA512
//! keyed with the server seed over `"{client_seed}:{nonce}"`, first 8 hex
//! digits of the digest as an unsigned integer, reduced modulo 10000
//! hundredths (0.00..=99.99).
//!
//! A mismatch is a finding, never an error: live play and replays keep
//! going so discrepancies can be audited afterwards.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Width of the digest prefix used for the roll, in hex digits
const PREFIX_HEX_DIGITS: usize = 8;

/// Roll range in hundredths: rolls are 0.00..=99.99
const ROLL_MODULUS: u32 = 10_000;

/// Outcome of verifying one reported roll, immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub server_seed: String,
    pub client_seed: String,
    pub nonce: u64,
    /// Roll the service reported, in hundredths
    pub reported: u32,
    /// Roll recomputed from the seed material, in hundredths
    pub recomputed: u32,
    /// Exact equality at the published two-decimal precision
    pub matched: bool,
}

/// Recompute a roll in hundredths (0..10000) from its seed material.
///
/// Deterministic: the same inputs always produce the same roll.
pub fn roll_hundredths(server_seed: &str, client_seed: &str, nonce: u64) -> u32 {
    let mut mac = HmacSha512::new_from_slice(server_seed.as_bytes())
        .expect("HMAC-SHA512 accepts keys of any length");
    mac.update(format!("{}:{}", client_seed, nonce).as_bytes());
    let digest = mac.finalize().into_bytes();

    // First 8 hex digits = first 4 digest bytes, big-endian
    let mut value: u32 = 0;
    for &byte in digest.iter().take(PREFIX_HEX_DIGITS / 2) {
        value = (value << 8) | byte as u32;
    }
    value % ROLL_MODULUS
}

/// Recompute a roll as the 0.00..=99.99 value the service displays
pub fn roll_value(server_seed: &str, client_seed: &str, nonce: u64) -> f64 {
    roll_hundredths(server_seed, client_seed, nonce) as f64 / 100.0
}

/// Convert a displayed roll to hundredths for exact comparison
pub fn to_hundredths(roll: f64) -> u32 {
    (roll * 100.0).round() as u32
}

/// Verify one reported roll against its seed material
pub fn verify_roll(
    server_seed: &str,
    client_seed: &str,
    nonce: u64,
    reported_roll: f64,
) -> VerificationRecord {
    let reported = to_hundredths(reported_roll);
    let recomputed = roll_hundredths(server_seed, client_seed, nonce);
    VerificationRecord {
        server_seed: server_seed.to_string(),
        client_seed: client_seed.to_string(),
        nonce,
        reported,
        recomputed,
        matched: reported == recomputed,
    }
}

/// Verify a recorded roll history against consecutive nonces starting at
/// `first_nonce`. Used to audit a replayed session before trusting it.
pub fn verify_history(
    server_seed: &str,
    client_seed: &str,
    first_nonce: u64,
    rolls: &[f64],
) -> Vec<VerificationRecord> {
    rolls
        .iter()
        .enumerate()
        .map(|(i, &roll)| verify_roll(server_seed, client_seed, first_nonce + i as u64, roll))
        .collect()
}

/// Count of mismatches in a batch of verification records
pub fn mismatch_count(records: &[VerificationRecord]) -> usize {
    records.iter().filter(|r| !r.matched).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Golden vectors computed independently with
    // `printf 'client-seed-xyz:N' | openssl dgst -sha512 -hmac server-seed-abc`
    const SERVER: &str = "server-seed-abc";
    const CLIENT: &str = "client-seed-xyz";

    #[test]
    fn test_golden_vectors() {
        assert_eq!(roll_hundredths(SERVER, CLIENT, 0), 5234);
        assert_eq!(roll_hundredths(SERVER, CLIENT, 1), 3833);
        assert_eq!(roll_hundredths(SERVER, CLIENT, 2), 7471);
        assert_eq!(roll_hundredths(SERVER, CLIENT, 3), 216);
    }

    #[test]
    fn test_golden_vectors_other_seeds() {
        // hmac(secret, "candidate:0") prefix d2a0c6bc = 3533751996
        assert_eq!(roll_hundredths("secret", "candidate", 0), 1996);
        // hmac(topsecret, "abc:7") prefix e6c275d7 = 3871503831
        assert_eq!(roll_hundredths("topsecret", "abc", 7), 3831);
    }

    #[test]
    fn test_displayed_value() {
        assert_eq!(roll_value(SERVER, CLIENT, 3), 2.16);
    }

    #[test]
    fn test_deterministic() {
        for nonce in 0..50 {
            assert_eq!(
                roll_hundredths(SERVER, CLIENT, nonce),
                roll_hundredths(SERVER, CLIENT, nonce)
            );
        }
    }

    #[test]
    fn test_verify_roll_match_and_mismatch() {
        let good = verify_roll(SERVER, CLIENT, 0, 52.34);
        assert!(good.matched);
        assert_eq!(good.recomputed, 5234);

        let bad = verify_roll(SERVER, CLIENT, 0, 52.35);
        assert!(!bad.matched);
        assert_eq!(bad.reported, 5235);
    }

    #[test]
    fn test_verify_history_flags_tampered_roll() {
        let mut rolls = vec![52.34, 38.33, 74.71, 2.16];
        let clean = verify_history(SERVER, CLIENT, 0, &rolls);
        assert_eq!(mismatch_count(&clean), 0);

        rolls[2] = 74.72;
        let tampered = verify_history(SERVER, CLIENT, 0, &rolls);
        assert_eq!(mismatch_count(&tampered), 1);
        assert!(!tampered[2].matched);
    }
}
