// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Certificate payload format gate.

/// Literal prefix of an EU Digital COVID Certificate QR payload.
pub const CERTIFICATE_PREFIX: &str = "HC1:";

/// Whether `candidate` looks like a certificate payload.
///
/// This is a format gate, not a trust gate: only the case-sensitive prefix is
/// checked. The payload body (base45, zlib, COSE) is not inspected.
pub fn validate(candidate: &str) -> bool {
    candidate.starts_with(CERTIFICATE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_payload() {
        assert!(validate("HC1:NCFOXN%TS3DH3ZSUZK+.V0ETD%65NL-AH"));
        assert!(validate("HC1:"));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        assert!(!validate("hc1:abc"));
        assert!(!validate("Hc1:abc"));
    }

    #[test]
    fn rejects_empty_and_unrelated_text() {
        assert!(!validate(""));
        assert!(!validate("HC1"));
        assert!(!validate("NOTAVALIDCODE"));
        assert!(!validate(" HC1:leading-space"));
        assert!(!validate("https://example.org/HC1:"));
    }
}
