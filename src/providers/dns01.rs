// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! DNS-01 record naming helpers.

use crate::constants::dns01::CHALLENGE_LABEL;
use crate::error::{LegateError, Result};

/// `_acme-challenge.<domain>.` as a fully qualified name
pub fn challenge_fqdn(domain: &str) -> String {
    format!("{}.{}", CHALLENGE_LABEL, to_fqdn(domain))
}

/// Append the root dot if missing
pub fn to_fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}

/// Drop the root dot, for APIs that expect relative names
pub fn un_fqdn(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Remove the first label of a resolved challenge FQDN.
///
/// cert-manager hands out `_acme-challenge.example.com.` while providers
/// take `example.com.` and add the challenge label back.
pub fn strip_challenge_label(resolved_fqdn: &str) -> Result<&str> {
    match resolved_fqdn.split_once('.') {
        Some((_, rest)) if !rest.is_empty() && rest != "." => Ok(rest),
        _ => Err(LegateError::InvalidFqdn(resolved_fqdn.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_fqdn() {
        assert_eq!(challenge_fqdn("example.com"), "_acme-challenge.example.com.");
        assert_eq!(challenge_fqdn("example.com."), "_acme-challenge.example.com.");
    }

    #[test]
    fn test_un_fqdn() {
        assert_eq!(un_fqdn("_acme-challenge.example.com."), "_acme-challenge.example.com");
        assert_eq!(un_fqdn("example.com"), "example.com");
    }

    #[test]
    fn test_strip_challenge_label() {
        assert_eq!(
            strip_challenge_label("_acme-challenge.example.com.").unwrap(),
            "example.com."
        );
        assert_eq!(
            strip_challenge_label("_acme-challenge.www.example.com").unwrap(),
            "www.example.com"
        );
    }

    #[test]
    fn test_strip_challenge_label_rejects_single_label() {
        assert!(strip_challenge_label("localhost").is_err());
        assert!(strip_challenge_label("localhost.").is_err());
        assert!(strip_challenge_label("").is_err());
    }

    #[test]
    fn test_strip_then_rebuild_round_trips() {
        let resolved = "_acme-challenge.example.com.";
        let domain = strip_challenge_label(resolved).unwrap();
        assert_eq!(challenge_fqdn(domain), resolved);
    }
}
