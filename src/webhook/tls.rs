// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::config::TlsFiles;
use crate::error::{LegateError, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;
use tracing::info;

/// Load a PEM certificate chain
pub fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = BufReader::new(File::open(path)?);
    let certs = rustls_pemfile::certs(&mut reader).collect::<std::io::Result<Vec<_>>>()?;

    if certs.is_empty() {
        return Err(LegateError::Tls(format!(
            "{}: no certificates found",
            path.display()
        )));
    }
    Ok(certs)
}

/// Load the first PKCS#8, PKCS#1 or SEC1 private key from a PEM file
pub fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>> {
    let mut reader = BufReader::new(File::open(path)?);
    rustls_pemfile::private_key(&mut reader)?
        .ok_or_else(|| LegateError::Tls(format!("{}: no private key found", path.display())))
}

pub fn acceptor(files: &TlsFiles) -> Result<TlsAcceptor> {
    let certs = load_certs(&files.cert)?;
    let key = load_private_key(&files.key)?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| LegateError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| LegateError::Tls(format!("{}: {}", files.cert.display(), e)))?;
    config.alpn_protocols = vec![b"http/1.1".to_vec()];

    info!("Loaded TLS certificate from {}", files.cert.display());
    Ok(TlsAcceptor::from(Arc::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn pem_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_files() {
        let err = load_certs(Path::new("/nonexistent/tls.crt")).unwrap_err();
        assert!(matches!(err, LegateError::Io(_)));

        let err = load_private_key(Path::new("/nonexistent/tls.key")).unwrap_err();
        assert!(matches!(err, LegateError::Io(_)));
    }

    #[test]
    fn test_empty_pem_rejected() {
        let file = pem_file("not a pem file\n");

        let err = load_certs(file.path()).unwrap_err();
        assert!(err.to_string().contains("no certificates found"));

        let err = load_private_key(file.path()).unwrap_err();
        assert!(err.to_string().contains("no private key found"));
    }

    #[test]
    fn test_acceptor_requires_both_files() {
        let cert = pem_file("");
        let files = TlsFiles {
            cert: cert.path().to_path_buf(),
            key: "/nonexistent/tls.key".into(),
        };
        assert!(acceptor(&files).is_err());
    }
}
