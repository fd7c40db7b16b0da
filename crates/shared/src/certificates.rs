use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
};

use rustls::RootCertStore;
use rustls_pemfile::certs;
use rustls_pki_types::CertificateDer;
use thiserror::Error;

/// The root certificates restic is told to trust through `--cacert`.
pub struct RootCertificates {
    /// The certificates found in the file.
    pub certificates: Vec<CertificateDer<'static>>,

    /// The trust store built from the certificates.
    pub trust_store: RootCertStore,
}

impl RootCertificates {
    /// Tries to load and verify the PEM encoded root certificates at `path`.
    pub fn load(path: &Path) -> Result<Self, CertificateError> {
        let file = File::open(path).map_err(CertificateError::LoadRootCertificate)?;

        let certificates: Vec<_> = certs(&mut BufReader::new(file))
            .collect::<io::Result<_>>()
            .map_err(CertificateError::LoadRootCertificate)?;

        if certificates.is_empty() {
            return Err(CertificateError::NoRootCertificate);
        }

        let mut trust_store = RootCertStore::empty();
        for certificate in &certificates {
            trust_store.add(certificate.clone())?;
        }

        Ok(Self {
            certificates,
            trust_store,
        })
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Failed to load the root certificate file\n{0}")]
    LoadRootCertificate(#[source] io::Error),

    #[error("The root certificate file contained no certificates.")]
    NoRootCertificate,

    #[error("Failed to create the trust store\n{0}")]
    CreateTrustStore(#[from] rustls::Error),
}
