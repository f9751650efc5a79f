use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rustls::RootCertStore;

use super::TlsError;
use crate::config::TrustAnchors;

/// Builds the root store server certificates are verified against.
///
/// The platform store falls back to the bundled webpki roots when it yields
/// nothing usable.
pub fn root_store(trust: &TrustAnchors) -> Result<RootCertStore, TlsError> {
    match trust {
        TrustAnchors::System => Ok(system_roots()),
        TrustAnchors::File(path) => file_roots(path),
    }
}

fn system_roots() -> RootCertStore {
    let mut store = RootCertStore::empty();
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "certificate load error");
    }

    let (added, ignored) = store.add_parsable_certificates(loaded.certs);
    if ignored > 0 {
        tracing::warn!(ignored, "skipped unparsable system certificates");
    }

    if store.is_empty() {
        tracing::warn!("platform trust store is empty, using bundled webpki roots");
        store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    } else {
        tracing::debug!(added, "loaded system certificates");
    }
    store
}

fn file_roots(path: &Path) -> Result<RootCertStore, TlsError> {
    let trust_file = |source| TlsError::TrustFile {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(File::open(path).map_err(trust_file)?);
    let mut store = RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert.map_err(trust_file)?;
        if let Err(err) = store.add(cert) {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unusable certificate");
        }
    }

    if store.is_empty() {
        return Err(TlsError::NoTrustAnchors(path.display().to_string()));
    }
    tracing::debug!(path = %path.display(), count = store.len(), "loaded trust anchors");
    Ok(store)
}
