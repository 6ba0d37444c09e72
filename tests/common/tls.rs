//! TLS fixtures: a throwaway CA, server and client certificates, and a
//! server-side acceptor built from them.

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use rustls_pemfile::{certs, private_key};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::crypto::aws_lc_rs;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::rustls::server::WebPkiClientVerifier;
use tokio_rustls::rustls::{RootCertStore, ServerConfig};

#[derive(Clone, Debug)]
pub struct TlsTestPaths {
    pub ca_path: PathBuf,
    pub server_cert_path: PathBuf,
    pub server_key_path: PathBuf,
    pub client_cert_path: PathBuf,
    pub client_key_path: PathBuf,
    /// Client certificate and key concatenated in one file.
    pub client_combined_path: PathBuf,
    /// Client key as PKCS#8 encrypted with [`CLIENT_KEY_PASSWORD`].
    pub client_encrypted_key_path: PathBuf,
}

pub const CLIENT_KEY_PASSWORD: &str = "hunter2";

pub fn generate_tls_assets(dir: &Path) -> anyhow::Result<TlsTestPaths> {
    std::fs::create_dir_all(dir)?;

    let (ca_cert, ca_key) = build_ca()?;
    let (server_cert, server_key) = build_leaf(&ca_cert, &ca_key, &["localhost", "127.0.0.1"], "localhost")?;
    let (client_cert, client_key) = build_leaf(&ca_cert, &ca_key, &[], "slirc-net-test-client")?;

    let paths = TlsTestPaths {
        ca_path: dir.join("ca.pem"),
        server_cert_path: dir.join("server.pem"),
        server_key_path: dir.join("server.key"),
        client_cert_path: dir.join("client.pem"),
        client_key_path: dir.join("client.key"),
        client_combined_path: dir.join("client-combined.pem"),
        client_encrypted_key_path: dir.join("client-encrypted.key"),
    };

    std::fs::write(&paths.ca_path, ca_cert.pem())?;
    std::fs::write(&paths.server_cert_path, server_cert.pem())?;
    std::fs::write(&paths.server_key_path, server_key.serialize_pem())?;
    std::fs::write(&paths.client_cert_path, client_cert.pem())?;
    std::fs::write(&paths.client_key_path, client_key.serialize_pem())?;
    std::fs::write(
        &paths.client_combined_path,
        format!("{}{}", client_cert.pem(), client_key.serialize_pem()),
    )?;

    let client_der = client_key.serialize_der();
    let encrypted = pkcs8::PrivateKeyInfo::try_from(client_der.as_slice())?
        .encrypt(pkcs8::rand_core::OsRng, CLIENT_KEY_PASSWORD)?
        .to_pem("ENCRYPTED PRIVATE KEY", pkcs8::LineEnding::LF)?;
    std::fs::write(&paths.client_encrypted_key_path, encrypted.as_bytes())?;

    Ok(paths)
}

/// Build a server acceptor. With `require_client_cert` the client must
/// present a certificate signed by the test CA.
pub fn acceptor(paths: &TlsTestPaths, require_client_cert: bool) -> anyhow::Result<TlsAcceptor> {
    let provider = Arc::new(aws_lc_rs::default_provider());
    let builder = ServerConfig::builder_with_provider(Arc::clone(&provider))
        .with_safe_default_protocol_versions()?;

    let builder = if require_client_cert {
        let mut roots = RootCertStore::empty();
        for cert in load_certs(&paths.ca_path)? {
            roots.add(cert)?;
        }
        let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider).build()?;
        builder.with_client_cert_verifier(verifier)
    } else {
        builder.with_no_client_auth()
    };

    let config = builder.with_single_cert(
        load_certs(&paths.server_cert_path)?,
        load_key(&paths.server_key_path)?,
    )?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}

fn load_certs(path: &Path) -> anyhow::Result<Vec<CertificateDer<'static>>> {
    let data = std::fs::read(path)?;
    Ok(certs(&mut Cursor::new(data)).collect::<Result<Vec<_>, _>>()?)
}

fn load_key(path: &Path) -> anyhow::Result<PrivateKeyDer<'static>> {
    let data = std::fs::read(path)?;
    private_key(&mut Cursor::new(data))?
        .ok_or_else(|| anyhow::anyhow!("no private key in {}", path.display()))
}

fn build_ca() -> anyhow::Result<(Certificate, KeyPair)> {
    let mut params = CertificateParams::default();
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::CommonName, "slirc-net-test-ca");
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let key_pair = KeyPair::generate()?;
    let cert = params.self_signed(&key_pair)?;
    Ok((cert, key_pair))
}

fn build_leaf(
    ca_cert: &Certificate,
    ca_key: &KeyPair,
    names: &[&str],
    common_name: &str,
) -> anyhow::Result<(Certificate, KeyPair)> {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let mut params = CertificateParams::new(names)?;
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::CommonName, common_name);
    params.is_ca = IsCa::NoCa;
    let key_pair = KeyPair::generate()?;
    let cert = params.signed_by(&key_pair, ca_cert, ca_key)?;
    Ok((cert, key_pair))
}
