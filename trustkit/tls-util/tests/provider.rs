use std::{fs, path::Path};

use rstest::rstest;
use trustkit_tls_util::{
    build_pool, client_credentials, error::ProviderError, error::TlsConfigError,
    server_credentials, tls_config, ClientAuth, Curve, Provider,
};

fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// A private provider loaded from disk binds to a server.
#[test]
fn happy_server() {
    let provider = Provider::load(fixture("node3.pem")).unwrap();
    assert!(provider.is_private());

    let credentials = server_credentials(&provider, &[]).unwrap();
    assert_eq!(
        credentials.config().client_auth(),
        ClientAuth::RequireAndVerifyClientCert
    );
}

#[test]
fn client_server_name() {
    let provider = Provider::load(fixture("node3.pem")).unwrap();

    let credentials =
        client_credentials("https://node-3.example.net:4443", &provider, &[]).unwrap();
    let config = credentials.config();

    assert_eq!(config.server_name(), Some("node-3.example.net:4443"));
    assert_eq!(config.root_cas().unwrap().len(), 1);
    assert_eq!(config.root_cas(), Some(&provider.cert_pool().unwrap()));
    assert!(config.client_cas().is_none());
    assert_eq!(credentials.server_name().to_str(), "node-3.example.net");
}

#[test]
fn public_rejection() {
    let provider = Provider::load(fixture("node3.crt.pem")).unwrap();
    assert!(!provider.is_private());

    assert!(matches!(
        tls_config(&provider, &[]),
        Err(TlsConfigError::PrivateKeyRequired)
    ));
    assert!(matches!(
        server_credentials(&provider, &[]),
        Err(TlsConfigError::PrivateKeyRequired)
    ));
    assert!(matches!(provider.key_pair(), Err(ProviderError::MissingKey)));
    assert!(matches!(provider.rsa_key(), Err(ProviderError::MissingKey)));
}

#[test]
fn mixed_stream_round_trip() {
    let provider = Provider::load(fixture("chain.pem")).unwrap();

    assert_eq!(provider.len(), 2);
    assert!(provider.is_private());
    assert_eq!(provider.common_name(), "leaf.example.net");
    assert!(!provider.leaf_certificate().unwrap().is_ca());

    let decoded = Provider::from_bytes(&provider.to_pem().unwrap()).unwrap();
    assert_eq!(decoded, provider);
    assert_eq!(decoded.chain(), provider.chain());
    assert_eq!(decoded.key(), provider.key());
}

#[test]
fn unhandled_block() {
    let error = Provider::load(fixture("with-csr.pem")).unwrap_err();
    assert!(matches!(
        error,
        ProviderError::UnhandledBlockType(label) if label == "CERTIFICATE REQUEST"
    ));
}

#[test]
fn missing_file() {
    let error = Provider::load(fixture("does-not-exist.pem")).unwrap_err();
    assert!(matches!(error, ProviderError::OpenFile { .. }));
}

#[rstest]
#[case::private_rsa("node3.pem")]
#[case::public_rsa("node3.crt.pem")]
#[case::private_ecdsa_chain("chain.pem")]
#[case::ca_only("ca.crt.pem")]
fn dump_then_load(#[case] name: &str) {
    let provider = Provider::load(fixture(name)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    provider.dump(&path).unwrap();

    let loaded = Provider::load(&path).unwrap();
    assert_eq!(loaded, provider);

    // A second dump truncates the file.
    loaded.dump(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), provider.to_pem().unwrap());
}

#[test]
fn empty_file_is_an_empty_public_provider() {
    let file = tempfile::NamedTempFile::new().unwrap();

    let provider = Provider::load(file.path()).unwrap();
    assert!(provider.is_empty());
    assert!(!provider.is_private());
}

#[test]
fn private_provider_key_pair_verifies() {
    for name in ["node3.pem", "chain.pem"] {
        let provider = Provider::load(fixture(name)).unwrap();
        let key_pair = provider.key_pair().unwrap();

        assert_eq!(key_pair.leaf(), provider.chain().first());
        assert_eq!(key_pair.cert_chain().len(), provider.len());
    }
}

#[test]
fn trusted_providers_reach_the_client_roots() {
    let provider = Provider::load(fixture("node3.pem")).unwrap();
    let trusted = Provider::load(fixture("ca.crt.pem")).unwrap();

    let credentials =
        client_credentials("https://node-3.example.net", &provider, &[&trusted]).unwrap();

    assert_eq!(
        credentials.config().root_cas(),
        Some(&build_pool([&provider, &trusted]).unwrap())
    );
    assert_eq!(credentials.config().curve_preferences()[0], Curve::P521);
}
