use std::time::Duration;

use azsign_azure_storage::{
    AccountSharedAccessSignature, Config, Credential, RequestSigner, Service,
    ServiceSharedAccessSignature,
};
use azsign_core::{ErrorKind, Signer};
use pretty_assertions::assert_eq;

use crate::{init_logger, signing_time, ACCOUNT_KEY, ACCOUNT_NAME};

#[test]
fn test_account_sas() {
    init_logger();

    let sas = AccountSharedAccessSignature::new(ACCOUNT_NAME, ACCOUNT_KEY, "2017-03-24T21:14:01Z")
        .with_version("2016-05-31")
        .with_services("bfqt")
        .with_resource_types("sco")
        .with_permissions("rwdlacup")
        .with_start("2017-03-17T13:14:01Z")
        .with_protocol("https");

    assert_eq!(
        sas.token().unwrap(),
        "sv=2016-05-31&ss=bqtf&srt=sco&sp=rwdlacup&se=2017-03-24T21:14:01Z&st=2017-03-17T13:14:01Z&spr=https&sig=2LZ1EoMhQMAx0IjfgihfjWpljA7edYlNM%2FWwoX7bwRc%3D"
    );
}

#[test]
fn test_account_sas_rejects_unknown_service() {
    let err = AccountSharedAccessSignature::new(ACCOUNT_NAME, ACCOUNT_KEY, "2017-03-24T21:14:01Z")
        .with_services("bqtfg")
        .token()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(err.field(), Some("signedServices"));
}

#[test]
fn test_service_sas_for_blob() {
    init_logger();

    let sas = |resource_name: &str| {
        ServiceSharedAccessSignature::new(ACCOUNT_NAME, ACCOUNT_KEY, "b", resource_name)
            .with_resource("b")
            .with_permissions("racwdl")
            .with_start("2017-03-17T13:14:01Z")
            .with_expiry("2017-03-24T21:14:01Z")
    };

    let signature = sas("container/blob").signature().unwrap();
    assert_eq!(signature, "o+hw8MsxALw68Up5KvEy1PPtY/7qz/XyROYMkSP9GbE=");
    assert_eq!(sas("container/blob").signature().unwrap(), signature);
    assert_ne!(sas("container/other").signature().unwrap(), signature);
}

#[test]
fn test_service_sas_for_container_omits_absent_fields() {
    let token = ServiceSharedAccessSignature::new(ACCOUNT_NAME, ACCOUNT_KEY, "B", "container")
        .with_resource("c")
        .with_permissions("lr")
        .with_expiry("2017-03-24T21:14:01Z")
        .with_protocol("https,http")
        .token()
        .unwrap();

    assert_eq!(
        token,
        "sv=2018-03-28&sr=c&sp=rl&se=2017-03-24T21%3A14%3A01Z&spr=https%2Chttp&sig=BAmS6%2F4gM0jDAmlTaiWQYWK%2BMuKiD6htJPnJuCaqM18%3D"
    );
    assert!(!token.contains("st="));
    assert!(!token.contains("sip="));
}

#[test]
fn test_presign_with_shared_key() {
    init_logger();

    let signer = Signer::new(
        Credential::with_shared_key(ACCOUNT_NAME, ACCOUNT_KEY),
        RequestSigner::new().with_time(signing_time()),
    );

    let mut parts = http::Request::get("https://myaccount.blob.core.windows.net/container/blob")
        .body(())
        .unwrap()
        .into_parts()
        .0;
    signer
        .sign(&mut parts, Some(Duration::from_secs(300)))
        .unwrap();

    let expected = AccountSharedAccessSignature::new(
        ACCOUNT_NAME,
        ACCOUNT_KEY,
        "2022-03-01T08:17:34Z",
    )
    .signature()
    .unwrap();

    let query = parts.uri.query().unwrap();
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("sv".to_string(), "2018-03-28".to_string()),
            ("ss".to_string(), "bqtf".to_string()),
            ("srt".to_string(), "sco".to_string()),
            ("sp".to_string(), "rwdlacu".to_string()),
            ("se".to_string(), "2022-03-01T08:17:34Z".to_string()),
            ("sig".to_string(), expected),
        ]
    );
    assert!(parts.headers.get(http::header::AUTHORIZATION).is_none());
}

#[test]
fn test_sign_with_sas_token_from_connection_string() {
    let config = Config::try_from_connection_string(
        "BlobEndpoint=https://myaccount.blob.core.windows.net;SharedAccessSignature=sv=2018-03-28&ss=b&srt=co&sp=rl&se=2017-03-24T21:14:01Z&sig=abc%3D",
        &Service::Blob,
    )
    .unwrap();
    let signer = Signer::new(config.credential().unwrap(), RequestSigner::new());

    let mut parts = http::Request::get(format!(
        "{}/container?restype=container&comp=list",
        config.endpoint.unwrap()
    ))
    .body(())
    .unwrap()
    .into_parts()
    .0;
    signer.sign(&mut parts, None).unwrap();

    assert_eq!(
        parts.uri,
        "https://myaccount.blob.core.windows.net/container?restype=container&comp=list&sv=2018-03-28&ss=b&srt=co&sp=rl&se=2017-03-24T21:14:01Z&sig=abc%3D"
    );
}
