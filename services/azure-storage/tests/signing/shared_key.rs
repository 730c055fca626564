use azsign_azure_storage::canonical::{string_to_sign, CanonicalizationMode};
use azsign_azure_storage::shared_key::authorization;
use azsign_azure_storage::{Credential, RequestSigner, Service};
use azsign_core::{SigningRequest, Signer};
use http::header::AUTHORIZATION;
use http::request::Parts;
use pretty_assertions::assert_eq;

use crate::{init_logger, signing_time, ACCOUNT_KEY, ACCOUNT_NAME};

fn sign(parts: &mut Parts, service: Service) -> String {
    init_logger();

    let signer = Signer::new(
        Credential::with_shared_key(ACCOUNT_NAME, ACCOUNT_KEY),
        RequestSigner::new()
            .with_service(service)
            .with_time(signing_time()),
    );
    signer.sign(parts, None).unwrap();

    parts
        .headers
        .get(AUTHORIZATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

#[test]
fn test_list_blobs_with_date_header() {
    let mut parts = http::Request::get(
        "https://myaccount.blob.core.windows.net/mycontainer?restype=container&comp=list",
    )
    .header("date", "Fri, 26 Jun 2015 23:39:12 GMT")
    .header("x-ms-version", "2015-02-21")
    .body(())
    .unwrap()
    .into_parts()
    .0;

    assert_eq!(
        sign(&mut parts, Service::Blob),
        "SharedKey myaccount:0EhqvaPQ5tC/3+IEXa22ggXxqGXELh+3UKn9ZU0DMC0="
    );
    assert_eq!(
        parts.headers.get("x-ms-date").unwrap(),
        "Tue, 01 Mar 2022 08:12:34 GMT"
    );
}

#[test]
fn test_put_blob_with_metadata() {
    let mut parts = http::Request::put(
        "https://myaccount.blob.core.windows.net/mycontainer/my%20blob.txt?timeout=30",
    )
    .header("content-length", "11")
    .header("content-type", "text/plain")
    .header("x-ms-blob-type", "BlockBlob")
    .header("X-MS-Meta-Tag", "  a   b ")
    .header("x-ms-version", "2021-12-02")
    .body(())
    .unwrap()
    .into_parts()
    .0;

    assert_eq!(
        sign(&mut parts, Service::Blob),
        "SharedKey myaccount:3kXJ/9dzujpRsKL07+lTI3JkcPuFsnuAVleyHKUSWl8="
    );
    assert_eq!(
        parts.uri,
        "https://myaccount.blob.core.windows.net/mycontainer/my%20blob.txt?timeout=30"
    );
}

#[test]
fn test_delete_messages_with_zero_content_length() {
    let mut parts = http::Request::delete(
        "https://myaccount.queue.core.windows.net/myqueue/messages?NumOfMessages=5",
    )
    .header("content-length", "0")
    .header("x-ms-version", "2021-12-02")
    .body(())
    .unwrap()
    .into_parts()
    .0;

    assert_eq!(
        sign(&mut parts, Service::Queue),
        "SharedKey myaccount:gQG8aHDL2odClYWXG7GI+yJ+e3ffVERJwgrpqLqbHwg="
    );
}

#[test]
fn test_table_shared_key_lite() {
    let mut parts = http::Request::get(
        "https://myaccount.table.core.windows.net/mytable?comp=acl&timeout=30",
    )
    .header("x-ms-version", "2021-12-02")
    .body(())
    .unwrap()
    .into_parts()
    .0;

    assert_eq!(
        sign(&mut parts, Service::Table),
        "SharedKeyLite myaccount:OfIwTpTg2wUZuz4v+2CwIZPHMQ4S6RuRjuY0Yc6eaco="
    );
}

#[test]
fn test_authorization_matches_request_signer() {
    let (mut parts, _) = http::Request::get(
        "https://myaccount.blob.core.windows.net/mycontainer?restype=container&comp=list",
    )
    .header("date", "Fri, 26 Jun 2015 23:39:12 GMT")
    .header("x-ms-date", "Tue, 01 Mar 2022 08:12:34 GMT")
    .header("x-ms-version", "2015-02-21")
    .body(())
    .unwrap()
    .into_parts();
    let req = SigningRequest::build(&mut parts).unwrap();

    assert_eq!(
        string_to_sign(&req, ACCOUNT_NAME, CanonicalizationMode::Generic).unwrap(),
        "GET\n\n\n\n\n\nFri, 26 Jun 2015 23:39:12 GMT\n\n\n\n\n\nx-ms-date:Tue, 01 Mar 2022 08:12:34 GMT\nx-ms-version:2015-02-21\n/myaccount/mycontainer\ncomp:list\nrestype:container"
    );
    assert_eq!(
        authorization(
            CanonicalizationMode::Generic,
            &req,
            ACCOUNT_NAME,
            ACCOUNT_KEY
        )
        .unwrap(),
        "SharedKey myaccount:0EhqvaPQ5tC/3+IEXa22ggXxqGXELh+3UKn9ZU0DMC0="
    );
}

#[test]
fn test_invalid_credential_is_rejected() {
    let mut parts = http::Request::get("https://myaccount.blob.core.windows.net/mycontainer")
        .body(())
        .unwrap()
        .into_parts()
        .0;

    let signer = Signer::new(
        Credential::with_shared_key(ACCOUNT_NAME, ""),
        RequestSigner::new(),
    );
    let err = signer.sign(&mut parts, None).unwrap_err();
    assert!(err.is_credential_error());
}
