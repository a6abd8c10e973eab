use std::env;

use anyhow::Result;
use http::StatusCode;
use log::{debug, warn};
use reqlist_azure_blob::{BlobServiceClient, Config, ListBlobsRequest};
use reqlist_core::{Context, ErrorKind, OsEnv, RequestOptions};
use reqlist_http_send_reqwest::ReqwestHttpSend;

fn init_client() -> Option<BlobServiceClient> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("REQLIST_AZURE_BLOB_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config::default()
        .from_env(&ctx)
        .expect("config must be loaded from env");

    Some(BlobServiceClient::new(ctx, config).expect("client must be created"))
}

#[tokio::test]
async fn test_live_list_blobs() -> Result<()> {
    let Some(client) = init_client() else {
        warn!("REQLIST_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    let container = env::var("REQLIST_AZURE_BLOB_CONTAINER")
        .expect("env REQLIST_AZURE_BLOB_CONTAINER must set");
    let lister = client
        .container_client(container)
        .list_blobs(ListBlobsRequest::new().with_max_results(2))?;

    let mut pager = lister.pager(RequestOptions::default());
    let mut pages = 0;
    while let Some(page) = pager.next_page().await? {
        assert!(page.results().len() <= 2);
        pages += 1;
    }
    debug!("listed {pages} pages");

    Ok(())
}

#[tokio::test]
async fn test_live_missing_container() -> Result<()> {
    let Some(client) = init_client() else {
        warn!("REQLIST_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };

    let err = client
        .container_client("reqlist-container-does-not-exist")
        .list_blobs_segmented(None, &ListBlobsRequest::new(), &RequestOptions::default())
        .await
        .expect_err("listing a missing container must fail");

    debug!("got error: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.service_code(), Some("ContainerNotFound"));

    Ok(())
}
