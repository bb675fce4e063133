//! Internal provider endpoint calls.
//!
//! This module wraps the three tempmail.plus endpoints with proper error handling.

use crate::config::TempMailConfig;
use crate::error::{Error, Result};
use crate::parser::{DeleteResponse, MailDetail, MailList};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Lists the newest mails of the mailbox.
#[instrument(
    name = "session::list_mails",
    skip_all,
    fields(address = %config.address(), limit = config.list_limit)
)]
pub(crate) async fn list_mails(http: &Client, config: &TempMailConfig) -> Result<MailList> {
    let url = config.mails_url()?;
    let limit = config.list_limit.to_string();

    let request = http.get(url).query(&[
        ("email", config.address()),
        ("limit", limit.as_str()),
        ("epin", config.epin()),
    ]);

    let list: MailList = send_json(request, "mails", config).await?;

    debug!(
        result = list.result,
        first_id = ?list.first_id,
        count = list.mail_list.len(),
        "Retrieved mail list"
    );

    Ok(list)
}

/// Fetches one mail with its bodies.
#[instrument(
    name = "session::fetch_mail",
    skip(http, config),
    fields(address = %config.address())
)]
pub(crate) async fn fetch_mail(
    http: &Client,
    config: &TempMailConfig,
    mail_id: u64,
) -> Result<MailDetail> {
    let url = config.mail_url(mail_id)?;

    let request = http
        .get(url)
        .query(&[("email", config.address()), ("epin", config.epin())]);

    let detail: MailDetail = send_json(request, "mails/{id}", config).await?;

    debug!(
        result = detail.result,
        subject = %detail.subject,
        "Retrieved mail"
    );

    Ok(detail)
}

/// Deletes mails up to and including `first_id`.
///
/// Returns the provider's `result` flag.
#[instrument(
    name = "session::delete_mail",
    skip(http, config),
    fields(address = %config.address())
)]
pub(crate) async fn delete_mail(
    http: &Client,
    config: &TempMailConfig,
    first_id: u64,
) -> Result<bool> {
    let url = config.delete_url()?;
    let first_id = first_id.to_string();

    let request = http.delete(url).form(&[
        ("email", config.address()),
        ("first_id", first_id.as_str()),
        ("epin", config.epin()),
    ]);

    let response: DeleteResponse = send_json(request, "mails/", config).await?;

    debug!(result = response.result, "Delete request answered");

    Ok(response.result)
}

/// Sends `request` and decodes a JSON body of type `T`.
///
/// `endpoint` is a short label used in errors; full URLs carry the epin.
async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    endpoint: &str,
    config: &TempMailConfig,
) -> Result<T> {
    let request_error = |source: reqwest::Error| {
        if source.is_timeout() {
            Error::RequestTimeout {
                endpoint: endpoint.to_string(),
                timeout: fired_timeout(source.is_connect(), config),
            }
        } else {
            Error::Request {
                endpoint: endpoint.to_string(),
                source: source.without_url(),
            }
        }
    };

    let response = request.send().await.map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(request_error)?;

    serde_json::from_str(&body).map_err(|source| Error::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

/// The configured timeout matching a timed-out request.
fn fired_timeout(during_connect: bool, config: &TempMailConfig) -> Duration {
    if during_connect {
        config.timeouts.connect
    } else {
        config.timeouts.request
    }
}
