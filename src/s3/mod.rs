//! S3 Request Composer (component C7 of the specification).
//!
//! Speaks virtual-hosted-style S3 over `reqwest`: every request's path is
//! `/{key}` against a `{bucket}.{host}` authority, signed with [`crate::sigv4`].
//! Uploads and downloads move through [`crate::codec::ByteSource`] so the
//! caller's encrypt/decrypt pipeline attaches directly to the HTTP body
//! without ever materializing the whole object in memory.

mod xml;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;

use crate::codec::ByteSource;
use crate::config::{DOWNLOAD_TTFB_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS, UPLOAD_TIMEOUT_FLOOR_SECS, UPLOAD_TIMEOUT_SECS_PER_MIB};
use crate::error::{CoreError, Result};
use crate::session::EffectiveSettings;
use crate::sigv4::{self, SigningInput};

const LIST_PAGE_SIZE: u32 = 1000;

pub struct S3Client {
    http: reqwest::Client,
    settings: EffectiveSettings,
}

/// One page of [`S3Client::list_objects`]: matched objects plus, when a
/// delimiter was given, "directory-like" common prefixes folded in as
/// `is_directory=true, size=0` entries (§4.7), and a continuation token
/// when more pages remain.
pub struct ObjectPage {
    pub objects: Vec<ObjectSummary>,
    pub next_token: Option<String>,
}

pub struct ObjectSummary {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
    pub is_directory: bool,
}

impl S3Client {
    /// Builds a client for `settings`. A real keychain/vault is already
    /// resolved by this point (§4.5); this constructor does no I/O.
    pub fn new(settings: EffectiveSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::RequestFailed { status: 0, code: None, message: Some(e.to_string()) })?;
        Ok(Self { http, settings })
    }

    fn scheme(&self) -> &'static str {
        if self.settings.endpoint.use_ssl {
            "https"
        } else {
            "http"
        }
    }

    fn authority(&self, bucket: &str) -> (String, String) {
        let endpoint = &self.settings.endpoint;
        let default_port = if endpoint.use_ssl { 443 } else { 80 };
        let host_header =
            if endpoint.port == default_port { format!("{bucket}.{}", endpoint.host) } else { format!("{bucket}.{}:{}", endpoint.host, endpoint.port) };
        let base_url = format!("{}://{host_header}", self.scheme());
        (base_url, host_header)
    }

    fn amz_date() -> String {
        Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
    }

    #[allow(clippy::too_many_arguments)]
    async fn send(
        &self,
        method: reqwest::Method,
        bucket: &str,
        key: &str,
        query_pairs: &[(&str, &str)],
        extra_headers: &[(&str, String)],
        payload_hash: &str,
        body: Option<reqwest::Body>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::Response> {
        let (base_url, host_header) = self.authority(bucket);
        let canonical_uri = format!("/{key}");
        let amz_date = Self::amz_date();

        let mut header_pairs: Vec<(&str, &str)> =
            vec![("host", host_header.as_str()), ("x-amz-date", &amz_date), ("x-amz-content-sha256", payload_hash)];
        for (name, value) in extra_headers {
            header_pairs.push((name.as_str(), value.as_str()));
        }

        let signing_input = SigningInput {
            method: method.as_str(),
            canonical_uri: &canonical_uri,
            query_pairs,
            headers: &header_pairs,
            payload_hash,
            region: &self.settings.region,
            service: "s3",
            access_key: &self.settings.access_key,
            secret_key: &self.settings.secret_key,
            amz_date: &amz_date,
        };
        let authorization = sigv4::sign(&signing_input);

        let mut url = format!("{base_url}{canonical_uri}");
        if !query_pairs.is_empty() {
            let qs: Vec<String> = query_pairs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            url.push('?');
            url.push_str(&qs.join("&"));
        }

        let mut request = self
            .http
            .request(method, &url)
            .header("host", host_header)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("authorization", authorization);
        for (name, value) in extra_headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(d) = timeout {
            request = request.timeout(d);
        }

        let response = request.send().await.map_err(|e| CoreError::RequestFailed {
            status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            code: None,
            message: Some(e.to_string()),
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body_bytes = response.bytes().await.unwrap_or_default();
        let key = (!key.is_empty()).then_some(key);
        Err(xml::map_error_response(status, &body_bytes, Some(bucket), key))
    }

    /// Lists every bucket visible to the active credentials.
    pub async fn list_buckets(&self) -> Result<Vec<String>> {
        let (base_url, host_header) = (format!("{}://{}", self.scheme(), self.settings.endpoint.host), self.settings.endpoint.host.clone());
        let amz_date = Self::amz_date();
        let payload_hash = sigv4::hash_payload(b"");
        let headers = [("host", host_header.as_str()), ("x-amz-date", &amz_date), ("x-amz-content-sha256", &payload_hash)];
        let signing_input = SigningInput {
            method: "GET",
            canonical_uri: "/",
            query_pairs: &[],
            headers: &headers,
            payload_hash: &payload_hash,
            region: &self.settings.region,
            service: "s3",
            access_key: &self.settings.access_key,
            secret_key: &self.settings.secret_key,
            amz_date: &amz_date,
        };
        let authorization = sigv4::sign(&signing_input);

        let response = self
            .http
            .get(&base_url)
            .header("host", host_header)
            .header("x-amz-date", amz_date)
            .header("x-amz-content-sha256", payload_hash)
            .header("authorization", authorization)
            .send()
            .await
            .map_err(|e| CoreError::RequestFailed { status: 0, code: None, message: Some(e.to_string()) })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.bytes().await.unwrap_or_default();
            return Err(xml::map_error_response(status, &body, None, None));
        }

        let body = response.bytes().await.map_err(|e| CoreError::RequestFailed { status: 0, code: None, message: Some(e.to_string()) })?;
        let parsed = xml::parse_list_buckets(&body)?;
        Ok(parsed.buckets.bucket.into_iter().map(|b| b.name).collect())
    }

    /// Lists one page of objects under `prefix`, grouped by `/` when
    /// `delimiter` is set. Pass the previous page's `next_token` back in to
    /// continue (§4.7's ListObjectsV2 pagination).
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: Option<&str>,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage> {
        let max_keys = LIST_PAGE_SIZE.to_string();
        let mut query_pairs: Vec<(&str, &str)> = vec![("list-type", "2"), ("max-keys", &max_keys)];
        if !prefix.is_empty() {
            query_pairs.push(("prefix", prefix));
        }
        if let Some(d) = delimiter {
            query_pairs.push(("delimiter", d));
        }
        if let Some(token) = continuation_token {
            query_pairs.push(("continuation-token", token));
        }

        let payload_hash = sigv4::hash_payload(b"");
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let response =
            self.send(reqwest::Method::GET, bucket, "", &query_pairs, &[], &payload_hash, None, Some(timeout)).await?;
        let body = response.bytes().await.map_err(|e| CoreError::RequestFailed { status: 0, code: None, message: Some(e.to_string()) })?;
        let parsed = xml::parse_list_objects(&body)?;

        let mut objects: Vec<ObjectSummary> = parsed
            .contents
            .into_iter()
            .map(|c| ObjectSummary { key: c.key, size: c.size, last_modified: c.last_modified, etag: c.etag, is_directory: false })
            .collect();

        let mut common_prefixes: Vec<String> = parsed.common_prefixes.into_iter().map(|p| p.prefix).collect();
        common_prefixes.sort();
        common_prefixes.dedup();
        objects.extend(common_prefixes.into_iter().map(|prefix| ObjectSummary {
            key: prefix,
            size: 0,
            last_modified: None,
            etag: None,
            is_directory: true,
        }));

        Ok(ObjectPage { objects, next_token: if parsed.is_truncated { parsed.next_continuation_token } else { None } })
    }

    /// The ciphertext length of a stored object, via a HEAD request.
    /// `None` on a 404 (§4.7's `head_object_size`); a 403 propagates as
    /// `AccessDenied` rather than being folded into the `None` case.
    pub async fn head_object_size(&self, bucket: &str, key: &str) -> Result<Option<u64>> {
        let payload_hash = sigv4::hash_payload(b"");
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        let response = match self.send(reqwest::Method::HEAD, bucket, key, &[], &[], &payload_hash, None, Some(timeout)).await {
            Ok(response) => response,
            Err(CoreError::RequestFailed { status: 404, .. }) | Err(CoreError::ObjectNotFound(_)) => return Ok(None),
            Err(CoreError::RequestFailed { status: 403, .. }) => {
                return Err(CoreError::AccessDenied { resource: Some(key.to_string()) })
            }
            Err(e) => return Err(e),
        };
        let size = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| CoreError::IntegrityCheckFailed("response had no Content-Length header".into()))?;
        Ok(Some(size))
    }

    /// Streams an object's ciphertext body as a [`ByteSource`], ready to
    /// feed into [`crate::codec::decoder::ChunkDecoder`].
    pub async fn get_object_stream(&self, bucket: &str, key: &str) -> Result<ResponseByteSource> {
        let payload_hash = sigv4::hash_payload(b"");
        let response = self.send(reqwest::Method::GET, bucket, key, &[], &[], &payload_hash, None, None).await?;
        Ok(ResponseByteSource { response, ttfb_deadline: Duration::from_secs(DOWNLOAD_TTFB_TIMEOUT_SECS) })
    }

    /// Uploads `source`'s bytes as the object body. `content_length` must be
    /// the exact ciphertext length (§3's length law via
    /// [`crate::codec::ciphertext_length_for`]); S3 rejects a mismatched
    /// `Content-Length`. The request timeout scales with the payload size
    /// (§5's timeout policy) rather than using the flat request timeout.
    pub async fn put_object_stream(
        &self,
        bucket: &str,
        key: &str,
        source: impl ByteSource + 'static,
        content_length: u64,
    ) -> Result<()> {
        let timeout_secs =
            UPLOAD_TIMEOUT_FLOOR_SECS.max((content_length / (1024 * 1024)) * UPLOAD_TIMEOUT_SECS_PER_MIB);
        let body = byte_source_to_body(source);
        let headers =
            [("content-length", content_length.to_string()), ("content-type", "application/octet-stream".to_string())];
        self.send(
            reqwest::Method::PUT,
            bucket,
            key,
            &[],
            &headers,
            sigv4::UNSIGNED_PAYLOAD,
            Some(body),
            Some(Duration::from_secs(timeout_secs)),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let payload_hash = sigv4::hash_payload(b"");
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        self.send(reqwest::Method::DELETE, bucket, key, &[], &[], &payload_hash, None, Some(timeout)).await?;
        Ok(())
    }

    /// Creates `bucket`. When the active region is not `us-east-1`, S3
    /// requires a `CreateBucketConfiguration` body naming the region (§4.7);
    /// `us-east-1` is the one region that rejects a body on this call.
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        validate_bucket_name(bucket)?;
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);

        if self.settings.region == "us-east-1" {
            let payload_hash = sigv4::hash_payload(b"");
            self.send(reqwest::Method::PUT, bucket, "", &[], &[], &payload_hash, None, Some(timeout)).await?;
        } else {
            let body = format!(
                "<CreateBucketConfiguration xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\"><LocationConstraint>{}</LocationConstraint></CreateBucketConfiguration>",
                self.settings.region
            );
            let payload_hash = sigv4::hash_payload(body.as_bytes());
            self.send(
                reqwest::Method::PUT,
                bucket,
                "",
                &[],
                &[],
                &payload_hash,
                Some(reqwest::Body::from(body)),
                Some(timeout),
            )
            .await?;
        }
        Ok(())
    }

    pub async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let payload_hash = sigv4::hash_payload(b"");
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        self.send(reqwest::Method::DELETE, bucket, "", &[], &[], &payload_hash, None, Some(timeout)).await?;
        Ok(())
    }

    /// Server-side copy within the same account, via the `x-amz-copy-source`
    /// header. Used for in-place rename/move without a client round-trip.
    pub async fn copy_object(&self, src_bucket: &str, src_key: &str, dst_bucket: &str, dst_key: &str) -> Result<()> {
        let copy_source = format!("/{src_bucket}/{src_key}");
        let payload_hash = sigv4::hash_payload(b"");
        let headers = [("x-amz-copy-source", copy_source)];
        let timeout = Duration::from_secs(REQUEST_TIMEOUT_SECS);
        self.send(reqwest::Method::PUT, dst_bucket, dst_key, &[], &headers, &payload_hash, None, Some(timeout)).await?;
        Ok(())
    }
}

/// Adapts an in-flight [`reqwest::Response`] into a [`ByteSource`] of
/// ciphertext chunks, for handing straight to [`crate::codec::decoder::ChunkDecoder`].
pub struct ResponseByteSource {
    response: reqwest::Response,
    ttfb_deadline: Duration,
}

#[async_trait]
impl ByteSource for ResponseByteSource {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        tokio::time::timeout(self.ttfb_deadline, self.response.chunk())
            .await
            .map_err(|_| CoreError::RequestFailed { status: 0, code: None, message: Some("timed out waiting for response body".into()) })?
            .map_err(|e| CoreError::RequestFailed { status: 0, code: None, message: Some(e.to_string()) })
    }
}

fn byte_source_to_body(source: impl ByteSource + 'static) -> reqwest::Body {
    let stream = futures_util::stream::unfold(source, |mut source| async move {
        match source.next_chunk().await {
            Ok(Some(bytes)) => Some((Ok(bytes), source)),
            Ok(None) => None,
            Err(e) => Some((Err(e), source)),
        }
    });
    reqwest::Body::wrap_stream(stream)
}

/// Validates a bucket name against S3's DNS-compatible naming rules (§4.7).
fn validate_bucket_name(bucket: &str) -> Result<()> {
    let len_ok = (3..=63).contains(&bucket.len());
    let chars_ok = bucket.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let edges_ok = !bucket.starts_with('-') && !bucket.ends_with('-') && !bucket.starts_with('.') && !bucket.ends_with('.');
    if len_ok && chars_ok && edges_ok {
        Ok(())
    } else {
        Err(CoreError::InvalidBucketName(bucket.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_bucket_names() {
        assert!(validate_bucket_name("my-bucket.01").is_ok());
    }

    #[test]
    fn rejects_too_short_name() {
        assert!(matches!(validate_bucket_name("ab"), Err(CoreError::InvalidBucketName(_))));
    }

    #[test]
    fn rejects_uppercase() {
        assert!(matches!(validate_bucket_name("MyBucket"), Err(CoreError::InvalidBucketName(_))));
    }

    #[test]
    fn rejects_leading_hyphen() {
        assert!(matches!(validate_bucket_name("-bucket"), Err(CoreError::InvalidBucketName(_))));
    }
}
