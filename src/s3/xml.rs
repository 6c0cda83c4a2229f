//! Response parsing for the S3 Request Composer (§4.7): ListObjectsV2 /
//! ListBuckets bodies, and the `<Error>` body S3 returns alongside a non-2xx
//! status. All via `quick-xml`'s serde integration.

use serde::Deserialize;

use crate::error::CoreError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListBucketResult {
    #[serde(default, rename = "IsTruncated")]
    pub is_truncated: bool,
    #[serde(default, rename = "NextContinuationToken")]
    pub next_continuation_token: Option<String>,
    #[serde(default, rename = "Contents")]
    pub contents: Vec<ObjectEntry>,
    #[serde(default, rename = "CommonPrefixes")]
    pub common_prefixes: Vec<CommonPrefixEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Size")]
    pub size: u64,
    #[serde(default, rename = "LastModified")]
    pub last_modified: Option<String>,
    #[serde(default, rename = "ETag")]
    pub etag: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CommonPrefixEntry {
    #[serde(rename = "Prefix")]
    pub prefix: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets")]
    pub buckets: BucketList,
}

#[derive(Debug, Deserialize)]
pub struct BucketList {
    #[serde(default, rename = "Bucket")]
    pub bucket: Vec<BucketEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketEntry {
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message")]
    message: String,
}

pub fn parse_list_objects(body: &[u8]) -> crate::error::Result<ListBucketResult> {
    quick_xml::de::from_reader(body).map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))
}

pub fn parse_list_buckets(body: &[u8]) -> crate::error::Result<ListAllMyBucketsResult> {
    quick_xml::de::from_reader(body).map_err(|e| CoreError::IntegrityCheckFailed(e.to_string()))
}

/// Maps a non-2xx S3 response to a typed [`CoreError`] (§4.7, §7). Falls
/// back to a generic `RequestFailed` when the body isn't parseable XML —
/// S3 itself does this for some 5xx responses (e.g. from a load balancer).
///
/// `key` is the object key the request named, if any (absent for
/// bucket-level and account-level requests); `NoSuchKey`/`AccessDenied`
/// name it instead of `bucket` when present, so a 404 on a missing object
/// reports the object, not the bucket it lives in.
pub fn map_error_response(status: u16, body: &[u8], bucket: Option<&str>, key: Option<&str>) -> CoreError {
    let parsed: Option<ErrorBody> = quick_xml::de::from_reader(body).ok();

    let code = parsed.as_ref().map(|e| e.code.as_str());
    match code {
        Some("NoSuchBucket") => CoreError::BucketNotFound(bucket.unwrap_or_default().to_string()),
        Some("NoSuchKey") => CoreError::ObjectNotFound(key.or(bucket).unwrap_or_default().to_string()),
        Some("BucketNotEmpty") => CoreError::BucketNotEmpty(bucket.unwrap_or_default().to_string()),
        Some("AccessDenied") => CoreError::AccessDenied { resource: key.or(bucket).map(str::to_string) },
        Some("SignatureDoesNotMatch" | "InvalidAccessKeyId" | "ExpiredToken") => CoreError::AuthenticationFailed,
        _ => CoreError::RequestFailed {
            status,
            code: parsed.as_ref().map(|e| e.code.clone()),
            message: parsed.map(|e| e.message).or_else(|| {
                let text = String::from_utf8_lossy(body);
                (!text.trim().is_empty()).then(|| text.into_owned())
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_objects_with_pagination_token() {
        let body = br#"<?xml version="1.0"?>
<ListBucketResult>
  <IsTruncated>true</IsTruncated>
  <NextContinuationToken>abc123</NextContinuationToken>
  <Contents><Key>a.txt</Key><Size>10</Size></Contents>
  <Contents><Key>b.txt</Key><Size>20</Size></Contents>
  <CommonPrefixes><Prefix>logs/</Prefix></CommonPrefixes>
</ListBucketResult>"#;
        let parsed = parse_list_objects(body).unwrap();
        assert!(parsed.is_truncated);
        assert_eq!(parsed.next_continuation_token.as_deref(), Some("abc123"));
        assert_eq!(parsed.contents.len(), 2);
        assert_eq!(parsed.contents[0].key, "a.txt");
        assert_eq!(parsed.common_prefixes[0].prefix, "logs/");
    }

    #[test]
    fn parses_list_buckets() {
        let body = br#"<?xml version="1.0"?>
<ListAllMyBucketsResult>
  <Buckets>
    <Bucket><Name>one</Name></Bucket>
    <Bucket><Name>two</Name></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;
        let parsed = parse_list_buckets(body).unwrap();
        assert_eq!(parsed.buckets.bucket.len(), 2);
        assert_eq!(parsed.buckets.bucket[1].name, "two");
    }

    #[test]
    fn maps_no_such_bucket_error() {
        let body = br#"<Error><Code>NoSuchBucket</Code><Message>no such bucket</Message></Error>"#;
        let err = map_error_response(404, body, Some("missing-bucket"), None);
        assert!(matches!(err, CoreError::BucketNotFound(name) if name == "missing-bucket"));
    }

    #[test]
    fn maps_no_such_key_error_to_the_object_key_not_the_bucket() {
        let body = br#"<Error><Code>NoSuchKey</Code><Message>no such key</Message></Error>"#;
        let err = map_error_response(404, body, Some("my-bucket"), Some("path/to/object.txt"));
        assert!(matches!(err, CoreError::ObjectNotFound(name) if name == "path/to/object.txt"));
    }

    #[test]
    fn unrecognized_code_falls_back_to_request_failed() {
        let body = br#"<Error><Code>InternalError</Code><Message>oops</Message></Error>"#;
        let err = map_error_response(500, body, None, None);
        assert!(matches!(err, CoreError::RequestFailed { status: 500, .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn unparseable_body_still_produces_request_failed() {
        let err = map_error_response(503, b"not xml at all", None, None);
        assert!(matches!(err, CoreError::RequestFailed { status: 503, .. }));
    }
}
