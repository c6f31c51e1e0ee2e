use std::sync::Arc;

use aws_sdk_s3::{
    error::{DisplayErrorContext, SdkError},
    operation::get_object::GetObjectError,
    primitives::ByteStream,
    Client as S3Client,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use super::DocumentBackend;
use crate::{GalleryStorageError, GalleryStorageResult};

const REVISION_SUFFIX: &str = ".json";

/// How the gallery document is laid out in the bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentLayout {
    /// A single object overwritten in place
    FixedKey {
        /// Object key of the document
        key: String,
    },
    /// One object per save, named `{prefix}{millis}.json`, pruned to the newest `retain`
    Rotated {
        /// Key prefix shared by every revision
        prefix: String,
        /// Number of revisions kept after each save
        retain: usize,
    },
}

/// Gallery document stored in an S3 bucket
pub struct S3DocumentBackend {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    layout: DocumentLayout,
}

impl S3DocumentBackend {
    /// Creates a new S3 document backend
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket holding the document
    /// * `layout` - Fixed key or rotated revisions
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, layout: DocumentLayout) -> Self {
        Self {
            s3_client,
            bucket_name,
            layout,
        }
    }

    async fn get(&self, key: &str) -> GalleryStorageResult<Option<Vec<u8>>> {
        let result = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let body = output.body.collect().await.map_err(|e| {
                    GalleryStorageError::ReadError(format!("Failed to read body of {key}: {e}"))
                })?;
                Ok(Some(body.into_bytes().to_vec()))
            }
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
            {
                debug!("No gallery document at s3://{}/{key}", self.bucket_name);
                Ok(None)
            }
            Err(e) => Err(GalleryStorageError::ReadError(format!(
                "Failed to get {key}: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn put(&self, key: &str, document: Vec<u8>) -> GalleryStorageResult<()> {
        self.s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type("application/json")
            .body(ByteStream::from(document))
            .send()
            .await
            .map_err(|e| {
                GalleryStorageError::WriteError(format!(
                    "Failed to put {key}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("Saved gallery document to s3://{}/{key}", self.bucket_name);
        Ok(())
    }

    /// Lists revision keys under `prefix`, oldest first
    async fn list_revisions(&self, prefix: &str) -> GalleryStorageResult<Vec<String>> {
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .prefix(prefix)
            .into_paginator()
            .send();

        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                GalleryStorageError::ReadError(format!(
                    "Failed to list {prefix}*: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key())
                    .filter(|key| is_revision_key(prefix, key))
                    .map(ToString::to_string),
            );
        }

        keys.sort_by_key(|key| revision_millis(prefix, key));
        Ok(keys)
    }

    async fn prune(&self, revisions: &[String], retain: usize) {
        for key in revisions_to_prune(revisions, retain) {
            match self
                .s3_client
                .delete_object()
                .bucket(&self.bucket_name)
                .key(key)
                .send()
                .await
            {
                Ok(_) => info!("Pruned gallery revision {key}"),
                Err(e) => warn!(
                    "Failed to prune gallery revision {key}: {}",
                    DisplayErrorContext(&e)
                ),
            }
        }
    }
}

#[async_trait::async_trait]
impl DocumentBackend for S3DocumentBackend {
    async fn load(&self) -> GalleryStorageResult<Option<Vec<u8>>> {
        match &self.layout {
            DocumentLayout::FixedKey { key } => self.get(key).await,
            DocumentLayout::Rotated { prefix, .. } => {
                let revisions = self.list_revisions(prefix).await?;
                let Some(latest) = revisions.last() else {
                    return Ok(None);
                };
                listed_revision(latest, self.get(latest).await?).map(Some)
            }
        }
    }

    async fn save(&self, document: Vec<u8>) -> GalleryStorageResult<()> {
        match &self.layout {
            DocumentLayout::FixedKey { key } => self.put(key, document).await,
            DocumentLayout::Rotated { prefix, retain } => {
                let mut revisions = self.list_revisions(prefix).await.map_err(|e| {
                    GalleryStorageError::WriteError(format!("Cannot name next revision: {e}"))
                })?;
                let key = next_revision_key(
                    prefix,
                    Utc::now().timestamp_millis(),
                    revisions.last().map(String::as_str),
                )
                .ok_or_else(|| {
                    GalleryStorageError::WriteError(format!(
                        "No revision key left after {prefix}{}",
                        i64::MAX
                    ))
                })?;

                self.put(&key, document).await?;

                revisions.push(key);
                self.prune(&revisions, *retain).await;
                Ok(())
            }
        }
    }

    fn describe(&self) -> String {
        match &self.layout {
            DocumentLayout::FixedKey { key } => format!("s3://{}/{key}", self.bucket_name),
            DocumentLayout::Rotated { prefix, retain } => {
                format!("s3://{}/{prefix}* (keeping {retain})", self.bucket_name)
            }
        }
    }
}

fn revision_key(prefix: &str, millis: i64) -> String {
    format!("{prefix}{millis:013}{REVISION_SUFFIX}")
}

fn revision_millis(prefix: &str, key: &str) -> Option<i64> {
    let stamp = key.strip_prefix(prefix)?.strip_suffix(REVISION_SUFFIX)?;
    if stamp.is_empty() || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stamp.parse().ok()
}

fn is_revision_key(prefix: &str, key: &str) -> bool {
    revision_millis(prefix, key).is_some()
}

/// Picks a key strictly newer than `latest`, even if the clock went backwards
///
/// `None` when `latest` is already stamped `i64::MAX`.
fn next_revision_key(prefix: &str, now_millis: i64, latest: Option<&str>) -> Option<String> {
    let floor = match latest.and_then(|key| revision_millis(prefix, key)) {
        Some(millis) => millis.checked_add(1)?,
        None => 0,
    };
    Some(revision_key(prefix, now_millis.max(floor)))
}

/// Body of a revision that was just listed
///
/// A listed revision that is gone was pruned by another writer. Reporting it as missing would let
/// the next mutation start over from the default collection.
fn listed_revision(key: &str, body: Option<Vec<u8>>) -> GalleryStorageResult<Vec<u8>> {
    body.ok_or_else(|| {
        GalleryStorageError::ReadError(format!("Revision {key} disappeared after listing"))
    })
}

/// Revisions to delete so that only the newest `retain` remain; expects oldest first
fn revisions_to_prune(revisions: &[String], retain: usize) -> &[String] {
    let retain = retain.max(1);
    &revisions[..revisions.len().saturating_sub(retain)]
}
