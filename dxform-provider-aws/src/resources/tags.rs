//! Tag reconciliation

use crate::api::Tags;
use crate::client::AwsClient;
use crate::error::Result;

/// Bring the tags on `arn` from `old` to `new` with at most one untag and one tag call
pub async fn update_tags(client: &AwsClient, arn: &str, old: &Tags, new: &Tags) -> Result<()> {
    let mut removed: Vec<String> = old
        .keys()
        .filter(|k| !new.contains_key(*k))
        .cloned()
        .collect();
    removed.sort();

    let changed: Tags = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    if !removed.is_empty() {
        log::debug!("untagging {}: {:?}", arn, removed);
        client.dxconn.untag_resource(arn, removed).await?;
    }
    if !changed.is_empty() {
        log::debug!("tagging {} with {} tag(s)", arn, changed.len());
        client.dxconn.tag_resource(arn, changed).await?;
    }
    Ok(())
}
