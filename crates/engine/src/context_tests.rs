// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automaker_core::FeatureId;

#[tokio::test]
async fn append_creates_parent_dirs_and_accumulates_lines() {
    let dir = tempfile::tempdir().unwrap();
    let feature_id = FeatureId::new("feature-1");
    let writer = ContextWriter::open(dir.path(), &feature_id).await.unwrap();

    writer.append("## planning").await.unwrap();
    writer.append("doing the thing").await.unwrap();

    let contents = tokio::fs::read_to_string(ContextWriter::path_for(dir.path(), &feature_id))
        .await
        .unwrap();
    assert_eq!(contents, "## planning\ndoing the thing\n");
}
