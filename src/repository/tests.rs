//! Repository Integration Tests
//!
//! StorageManager over the in-memory and file-backed areas.

#[cfg(test)]
mod tests {
    use crate::config::StoreConfig;
    use crate::domain::{DomainError, NodeId, NodePatch, Outline, OutlineNode};
    use crate::repository::{
        FileArea, KeyValueArea, MemoryArea, OutlineRepository, StorageManager,
    };
    use serde_json::json;

    fn sample_outlines() -> Vec<Outline> {
        let mut plan = Outline::new("Plan", Some("next quarter".to_string()));
        let root = OutlineNode::new("A")
            .with_content("first")
            .with_children(vec![
                OutlineNode::new_child("A1", None, 0, 0),
                OutlineNode::new_child("A2", None, 0, 1),
            ]);
        let root_id = root.id.clone();
        plan.forest_mut().insert_node(root, None).unwrap();
        plan.forest_mut()
            .update_node(&root_id, &NodePatch::expanded(false))
            .unwrap();
        vec![plan, Outline::new("Empty", None)]
    }

    /// One outline holding a single chain of `depth` nodes
    fn deep_outline(depth: usize) -> Outline {
        let mut outline = Outline::new("Deep", None);
        let mut parent: Option<NodeId> = None;
        for level in 0..depth {
            let node = OutlineNode::new(format!("Level {}", level));
            let id = node.id.clone();
            outline
                .forest_mut()
                .insert_node(node, parent.as_ref())
                .unwrap();
            parent = Some(id);
        }
        outline
    }

    fn setup_memory() -> StorageManager<MemoryArea> {
        StorageManager::new(MemoryArea::new())
    }

    #[tokio::test]
    async fn test_load_without_data_is_empty() {
        let storage = setup_memory();
        let outlines = storage.load_outlines().await.expect("load failed");
        assert!(outlines.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let storage = setup_memory();
        let outlines = sample_outlines();

        storage.save_outlines(&outlines).await.expect("save failed");
        let loaded = storage.load_outlines().await.expect("load failed");

        assert_eq!(loaded, outlines);
    }

    #[tokio::test]
    async fn test_save_keeps_settings_key() {
        let storage = setup_memory();
        storage
            .area()
            .set("settings", json!({"theme": "dark"}))
            .await
            .unwrap();

        storage.save_outlines(&sample_outlines()).await.unwrap();

        let settings = storage.area().get("settings").await.unwrap();
        assert_eq!(settings, Some(json!({"theme": "dark"})));
    }

    #[tokio::test]
    async fn test_custom_outlines_key() {
        let config = StoreConfig {
            outlines_key: "milan_outlines".to_string(),
            ..Default::default()
        };
        let storage = StorageManager::with_config(MemoryArea::new(), &config).unwrap();

        storage.save_outlines(&sample_outlines()).await.unwrap();

        assert!(storage.area().get("milan_outlines").await.unwrap().is_some());
        assert!(storage.area().get("outlines").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_with_config_rejects_settings_key() {
        let config = StoreConfig {
            outlines_key: "settings".to_string(),
            ..Default::default()
        };
        let result = StorageManager::with_config(MemoryArea::new(), &config);
        assert!(matches!(result, Err(DomainError::InvalidConfig(_))));

        let blank = StoreConfig {
            outlines_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(StorageManager::with_config(MemoryArea::new(), &blank).is_err());
    }

    #[tokio::test]
    async fn test_unreadable_stored_outlines() {
        let storage = setup_memory();
        storage
            .area()
            .set("outlines", json!([{"broken": true}]))
            .await
            .unwrap();

        let err = storage.load_outlines().await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }

    #[tokio::test]
    async fn test_export_import_between_areas() {
        let source = setup_memory();
        source.save_outlines(&sample_outlines()).await.unwrap();
        source
            .area()
            .set("settings", json!({"autoSave": true}))
            .await
            .unwrap();
        let exported = source.export_data().await.unwrap();

        let target = setup_memory();
        target.import_data(&exported).await.expect("import failed");

        assert_eq!(
            target.load_outlines().await.unwrap(),
            source.load_outlines().await.unwrap()
        );
        assert_eq!(
            target.area().get("settings").await.unwrap(),
            Some(json!({"autoSave": true}))
        );
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_without_writing() {
        let storage = setup_memory();
        storage.save_outlines(&sample_outlines()).await.unwrap();
        let before = storage.area().get_all().await.unwrap();

        let not_json = storage.import_data("{oops").await.unwrap_err();
        let not_object = storage.import_data("[1, 2]").await.unwrap_err();
        let bad_outlines = storage
            .import_data(r#"{"settings": {}, "outlines": [{"id": 1}]}"#)
            .await
            .unwrap_err();

        assert!(not_json.to_string().contains("Invalid JSON data"));
        assert!(matches!(not_object, DomainError::MalformedImport(_)));
        assert!(matches!(bad_outlines, DomainError::MalformedImport(_)));
        assert_eq!(storage.area().get_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let storage = setup_memory();
        storage.save_outlines(&sample_outlines()).await.unwrap();

        storage.clear_all().await.unwrap();

        assert!(storage.area().get_all().await.unwrap().is_empty());
        assert!(storage.load_outlines().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_area_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        let outlines = sample_outlines();

        StorageManager::new(FileArea::new(&path))
            .save_outlines(&outlines)
            .await
            .expect("save failed");

        let reopened = StorageManager::new(FileArea::new(&path));
        assert_eq!(reopened.load_outlines().await.unwrap(), outlines);
    }

    #[tokio::test]
    async fn test_file_area_round_trips_deep_outline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        let outlines = vec![deep_outline(100)];

        StorageManager::new(FileArea::new(&path))
            .save_outlines(&outlines)
            .await
            .expect("save failed");

        let loaded = StorageManager::new(FileArea::new(&path))
            .load_outlines()
            .await
            .expect("deep outline should load");
        assert_eq!(loaded, outlines);
        let deepest = loaded[0].forest().depth_first().last().unwrap().level;
        assert_eq!(deepest, 99);
    }

    #[tokio::test]
    async fn test_deep_outline_export_import() {
        let outlines = vec![deep_outline(100)];
        let source = setup_memory();
        source.save_outlines(&outlines).await.unwrap();
        let exported = source.export_data().await.unwrap();

        let target = setup_memory();
        target.import_data(&exported).await.expect("import failed");

        assert_eq!(target.load_outlines().await.unwrap(), outlines);
    }

    #[tokio::test]
    async fn test_file_area_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let area = FileArea::new(dir.path().join("absent.json"));
        assert!(area.get_all().await.unwrap().is_empty());
        assert!(area.get("outlines").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_area_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, b"not json").unwrap();

        let err = FileArea::new(&path).get_all().await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
