//! Local item store.
//!
//! Keeps the whole item list as one JSON value under [`ITEMS_KEY`] in a
//! [`KeyValueStore`]. Every read and write replaces the whole value. Ids come
//! from the client clock (epoch milliseconds) and are bumped past the largest
//! numeric id already stored, so two items created in the same millisecond
//! still get distinct ids.

use chrono::Utc;
use std::collections::HashSet;
use std::path::Path;

use super::kv::KeyValueStore;
use super::traits::{ItemStore, SyncMode};
use crate::models::{Draft, Item, ItemId};
use crate::{Error, Result};

/// Key holding the serialized item list.
pub const ITEMS_KEY: &str = "lostFoundItems";

/// Item store backed by a local key-value file.
#[derive(Debug, Clone)]
pub struct LocalStore {
    kv: KeyValueStore,
}

impl LocalStore {
    /// Creates a local store on top of an opened key-value store.
    #[must_use]
    pub const fn new(kv: KeyValueStore) -> Self {
        Self { kv }
    }

    /// Opens the local store in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(KeyValueStore::open(data_dir)?))
    }

    /// Returns the underlying key-value store.
    #[must_use]
    pub const fn kv(&self) -> &KeyValueStore {
        &self.kv
    }

    async fn load(&self) -> Result<Vec<Item>> {
        let Some(json) = self.kv.get(ITEMS_KEY).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&json).map_err(|e| Error::OperationFailed {
            operation: "deserialize_items".to_string(),
            cause: e.to_string(),
        })
    }

    async fn save(&self, items: &[Item]) -> Result<()> {
        let json = serde_json::to_string(items).map_err(|e| Error::OperationFailed {
            operation: "serialize_items".to_string(),
            cause: e.to_string(),
        })?;
        self.kv.set(ITEMS_KEY, json).await
    }
}

/// Picks a client-clock id that is not already taken.
fn next_id(items: &[Item], now_millis: i64) -> ItemId {
    let taken: HashSet<i64> = items.iter().filter_map(|item| item.id.as_number()).collect();
    let candidate = match taken.iter().max() {
        Some(&max) if max >= now_millis => max.checked_add(1),
        _ => Some(now_millis),
    };

    // No room above the largest id: first free value from the clock up, then from zero.
    let id = candidate
        .or_else(|| {
            (now_millis..=i64::MAX)
                .chain(0..now_millis)
                .find(|n| !taken.contains(n))
        })
        .unwrap_or(now_millis);
    ItemId::from(id)
}

impl ItemStore for LocalStore {
    async fn list(&self) -> Result<Vec<Item>> {
        let items = self
            .load()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))?;
        tracing::debug!(count = items.len(), "Loaded items from local store");
        Ok(items)
    }

    async fn create(&self, draft: &Draft) -> Result<Item> {
        if let Some(image) = &draft.image {
            image.ensure_within_ceiling()?;
        }

        let mut items = self
            .load()
            .await
            .map_err(|e| Error::SubmitFailed(e.to_string()))?;

        let now = Utc::now();
        let item = Item {
            id: next_id(&items, now.timestamp_millis()),
            name: draft.name.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            status: draft.status,
            contact: draft.contact.clone(),
            image: draft.image.as_ref().map(crate::models::EncodedImage::data_uri),
            created_at: now,
        };
        items.push(item.clone());

        self.save(&items)
            .await
            .map_err(|e| Error::SubmitFailed(e.to_string()))?;
        tracing::info!(id = %item.id, "Stored item in local store");
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<bool> {
        let mut items = self
            .load()
            .await
            .map_err(|e| Error::DeleteFailed(e.to_string()))?;

        let Some(pos) = items.iter().position(|item| &item.id == id) else {
            tracing::debug!(%id, "Delete of unknown id in local store");
            return Ok(false);
        };
        items.remove(pos);

        self.save(&items)
            .await
            .map_err(|e| Error::DeleteFailed(e.to_string()))?;
        tracing::info!(%id, "Deleted item from local store");
        Ok(true)
    }

    fn sync_mode(&self) -> SyncMode {
        SyncMode::Direct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EncodedImage, ItemStatus, MAX_IMAGE_BYTES};
    use tempfile::TempDir;

    fn draft(name: &str) -> Draft {
        Draft {
            name: name.to_string(),
            description: "Brown leather".to_string(),
            location: "Library".to_string(),
            status: ItemStatus::Lost,
            contact: "555-0100".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.sync_mode(), SyncMode::Direct);
    }

    #[tokio::test]
    async fn test_create_appends_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let first = store.create(&draft("Wallet")).await.unwrap();
        let second = store.create(&draft("Keys")).await.unwrap();
        assert_ne!(first.id, second.id);

        let items = store.list().await.unwrap();
        assert_eq!(items, vec![first, second]);
    }

    #[tokio::test]
    async fn test_create_stores_image_as_data_uri() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let image = EncodedImage {
            file_name: "a.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        };
        let item = store
            .create(&draft("Phone").with_image(image.clone()))
            .await
            .unwrap();
        assert_eq!(item.image, Some(image.data_uri()));
    }

    #[tokio::test]
    async fn test_oversize_image_rejected_before_write() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();

        let image = EncodedImage {
            file_name: "big.jpg".to_string(),
            mime: "image/jpeg".to_string(),
            bytes: vec![0; usize::try_from(MAX_IMAGE_BYTES).unwrap() + 1],
        };
        let err = store
            .create(&draft("Camera").with_image(image))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::PayloadTooLarge { .. }));
        assert!(!store.kv().path().exists());
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        let keep = store.create(&draft("Keep")).await.unwrap();
        let gone = store.create(&draft("Gone")).await.unwrap();

        assert!(store.delete(&gone.id).await.unwrap());
        assert!(!store.delete(&gone.id).await.unwrap());
        assert_eq!(store.list().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn test_corrupt_list_fails_each_operation_with_its_kind() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store.kv().set(ITEMS_KEY, "[{\"broken\"").await.unwrap();

        assert!(matches!(store.list().await, Err(Error::FetchFailed(_))));
        assert!(matches!(
            store.create(&draft("X")).await,
            Err(Error::SubmitFailed(_))
        ));
        assert!(matches!(
            store.delete(&ItemId::new("1")).await,
            Err(Error::DeleteFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_reads_legacy_records() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store
            .kv()
            .set(
                ITEMS_KEY,
                r#"[{"id":1700000000000,"name":"Scarf","description":"Blue","status":"found","contact":"","timestamp":1700000000000}]"#,
            )
            .await
            .unwrap();

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Scarf");

        assert!(store.delete(&ItemId::new("1700000000000")).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_next_id_skips_taken_ids() {
        let mut item = Item {
            id: ItemId::from(5_000),
            name: String::new(),
            description: String::new(),
            location: String::new(),
            status: ItemStatus::Lost,
            contact: String::new(),
            image: None,
            created_at: Utc::now(),
        };
        assert_eq!(next_id(&[], 1_000), ItemId::from(1_000));
        assert_eq!(next_id(std::slice::from_ref(&item), 1_000), ItemId::from(5_001));
        item.id = ItemId::new("not-a-number");
        assert_eq!(next_id(&[item], 1_000), ItemId::from(1_000));
    }

    #[test]
    fn test_next_id_at_top_of_range() {
        let at = |id: i64| Item {
            id: ItemId::from(id),
            name: String::new(),
            description: String::new(),
            location: String::new(),
            status: ItemStatus::Lost,
            contact: String::new(),
            image: None,
            created_at: Utc::now(),
        };

        assert_eq!(next_id(&[at(i64::MAX)], 1_000), ItemId::from(1_000));
        assert_eq!(
            next_id(&[at(i64::MAX), at(1_000), at(1_001)], 1_000),
            ItemId::from(1_002)
        );
    }

    #[tokio::test]
    async fn test_create_after_max_id_record() {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        store
            .kv()
            .set(
                ITEMS_KEY,
                r#"[{"id":"9223372036854775807","name":"Scarf","description":"Blue","status":"found","contact":"","timestamp":1700000000000}]"#,
            )
            .await
            .unwrap();

        let created = store.create(&draft("Wallet")).await.unwrap();
        assert_ne!(created.id, ItemId::from(i64::MAX));
        assert!(created.id.as_number().is_some_and(|n| n > 0));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_full_store_stays_usable() {
        let dir = TempDir::new().unwrap();
        let kv = KeyValueStore::open(dir.path()).unwrap().with_max_size(4 * 1024);
        let store = LocalStore::new(kv);
        let photo = EncodedImage {
            file_name: "p.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![7; 512],
        };

        let mut stored = 0;
        let err = loop {
            match store.create(&draft("Bag").with_image(photo.clone())).await {
                Ok(_) => stored += 1,
                Err(e) => break e,
            }
            assert!(stored < 64, "size limit never reached");
        };
        assert!(matches!(err, Error::SubmitFailed(_)));
        assert!(stored > 0);

        let items = store.list().await.unwrap();
        assert_eq!(items.len(), stored);
        assert!(std::fs::metadata(store.kv().path()).unwrap().len() <= 4 * 1024);

        assert!(store.delete(&items[0].id).await.unwrap());
        store.create(&draft("Hat")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), stored);
    }
}
