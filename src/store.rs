//! Persistence seam for catalog records
//!
//! Collections are read through [`RecordStream`]s: lazy cursors that yield
//! records in insertion order and release their resources when dropped.
//! Writes go straight to the store, which is the only arbiter of
//! consistency between concurrent requests.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{Banner, Product, Review};

/// Store failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("a record with id `{0}` already exists")]
    Conflict(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Lazy cursor over stored records
pub type RecordStream<'a, T> = BoxStream<'a, StoreResult<T>>;

/// Document store holding products, reviews and banners
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Look up a single product by id
    async fn find_product(&self, product_id: &str) -> StoreResult<Option<Product>>;

    /// All products, insertion order
    fn products(&self) -> RecordStream<'_, Product>;

    /// All banners, insertion order
    fn banners(&self) -> RecordStream<'_, Banner>;

    /// Reviews linked to one product, insertion order
    fn reviews_for(&self, linked_product_id: &str) -> RecordStream<'_, Review>;

    async fn insert_product(&self, product: Product) -> StoreResult<Product>;

    /// Replace an existing product; `None` if it no longer exists
    async fn replace_product(&self, product: Product) -> StoreResult<Option<Product>>;

    /// Remove a product, returning what was removed
    async fn delete_product(&self, product_id: &str) -> StoreResult<Option<Product>>;

    async fn insert_banner(&self, banner: Banner) -> StoreResult<Banner>;

    /// Remove a banner, returning what was removed
    async fn delete_banner(&self, banner_id: &str) -> StoreResult<Option<Banner>>;
}

#[derive(Debug, Default)]
struct Collections {
    products: Vec<Product>,
    banners: Vec<Banner>,
    reviews: Vec<Review>,
}

/// In-process store backed by insertion-ordered vectors
///
/// Cursors take the read lock once per record, so writers are never blocked
/// by a slow reader and a cursor observes writes made while it is open.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

fn products_of(c: &Collections) -> &Vec<Product> {
    &c.products
}

fn banners_of(c: &Collections) -> &Vec<Banner> {
    &c.banners
}

fn reviews_of(c: &Collections) -> &Vec<Review> {
    &c.reviews
}

struct Scan<T, F> {
    inner: Arc<RwLock<Collections>>,
    select: fn(&Collections) -> &Vec<T>,
    keep: F,
    position: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a review. Reviews have no mutation of their own; they are seeded.
    pub async fn insert_review(&self, review: Review) -> StoreResult<Review> {
        let mut collections = self.inner.write().await;
        if collections.reviews.iter().any(|r| r.review_id == review.review_id) {
            return Err(StoreError::Conflict(review.review_id));
        }
        collections.reviews.push(review.clone());
        Ok(review)
    }

    pub async fn product_count(&self) -> usize {
        self.inner.read().await.products.len()
    }

    pub async fn banner_count(&self) -> usize {
        self.inner.read().await.banners.len()
    }

    fn scan<T, F>(&self, select: fn(&Collections) -> &Vec<T>, keep: F) -> RecordStream<'static, T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let scan = Scan {
            inner: Arc::clone(&self.inner),
            select,
            keep,
            position: 0,
        };

        stream::unfold(scan, |mut scan| async move {
            let next = {
                let collections = scan.inner.read().await;
                let records = (scan.select)(&collections);
                let mut found = None;
                while let Some(record) = records.get(scan.position) {
                    scan.position += 1;
                    if (scan.keep)(record) {
                        found = Some(record.clone());
                        break;
                    }
                }
                found
            };
            next.map(|record| (Ok(record), scan))
        })
        .boxed()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_product(&self, product_id: &str) -> StoreResult<Option<Product>> {
        let collections = self.inner.read().await;
        Ok(collections
            .products
            .iter()
            .find(|p| p.product_id == product_id)
            .cloned())
    }

    fn products(&self) -> RecordStream<'_, Product> {
        self.scan(products_of, |_| true)
    }

    fn banners(&self) -> RecordStream<'_, Banner> {
        self.scan(banners_of, |_| true)
    }

    fn reviews_for(&self, linked_product_id: &str) -> RecordStream<'_, Review> {
        let linked_product_id = linked_product_id.to_string();
        self.scan(
            reviews_of,
            move |review: &Review| review.linked_product_id == linked_product_id,
        )
    }

    async fn insert_product(&self, product: Product) -> StoreResult<Product> {
        let mut collections = self.inner.write().await;
        if collections
            .products
            .iter()
            .any(|p| p.product_id == product.product_id)
        {
            return Err(StoreError::Conflict(product.product_id));
        }
        collections.products.push(product.clone());
        Ok(product)
    }

    async fn replace_product(&self, product: Product) -> StoreResult<Option<Product>> {
        let mut collections = self.inner.write().await;
        match collections
            .products
            .iter_mut()
            .find(|p| p.product_id == product.product_id)
        {
            Some(slot) => {
                *slot = product.clone();
                Ok(Some(product))
            }
            None => Ok(None),
        }
    }

    async fn delete_product(&self, product_id: &str) -> StoreResult<Option<Product>> {
        let mut collections = self.inner.write().await;
        let position = collections
            .products
            .iter()
            .position(|p| p.product_id == product_id);
        Ok(position.map(|idx| collections.products.remove(idx)))
    }

    async fn insert_banner(&self, banner: Banner) -> StoreResult<Banner> {
        let mut collections = self.inner.write().await;
        if collections.banners.iter().any(|b| b.banner_id == banner.banner_id) {
            return Err(StoreError::Conflict(banner.banner_id));
        }
        collections.banners.push(banner.clone());
        Ok(banner)
    }

    async fn delete_banner(&self, banner_id: &str) -> StoreResult<Option<Banner>> {
        let mut collections = self.inner.write().await;
        let position = collections
            .banners
            .iter()
            .position(|b| b.banner_id == banner_id);
        Ok(position.map(|idx| collections.banners.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductInput, DEFAULT_QUANTITY_TYPE};
    use crate::types::DateTime;
    use futures_util::TryStreamExt;

    fn product(id: &str) -> Product {
        Product::from_input(
            id.to_string(),
            ProductInput {
                name: format!("Product {}", id),
                description: None,
                product_image_links: vec![],
                quantity_type: None,
                average_rating: None,
                review_count: None,
                category: None,
                price: 1.0,
                brand_name: None,
                brand_logo_link: None,
                discounts: vec![],
            },
        )
    }

    fn review(id: &str, product_id: &str) -> Review {
        Review {
            review_id: id.to_string(),
            linked_product_id: product_id.to_string(),
            user_id: "u1".to_string(),
            user_name: None,
            comment: Some("fine".to_string()),
            rating: 4.0,
            date_added: DateTime::now(),
        }
    }

    #[tokio::test]
    async fn test_products_stream_in_insertion_order() {
        let store = MemoryStore::new();
        for id in ["b", "a", "c"] {
            store.insert_product(product(id)).await.unwrap();
        }

        let ids: Vec<String> = store
            .products()
            .map_ok(|p| p.product_id)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_reviews_are_filtered_by_product() {
        let store = MemoryStore::new();
        store.insert_review(review("r1", "p1")).await.unwrap();
        store.insert_review(review("r2", "p2")).await.unwrap();
        store.insert_review(review("r3", "p1")).await.unwrap();

        let ids: Vec<String> = store
            .reviews_for("p1")
            .map_ok(|r| r.review_id)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(ids, vec!["r1", "r3"]);
    }

    #[tokio::test]
    async fn test_duplicate_ids_conflict() {
        let store = MemoryStore::new();
        store.insert_product(product("p1")).await.unwrap();
        let err = store.insert_product(product("p1")).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("p1".to_string()));
        assert_eq!(store.product_count().await, 1);
    }

    #[tokio::test]
    async fn test_replace_and_delete() {
        let store = MemoryStore::new();
        store.insert_product(product("p1")).await.unwrap();

        let mut changed = product("p1");
        changed.price = 9.0;
        let replaced = store.replace_product(changed).await.unwrap().unwrap();
        assert_eq!(replaced.price, 9.0);
        assert_eq!(replaced.quantity_type, DEFAULT_QUANTITY_TYPE);

        assert!(store.replace_product(product("ghost")).await.unwrap().is_none());

        let removed = store.delete_product("p1").await.unwrap();
        assert_eq!(removed.map(|p| p.product_id), Some("p1".to_string()));
        assert!(store.delete_product("p1").await.unwrap().is_none());
        assert!(store.find_product("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_cursor_does_not_block_writers() {
        let store = MemoryStore::new();
        store.insert_product(product("p1")).await.unwrap();

        let mut cursor = store.products();
        let first = cursor.next().await.unwrap().unwrap();
        assert_eq!(first.product_id, "p1");

        store.insert_product(product("p2")).await.unwrap();
        let second = cursor.next().await.unwrap().unwrap();
        assert_eq!(second.product_id, "p2");
        assert!(cursor.next().await.is_none());
    }
}
