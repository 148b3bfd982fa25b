//! GraphQL query resolvers

use async_graphql::{Context, ErrorExtensions, Object, Result, ID};
use serde_json::json;

use super::present_id;
use crate::{
    context::CatalogContext,
    model::{Banner, Product, Review},
    pagination::{paginate, PageRequest},
    store::StoreError,
    validation::ValidationError,
    CatalogError,
};

/// Root query resolver
pub struct Query;

#[Object]
impl Query {
    /// Retrieves product data: one product by id, or a page of all products
    async fn products(
        &self,
        ctx: &Context<'_>,
        product_id: Option<ID>,
        items_per_page: Option<i32>,
        page: Option<i32>,
    ) -> Result<Vec<Product>> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "products",
            json!({ "productId": product_id.as_deref(), "itemsPerPage": items_per_page, "page": page }),
        );

        let outcome: std::result::Result<Vec<Product>, StoreError> = match present_id(product_id) {
            Some(product_id) => context
                .store
                .find_product(&product_id)
                .await
                .map(|found| found.into_iter().collect()),
            None => paginate(context.store.products(), PageRequest::new(items_per_page, page))
                .await
                .map(|page| page.into_items()),
        };

        outcome.map_err(|e| {
            context.log_failure("products", &e);
            CatalogError::from(e).extend()
        })
    }

    /// Retrieves a page of banners
    async fn banners(
        &self,
        ctx: &Context<'_>,
        items_per_page: Option<i32>,
        page: Option<i32>,
    ) -> Result<Vec<Banner>> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "banners",
            json!({ "itemsPerPage": items_per_page, "page": page }),
        );

        paginate(context.store.banners(), PageRequest::new(items_per_page, page))
            .await
            .map(|page| page.into_items())
            .map_err(|e| {
                context.log_failure("banners", &e);
                CatalogError::from(e).extend()
            })
    }

    /// Retrieves a page of reviews for one product
    async fn reviews(
        &self,
        ctx: &Context<'_>,
        linked_product_id: Option<ID>,
        items_per_page: Option<i32>,
        page: Option<i32>,
    ) -> Result<Vec<Review>> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "reviews",
            json!({ "linkedProductId": linked_product_id.as_deref(), "itemsPerPage": items_per_page, "page": page }),
        );

        let Some(linked_product_id) = present_id(linked_product_id) else {
            return Err(CatalogError::from(ValidationError::required("linkedProductId")).extend());
        };

        paginate(
            context.store.reviews_for(&linked_product_id),
            PageRequest::new(items_per_page, page),
        )
        .await
        .map(|page| page.into_items())
        .map_err(|e| {
            context.log_failure("reviews", &e);
            CatalogError::from(e).extend()
        })
    }
}
