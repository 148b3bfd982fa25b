//! GraphQL mutation resolvers
//!
//! Every mutation resolves to a [`MutationResponse`]; faults from the store,
//! the verifier or the payload are converted here and never escape as
//! GraphQL errors.

use async_graphql::{Context, Object, Result, ID};
use serde_json::json;
use uuid::Uuid;

use super::present_id;
use crate::{
    activity::{ActivityAction, ClientMeta},
    auth::ActorId,
    context::CatalogContext,
    envelope::{FailureReason, MutationOutcome, MutationResponse},
    model::{decode_payload, Banner, BannerInput, Product, ProductInput, ProductPatch},
    store::StoreError,
    types::DateTime,
    validation::ValidationError,
};

const PRODUCT: &str = "product";
const BANNER: &str = "banner";

type Attempt<T> = std::result::Result<T, FailureReason>;

/// Root mutation resolver
pub struct Mutation;

#[Object]
impl Mutation {
    /// Adds a product from JSON-encoded `productData`
    async fn add_product(
        &self,
        ctx: &Context<'_>,
        auth_token: Option<String>,
        product_data: Option<String>,
        user_id_of_who_added: Option<ID>,
        client_browser_info: Option<String>,
        client_ip_address: Option<String>,
    ) -> Result<MutationResponse> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "addProduct",
            json!({
                "productData": product_data,
                "userIdOfWhoAdded": user_id_of_who_added.as_deref(),
                "clientBrowserInfo": client_browser_info,
                "clientIpAddress": client_ip_address,
            }),
        );
        let client = context.client_meta(ctx, client_browser_info, client_ip_address);

        let result = async {
            let actor = authenticate(context, ctx, "addProduct", auth_token.as_deref()).await?;
            context.note_claimed_actor("addProduct", user_id_of_who_added.as_ref(), &actor);

            let input: ProductInput = decode_payload("productData", product_data.as_deref())?;
            let product = Product::from_input(new_id(), input);
            product.validate()?;

            let saved = context
                .store
                .insert_product(product)
                .await
                .map_err(|e| store_failure(context, "addProduct", e))?;
            context
                .record(&actor, ActivityAction::AddProduct, &saved.product_id, &client)
                .await;
            Ok::<_, FailureReason>(saved)
        }
        .await;

        Ok(context.respond(
            "addProduct",
            MutationOutcome::settle(
                result,
                "Product was successfully added!",
                "Failed to add product!",
            ),
        ))
    }

    /// Applies the JSON-encoded `infoToUpdate` to an existing product
    async fn update_product(
        &self,
        ctx: &Context<'_>,
        auth_token: Option<String>,
        product_id: Option<ID>,
        info_to_update: Option<String>,
        user_id_of_who_updated: Option<ID>,
        client_browser_info: Option<String>,
        client_ip_address: Option<String>,
    ) -> Result<MutationResponse> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "updateProduct",
            json!({
                "productId": product_id.as_deref(),
                "infoToUpdate": info_to_update,
                "userIdOfWhoUpdated": user_id_of_who_updated.as_deref(),
                "clientBrowserInfo": client_browser_info,
                "clientIpAddress": client_ip_address,
            }),
        );
        let client = context.client_meta(ctx, client_browser_info, client_ip_address);

        let result = async {
            let actor = authenticate(context, ctx, "updateProduct", auth_token.as_deref()).await?;
            context.note_claimed_actor("updateProduct", user_id_of_who_updated.as_ref(), &actor);

            let product_id =
                present_id(product_id).ok_or_else(|| ValidationError::required("productId"))?;
            let patch: ProductPatch = decode_payload("infoToUpdate", info_to_update.as_deref())?;

            let mut product = context
                .store
                .find_product(&product_id)
                .await
                .map_err(|e| store_failure(context, "updateProduct", e))?
                .ok_or_else(|| not_found(PRODUCT, &product_id))?;
            product.apply(patch);
            product.validate()?;

            // The record may have been deleted since it was read.
            let saved = context
                .store
                .replace_product(product)
                .await
                .map_err(|e| store_failure(context, "updateProduct", e))?
                .ok_or_else(|| not_found(PRODUCT, &product_id))?;
            context
                .record(&actor, ActivityAction::UpdateProduct, &saved.product_id, &client)
                .await;
            Ok::<_, FailureReason>(saved)
        }
        .await;

        Ok(context.respond(
            "updateProduct",
            MutationOutcome::settle(
                result,
                "Product was successfully updated!",
                "Failed to update product!",
            ),
        ))
    }

    /// Deletes a product by id
    async fn delete_product(
        &self,
        ctx: &Context<'_>,
        auth_token: Option<String>,
        product_id: Option<ID>,
        user_id_of_who_deleted: Option<ID>,
        client_browser_info: Option<String>,
        client_ip_address: Option<String>,
    ) -> Result<MutationResponse> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "deleteProduct",
            json!({
                "productId": product_id.as_deref(),
                "userIdOfWhoDeleted": user_id_of_who_deleted.as_deref(),
                "clientBrowserInfo": client_browser_info,
                "clientIpAddress": client_ip_address,
            }),
        );
        let client = context.client_meta(ctx, client_browser_info, client_ip_address);

        let result = async {
            let actor = authenticate(context, ctx, "deleteProduct", auth_token.as_deref()).await?;
            context.note_claimed_actor("deleteProduct", user_id_of_who_deleted.as_ref(), &actor);

            let product_id =
                present_id(product_id).ok_or_else(|| ValidationError::required("productId"))?;
            let removed = context
                .store
                .delete_product(&product_id)
                .await
                .map_err(|e| store_failure(context, "deleteProduct", e))?
                .ok_or_else(|| not_found(PRODUCT, &product_id))?;
            context
                .record(&actor, ActivityAction::DeleteProduct, &removed.product_id, &client)
                .await;
            Ok::<_, FailureReason>(removed)
        }
        .await;

        Ok(context.respond(
            "deleteProduct",
            MutationOutcome::settle(
                result,
                "Product was successfully deleted!",
                "Failed to delete product!",
            ),
        ))
    }

    /// Adds a banner from JSON-encoded `bannerData`
    async fn add_banner(
        &self,
        ctx: &Context<'_>,
        auth_token: Option<String>,
        banner_data: Option<String>,
        client_browser_info: Option<String>,
        client_ip_address: Option<String>,
    ) -> Result<MutationResponse> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "addBanner",
            json!({
                "bannerData": banner_data,
                "clientBrowserInfo": client_browser_info,
                "clientIpAddress": client_ip_address,
            }),
        );
        let client = context.client_meta(ctx, client_browser_info, client_ip_address);

        let result = async {
            let actor = authenticate(context, ctx, "addBanner", auth_token.as_deref()).await?;

            let input: BannerInput = decode_payload("bannerData", banner_data.as_deref())?;
            input.validate()?;
            let banner = new_banner(input, &actor, &client);

            let saved = context
                .store
                .insert_banner(banner)
                .await
                .map_err(|e| store_failure(context, "addBanner", e))?;
            context
                .record(&actor, ActivityAction::AddBanner, &saved.banner_id, &client)
                .await;
            Ok::<_, FailureReason>(saved)
        }
        .await;

        Ok(context.respond(
            "addBanner",
            MutationOutcome::settle(
                result,
                "Successfully added banner!",
                "Failed to add banner!",
            ),
        ))
    }

    /// Deletes a banner by id
    async fn delete_banner(
        &self,
        ctx: &Context<'_>,
        auth_token: Option<String>,
        banner_id: Option<ID>,
        client_browser_info: Option<String>,
        client_ip_address: Option<String>,
    ) -> Result<MutationResponse> {
        let context = ctx.data::<CatalogContext>()?;
        context.log_arguments(
            "deleteBanner",
            json!({
                "bannerId": banner_id.as_deref(),
                "clientBrowserInfo": client_browser_info,
                "clientIpAddress": client_ip_address,
            }),
        );
        let client = context.client_meta(ctx, client_browser_info, client_ip_address);

        let result = async {
            let actor = authenticate(context, ctx, "deleteBanner", auth_token.as_deref()).await?;

            let banner_id =
                present_id(banner_id).ok_or_else(|| ValidationError::required("bannerId"))?;
            let removed = context
                .store
                .delete_banner(&banner_id)
                .await
                .map_err(|e| store_failure(context, "deleteBanner", e))?
                .ok_or_else(|| not_found(BANNER, &banner_id))?;
            context
                .record(&actor, ActivityAction::DeleteBanner, &removed.banner_id, &client)
                .await;
            Ok::<_, FailureReason>(removed)
        }
        .await;

        Ok(context.respond(
            "deleteBanner",
            MutationOutcome::settle(
                result,
                "Banner was successfully deleted!",
                "Failed to delete Banner!",
            ),
        ))
    }
}

async fn authenticate(
    context: &CatalogContext,
    ctx: &Context<'_>,
    operation: &str,
    auth_token: Option<&str>,
) -> Attempt<ActorId> {
    context.authenticate(ctx, auth_token).await.map_err(|e| {
        context.log_failure(operation, &e);
        FailureReason::Unauthorized
    })
}

fn store_failure(context: &CatalogContext, operation: &str, error: StoreError) -> FailureReason {
    context.log_failure(operation, &error);
    FailureReason::Persistence
}

fn not_found(entity: &'static str, id: &str) -> FailureReason {
    FailureReason::NotFound {
        entity,
        id: id.to_string(),
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn new_banner(input: BannerInput, actor: &ActorId, client: &ClientMeta) -> Banner {
    Banner {
        banner_id: new_id(),
        title: input.title,
        image_link: input.image_link,
        target_link: input.target_link,
        date_added: DateTime::now(),
        user_id_of_who_added: actor.as_str().to_string(),
        client_browser_info: client.browser_info.clone(),
        client_ip_address: client.ip_address.clone(),
    }
}
