//! Catalog records and the typed payloads that create or change them

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};
use serde_json::error::Category;

use crate::types::DateTime;
use crate::validation::{require_link, require_range, ValidationError};

/// Unit used when a product does not name one
pub const DEFAULT_QUANTITY_TYPE: &str = "pieces";

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

/// Product as stored and served
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub description: Option<String>,
    pub product_image_links: Vec<String>,
    pub quantity_type: String,
    pub average_rating: f64,
    pub review_count: u32,
    pub category: Option<String>,
    pub price: f64,
    pub brand_name: Option<String>,
    pub brand_logo_link: Option<String>,
    pub discounts: Vec<Discount>,
}

impl Product {
    /// Build a new product from a creation payload
    pub fn from_input(product_id: String, input: ProductInput) -> Self {
        Self {
            product_id,
            name: input.name,
            description: input.description,
            product_image_links: input.product_image_links,
            quantity_type: input
                .quantity_type
                .unwrap_or_else(|| DEFAULT_QUANTITY_TYPE.to_string()),
            average_rating: input.average_rating.unwrap_or(MIN_RATING),
            review_count: input.review_count.unwrap_or(0),
            category: input.category,
            price: input.price,
            brand_name: input.brand_name,
            brand_logo_link: input.brand_logo_link,
            discounts: input.discounts,
        }
    }

    /// Check every field rule; the first violation is returned.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::required("name"));
        }
        if !(self.price.is_finite() && self.price >= 0.0) {
            return Err(ValidationError::malformed("price", "must be a non-negative number"));
        }
        require_range("averageRating", self.average_rating, MIN_RATING, MAX_RATING)?;

        for (idx, link) in self.product_image_links.iter().enumerate() {
            require_link(&format!("productImageLinks[{}]", idx), link)?;
        }
        if let Some(link) = &self.brand_logo_link {
            require_link("brandLogoLink", link)?;
        }
        for (idx, discount) in self.discounts.iter().enumerate() {
            discount.validate(&format!("discounts[{}]", idx))?;
        }
        Ok(())
    }

    /// Apply a partial update in place. Call [`Product::validate`] afterwards.
    pub fn apply(&mut self, patch: ProductPatch) {
        let ProductPatch {
            name,
            description,
            product_image_links,
            quantity_type,
            average_rating,
            review_count,
            category,
            price,
            brand_name,
            brand_logo_link,
            discounts,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(links) = product_image_links {
            self.product_image_links = links;
        }
        if let Some(quantity_type) = quantity_type {
            self.quantity_type = quantity_type;
        }
        if let Some(rating) = average_rating {
            self.average_rating = rating;
        }
        if let Some(count) = review_count {
            self.review_count = count;
        }
        if let Some(category) = category {
            self.category = Some(category);
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(brand_name) = brand_name {
            self.brand_name = Some(brand_name);
        }
        if let Some(link) = brand_logo_link {
            self.brand_logo_link = Some(link);
        }
        if let Some(discounts) = discounts {
            self.discounts = discounts;
        }
    }
}

/// Discount embedded in a product
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Discount {
    pub title: String,
    /// Percentage taken off the price, 0 to 100
    pub percentage: f64,
    #[serde(default)]
    pub valid_from: Option<DateTime>,
    #[serde(default)]
    pub valid_until: Option<DateTime>,
}

impl Discount {
    fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::required(format!("{}.title", path)));
        }
        require_range(&format!("{}.percentage", path), self.percentage, 0.0, 100.0)?;
        if let (Some(from), Some(until)) = (self.valid_from, self.valid_until) {
            if until < from {
                return Err(ValidationError::malformed(
                    format!("{}.validUntil", path),
                    "ends before validFrom",
                ));
            }
        }
        Ok(())
    }
}

/// Review of a product
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: String,
    pub linked_product_id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub comment: Option<String>,
    pub rating: f64,
    pub date_added: DateTime,
}

/// Promotional banner
#[derive(SimpleObject, Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub banner_id: String,
    pub title: Option<String>,
    pub image_link: String,
    pub target_link: Option<String>,
    pub date_added: DateTime,
    pub user_id_of_who_added: String,
    pub client_browser_info: Option<String>,
    pub client_ip_address: Option<String>,
}

/// `productData` payload of `addProduct`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_image_links: Vec<String>,
    #[serde(default)]
    pub quantity_type: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub brand_logo_link: Option<String>,
    #[serde(default)]
    pub discounts: Vec<Discount>,
}

/// `infoToUpdate` payload of `updateProduct`; absent fields are left alone
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub product_image_links: Option<Vec<String>>,
    pub quantity_type: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: Option<u32>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub brand_name: Option<String>,
    pub brand_logo_link: Option<String>,
    pub discounts: Option<Vec<Discount>>,
}

/// `bannerData` payload of `addBanner`
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BannerInput {
    #[serde(default)]
    pub title: Option<String>,
    pub image_link: String,
    #[serde(default)]
    pub target_link: Option<String>,
}

impl BannerInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_link("imageLink", &self.image_link)?;
        if let Some(link) = &self.target_link {
            require_link("targetLink", link)?;
        }
        Ok(())
    }
}

/// Decode a JSON-encoded mutation argument into its typed payload.
///
/// A missing or undecodable argument is attributed to `field`.
pub fn decode_payload<T>(field: &str, raw: Option<&str>) -> Result<T, ValidationError>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ValidationError::required(field))?;
    serde_json::from_str(raw).map_err(|e| {
        let reason = match e.classify() {
            Category::Syntax | Category::Eof => "not valid JSON",
            Category::Data => "unexpected or mistyped fields",
            Category::Io => "could not be read",
        };
        ValidationError::malformed(field, reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_input() -> ProductInput {
        decode_payload(
            "productData",
            Some(r#"{"name":"Kettle","price":19.5,"productImageLinks":["https://img.example.com/kettle.png"]}"#),
        )
        .unwrap()
    }

    #[test]
    fn test_from_input_applies_defaults() {
        let product = Product::from_input("p1".into(), sample_input());
        assert_eq!(product.quantity_type, DEFAULT_QUANTITY_TYPE);
        assert_eq!(product.average_rating, 0.0);
        assert_eq!(product.review_count, 0);
        assert!(product.discounts.is_empty());
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_bad_image_link_names_its_index() {
        let mut input = sample_input();
        input.product_image_links.push("ftp://bad".into());
        let err = Product::from_input("p1".into(), input).validate().unwrap_err();
        assert_eq!(err.field(), "productImageLinks[1]");
    }

    #[test]
    fn test_product_rules() {
        let base = Product::from_input("p1".into(), sample_input());

        let mut negative = base.clone();
        negative.price = -0.01;
        assert_eq!(negative.validate().unwrap_err().field(), "price");

        let mut rating = base.clone();
        rating.average_rating = 5.5;
        assert_eq!(rating.validate().unwrap_err().field(), "averageRating");

        let mut unnamed = base.clone();
        unnamed.name = "  ".into();
        assert_eq!(unnamed.validate().unwrap_err().field(), "name");

        let mut logo = base;
        logo.brand_logo_link = Some("logo.png".into());
        assert_eq!(logo.validate().unwrap_err().field(), "brandLogoLink");
    }

    #[test]
    fn test_discount_rules() {
        let mut product = Product::from_input("p1".into(), sample_input());
        product.discounts.push(Discount {
            title: "Spring".into(),
            percentage: 120.0,
            valid_from: None,
            valid_until: None,
        });
        assert_eq!(product.validate().unwrap_err().field(), "discounts[0].percentage");

        product.discounts[0].percentage = 15.0;
        product.discounts[0].valid_from = Some(DateTime(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
        product.discounts[0].valid_until = Some(DateTime(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()));
        assert_eq!(product.validate().unwrap_err().field(), "discounts[0].validUntil");
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut product = Product::from_input("p1".into(), sample_input());
        let patch: ProductPatch = decode_payload("infoToUpdate", Some(r#"{"price":12.0,"category":"kitchen"}"#)).unwrap();
        product.apply(patch);
        assert_eq!(product.price, 12.0);
        assert_eq!(product.category.as_deref(), Some("kitchen"));
        assert_eq!(product.name, "Kettle");
        assert_eq!(product.product_image_links.len(), 1);
    }

    #[test]
    fn test_decode_payload_errors_name_the_argument() {
        let missing = decode_payload::<ProductInput>("productData", None).unwrap_err();
        assert_eq!(missing, ValidationError::required("productData"));

        let garbage = decode_payload::<ProductInput>("productData", Some("{not json")).unwrap_err();
        assert_eq!(garbage.field(), "productData");

        let unknown = decode_payload::<ProductPatch>("infoToUpdate", Some(r#"{"productId":"x"}"#)).unwrap_err();
        assert_eq!(unknown.field(), "infoToUpdate");

        let negative_count = decode_payload::<ProductPatch>("infoToUpdate", Some(r#"{"reviewCount":-1}"#));
        assert!(negative_count.is_err());
    }

    #[test]
    fn test_decode_payload_errors_use_fixed_wording() {
        let garbage = decode_payload::<ProductInput>("productData", Some(r#"{"name":"s3cr3t-value"#)).unwrap_err();
        assert_eq!(garbage, ValidationError::malformed("productData", "not valid JSON"));

        let unknown =
            decode_payload::<ProductPatch>("infoToUpdate", Some(r#"{"s3cr3tField":"x"}"#)).unwrap_err();
        assert_eq!(
            unknown,
            ValidationError::malformed("infoToUpdate", "unexpected or mistyped fields")
        );
        assert!(!unknown.to_string().contains("s3cr3t"));
        assert!(!unknown.to_string().contains("line"));
    }

    #[test]
    fn test_banner_links_are_checked() {
        let banner: BannerInput = decode_payload("bannerData", Some(r#"{"imageLink":"www.example.com/b.png","targetLink":"not a url"}"#)).unwrap();
        assert_eq!(banner.validate().unwrap_err().field(), "targetLink");
    }
}
