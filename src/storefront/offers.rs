//! Special offers: the discounted products highlighted on the home page.

use super::{
    client::{ApiClient, Product},
    views::{SpecialOffersTemplate, render_html},
};
use tracing::error;

/// Number of cards in the offers section, and of skeletons while it loads.
pub const OFFER_LIMIT: usize = 3;
pub const REVIEW_COUNT: u32 = 100;
pub const OFFERS_ERROR_MESSAGE: &str =
    "Hubo un problema al cargar los productos. Por favor, intenta nuevamente más tarde.";

const MAX_STARS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub id: String,
    pub image_url: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub discounted_price: Option<f64>,
    pub discount: Option<f64>,
    pub rating: f32,
    pub review_count: u32,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            image_url: product.image_url.clone().unwrap_or_default(),
            title: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            discounted_price: product.discounted_price,
            discount: product.discount,
            rating: product.stars,
            review_count: REVIEW_COUNT,
        }
    }
}

impl ProductCard {
    #[must_use]
    pub fn price_label(&self) -> String {
        format_price(self.price)
    }

    /// Only for a positive discount; a 0% discount shows the list price alone.
    #[must_use]
    pub fn discounted_price_label(&self) -> Option<String> {
        self.discount
            .filter(|discount| *discount > 0.0)
            .and(self.discounted_price)
            .map(format_price)
    }

    #[must_use]
    pub fn discount_label(&self) -> Option<String> {
        self.discount
            .filter(|discount| *discount > 0.0)
            .map(|discount| format!("-{}%", format_number(discount)))
    }

    /// Five-glyph rating, rounded to the nearest whole star.
    #[must_use]
    pub fn stars(&self) -> String {
        let full = stars_filled(self.rating);
        format!("{}{}", "★".repeat(full), "☆".repeat(MAX_STARS - full))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn stars_filled(rating: f32) -> usize {
    if rating.is_nan() {
        return 0;
    }
    (rating.round().clamp(0.0, MAX_STARS as f32)) as usize
}

fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Products with a positive discount, in API order, capped at [`OFFER_LIMIT`].
#[must_use]
pub fn special_offers(products: &[Product]) -> Vec<ProductCard> {
    products
        .iter()
        .filter(|product| product.discount.is_some_and(|discount| discount > 0.0))
        .take(OFFER_LIMIT)
        .map(ProductCard::from)
        .collect()
}

/// Fetch the catalogue and render the offers section. Fetch failures are
/// logged and rendered as an inline message.
pub async fn render_special_offers(client: &ApiClient) -> String {
    let template = match client.fetch_products().await {
        Ok(products) => SpecialOffersTemplate::cards(special_offers(&products)),
        Err(err) => {
            error!("Error fetching products: {err}");
            SpecialOffersTemplate::error(OFFERS_ERROR_MESSAGE)
        }
    };

    render_html(&template).unwrap_or_else(|err| {
        error!("Failed to render special offers: {err}");
        format!(r#"<div class="offers-error" role="alert">{OFFERS_ERROR_MESSAGE}</div>"#)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, discount: Option<f64>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Producto {id}"),
            description: String::new(),
            price: 100.0,
            discount,
            discounted_price: discount.map(|d| 100.0 - d),
            image_url: None,
            stars: 4.0,
        }
    }

    #[test]
    fn keeps_discounted_in_order_and_caps() {
        let products = vec![
            product("a", Some(10.0)),
            product("b", None),
            product("c", Some(0.0)),
            product("d", Some(25.0)),
            product("e", Some(5.0)),
            product("f", Some(50.0)),
        ];
        let ids: Vec<String> = special_offers(&products)
            .into_iter()
            .map(|card| card.id)
            .collect();
        assert_eq!(ids, ["a", "d", "e"]);
    }

    #[test]
    fn fewer_than_limit() {
        let cards = special_offers(&[product("a", None), product("b", Some(15.0))]);
        assert_eq!(cards.len(), 1);
        assert!(special_offers(&[]).is_empty());
    }

    #[test]
    fn card_fields_from_product() {
        let mut source = product("x", Some(15.0));
        source.image_url = Some("https://cdn.example/x.png".to_string());
        let card = ProductCard::from(&source);
        assert_eq!(card.title, "Producto x");
        assert_eq!(card.image_url, "https://cdn.example/x.png");
        assert_eq!(card.review_count, 100);
        assert!((card.rating - 4.0).abs() < f32::EPSILON);

        let without_image = ProductCard::from(&product("y", Some(1.0)));
        assert_eq!(without_image.image_url, "");
    }

    #[test]
    fn labels() {
        let mut card = ProductCard::from(&product("x", Some(15.0)));
        assert_eq!(card.price_label(), "$100.00");
        assert_eq!(card.discounted_price_label().as_deref(), Some("$85.00"));
        assert_eq!(card.discount_label().as_deref(), Some("-15%"));

        card.discount = Some(12.5);
        assert_eq!(card.discount_label().as_deref(), Some("-12.5%"));

        card.discount = Some(0.0);
        card.discounted_price = Some(100.0);
        assert_eq!(card.discounted_price_label(), None);
        assert_eq!(card.discount_label(), None);
    }

    #[test]
    fn stars_round_and_clamp() {
        let mut card = ProductCard::from(&product("x", None));
        card.rating = 3.6;
        assert_eq!(card.stars(), "★★★★☆");
        card.rating = 9.0;
        assert_eq!(card.stars(), "★★★★★");
        card.rating = -1.0;
        assert_eq!(card.stars(), "☆☆☆☆☆");
    }
}
