use super::offers::{OFFER_LIMIT, ProductCard};
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

pub const SITE_TITLE: &str = "Tienda";

/// Page up to (not including) `</body>`, with the offers slot showing skeletons.
#[derive(Template)]
#[template(path = "home_shell.html")]
pub struct HomeShellTemplate {
    pub title: &'static str,
    pub boundary_id: &'static str,
    pub skeletons: usize,
}

impl HomeShellTemplate {
    #[must_use]
    pub fn new(boundary_id: &'static str) -> Self {
        Self {
            title: SITE_TITLE,
            boundary_id,
            skeletons: OFFER_LIMIT,
        }
    }
}

#[derive(Template)]
#[template(path = "partials/special_offers.html")]
pub struct SpecialOffersTemplate {
    pub cards: Vec<ProductCard>,
    pub error: Option<&'static str>,
}

impl SpecialOffersTemplate {
    #[must_use]
    pub fn cards(cards: Vec<ProductCard>) -> Self {
        Self { cards, error: None }
    }

    #[must_use]
    pub fn error(message: &'static str) -> Self {
        Self {
            cards: Vec::new(),
            error: Some(message),
        }
    }
}

/// Closing chunk: resolved markup plus the script that swaps it into its slot.
#[derive(Template)]
#[template(path = "partials/resolved_boundary.html")]
pub struct ResolvedBoundaryTemplate<'a> {
    pub boundary_id: &'a str,
    pub content: &'a str,
}

#[derive(Template)]
#[template(path = "product.html")]
pub struct ProductPageTemplate {
    pub title: String,
    pub card: ProductCard,
}

impl ProductPageTemplate {
    #[must_use]
    pub fn new(card: ProductCard) -> Self {
        Self {
            title: format!("{} | {SITE_TITLE}", card.title),
            card,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPageTemplate {
    pub title: String,
    pub heading: &'static str,
    pub message: &'static str,
}

impl ErrorPageTemplate {
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(
            "Producto no encontrado",
            "El producto que buscas no existe o ya no está disponible.",
        )
    }

    #[must_use]
    pub fn upstream() -> Self {
        Self::new(
            "Servicio no disponible",
            "No pudimos cargar el producto. Por favor, intenta nuevamente más tarde.",
        )
    }

    fn new(heading: &'static str, message: &'static str) -> Self {
        Self {
            title: format!("{heading} | {SITE_TITLE}"),
            heading,
            message,
        }
    }
}

pub fn render_html<T: Template>(template: &T) -> askama::Result<String> {
    template.render()
}

pub fn render_response<T: Template>(template: &T, status: StatusCode) -> Response {
    match render_html(template) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => {
            error!("Template rendering failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering failed").into_response()
        }
    }
}
