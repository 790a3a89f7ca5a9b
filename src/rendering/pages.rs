use serde::Serialize;
use tera::{Context, Tera};

use crate::auth::models::AuthenticatedUser;
use crate::error::AppError;
use crate::models::document::DocumentDetail;
use crate::rendering::links::{document_href, DOCUMENT_ROUTE_PREFIX};
use crate::rendering::markdown::render_markdown;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("graph.html", include_str!("../../templates/graph.html")),
    ("document.html", include_str!("../../templates/document.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
];

#[derive(Serialize)]
struct PageLink<'a> {
    href: String,
    title: &'a str,
}

/// Server-rendered HTML pages, compiled once at start-up.
pub struct PageRenderer {
    tera: Tera,
    oidc_enabled: bool,
    demo_mode: bool,
}

impl PageRenderer {
    /// `oidc_enabled` and `demo_mode` select which sign-in controls the
    /// navigation bar offers to anonymous visitors.
    pub fn new(oidc_enabled: bool, demo_mode: bool) -> Result<Self, AppError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.to_vec())
            .map_err(|e| AppError::Internal(format!("Failed to compile templates: {e}")))?;
        Ok(Self {
            tera,
            oidc_enabled,
            demo_mode,
        })
    }

    fn base_context(&self, viewer: Option<&AuthenticatedUser>) -> Context {
        let mut context = Context::new();
        context.insert(
            "user_name",
            &viewer.map(|u| u.name.clone().unwrap_or_else(|| u.id.clone())),
        );
        context.insert("oidc_enabled", &self.oidc_enabled);
        context.insert("demo_mode", &self.demo_mode);
        context
    }

    fn render(&self, template: &str, context: &Context) -> Result<String, AppError> {
        self.tera
            .render(template, context)
            .map_err(|e| AppError::Internal(format!("Failed to render {template}: {e}")))
    }

    /// The interactive link graph (`GET /`).
    pub fn graph_page(&self, viewer: Option<&AuthenticatedUser>) -> Result<String, AppError> {
        let mut context = self.base_context(viewer);
        context.insert("document_prefix", DOCUMENT_ROUTE_PREFIX);
        self.render("graph.html", &context)
    }

    /// A document's rendered Markdown with owner and outgoing links.
    pub fn document_page(
        &self,
        viewer: Option<&AuthenticatedUser>,
        detail: &DocumentDetail,
    ) -> Result<String, AppError> {
        let mut context = self.base_context(viewer);
        context.insert("doc", &detail.document);
        context.insert("body", &render_markdown(&detail.document.content));
        context.insert(
            "owner",
            detail.user.name.as_deref().unwrap_or(detail.user.id.as_str()),
        );
        context.insert(
            "updated",
            &detail.document.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        );
        let links: Vec<PageLink> = detail
            .links
            .iter()
            .map(|l| PageLink {
                href: document_href(&l.target_document.id),
                title: &l.target_document.title,
            })
            .collect();
        context.insert("links", &links);
        self.render("document.html", &context)
    }

    pub fn not_found_page(
        &self,
        viewer: Option<&AuthenticatedUser>,
        id: &str,
    ) -> Result<String, AppError> {
        let mut context = self.base_context(viewer);
        context.insert("id", id);
        self.render("not_found.html", &context)
    }
}
