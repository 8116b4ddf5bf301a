// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Askama page templates and their render helpers.

use askama::Template;
use axum::response::Html;
use souq_config::StorefrontConfig;

use crate::server::BotStatus;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate;

#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub configured: bool,
    pub base_url: String,
    pub photos_dir: String,
    pub catalog_file: String,
    pub masked_token: String,
    pub bot_active: bool,
    /// Masked token the bot is actually polling with.
    pub serving_token: String,
    /// Set when the bot still runs on a token other than the configured one.
    pub token_mismatch: bool,
    pub pending_uploads: usize,
}

impl AdminTemplate {
    /// Template values for `config`, or the "not configured" page for `None`.
    pub fn new(
        config: Option<&StorefrontConfig>,
        bot: Option<BotStatus>,
        pending_uploads: usize,
    ) -> Self {
        let bot_active = bot.is_some();
        let token_mismatch = bot.as_ref().is_some_and(|b| !b.in_sync);
        let serving_token = bot.map(|b| b.masked_token).unwrap_or_default();
        match config {
            Some(config) => Self {
                configured: true,
                base_url: config.base_url().to_string(),
                photos_dir: config.photos_dir().display().to_string(),
                catalog_file: config.catalog_file().display().to_string(),
                masked_token: config.masked_token(),
                bot_active,
                serving_token,
                token_mismatch,
                pending_uploads,
            },
            None => Self {
                configured: false,
                base_url: String::new(),
                photos_dir: String::new(),
                catalog_file: String::new(),
                masked_token: String::new(),
                bot_active,
                serving_token,
                token_mismatch,
                pending_uploads,
            },
        }
    }
}

pub fn render_index() -> Html<String> {
    render(&IndexTemplate)
}

pub fn render_admin(template: &AdminTemplate) -> Html<String> {
    render(template)
}

fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        let msg = e
            .to_string()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        tracing::error!(error = %msg, "template render failed");
        format!("<h1>Template error: {msg}</h1>")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_renders() {
        let Html(page) = render_index();
        assert!(page.contains("/products.json"));
    }

    #[test]
    fn admin_without_config_shows_notice() {
        let Html(page) = render_admin(&AdminTemplate::new(None, None, 0));
        assert!(page.contains("BOT_TOKEN"));
        assert!(!page.contains("<dl>"));
    }

    #[test]
    fn admin_escapes_values() {
        let template = AdminTemplate {
            configured: true,
            base_url: "https://shop.example/?a=<b>".into(),
            photos_dir: "photos".into(),
            catalog_file: "products.json".into(),
            masked_token: "1234567890...".into(),
            bot_active: true,
            serving_token: "1234567890...".into(),
            token_mismatch: false,
            pending_uploads: 2,
        };
        let Html(page) = render_admin(&template);
        assert!(page.contains("1234567890..."));
        assert!(page.contains("&lt;b&gt;"));
        assert!(!page.contains("<b>"));
        assert!(!page.contains("mismatch"));
    }

    #[test]
    fn admin_flags_bot_on_stale_token() {
        let template = AdminTemplate {
            configured: true,
            base_url: "https://shop.example".into(),
            photos_dir: "photos".into(),
            catalog_file: "products.json".into(),
            masked_token: "2222222222...".into(),
            bot_active: true,
            serving_token: "1111111111...".into(),
            token_mismatch: true,
            pending_uploads: 0,
        };
        let Html(page) = render_admin(&template);
        assert!(page.contains("2222222222..."));
        assert!(page.contains("1111111111..."));
        assert!(page.contains("id=\"token-mismatch\""));
    }
}
