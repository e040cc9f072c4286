//! sitemap.xml generation.

use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::catalog::Sale;

/// Production site root.
pub const DEFAULT_BASE_URL: &str = "https://ohmysales.app";

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFreq {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// Builds the sitemap for the homepage, the auth page and every active sale.
#[derive(Debug, Clone)]
pub struct SitemapBuilder {
    base_url: String,
    today: NaiveDate,
}

impl SitemapBuilder {
    pub fn new(base_url: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            today,
        }
    }

    /// Entries in output order: static pages, then sales by most recent update.
    pub fn entries(&self, sales: &[Sale]) -> Vec<SitemapEntry> {
        let mut entries = vec![
            SitemapEntry {
                loc: format!("{}/", self.base_url),
                lastmod: self.today,
                changefreq: ChangeFreq::Daily,
                priority: 1.0,
            },
            SitemapEntry {
                loc: format!("{}/auth", self.base_url),
                lastmod: self.today,
                changefreq: ChangeFreq::Monthly,
                priority: 0.5,
            },
        ];

        let mut active: Vec<&Sale> = sales
            .iter()
            .filter(|sale| sale.is_active(self.today))
            .collect();
        active.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        entries.extend(active.into_iter().map(|sale| SitemapEntry {
            loc: format!("{}/sale/{}", self.base_url, sale.id),
            lastmod: sale
                .updated_at
                .map(|at| at.date_naive())
                .unwrap_or(self.today),
            changefreq: ChangeFreq::Weekly,
            priority: 0.8,
        }));

        entries
    }

    /// Render the XML document.
    pub fn render(&self, sales: &[Sale]) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\"\n        \
             xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
        );

        for entry in self.entries(sales) {
            let loc = escape_xml(&entry.loc);
            // writing into a String cannot fail
            let _ = write!(
                xml,
                "  <url>\n    <loc>{loc}</loc>\n    <lastmod>{}</lastmod>\n    \
                 <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n    \
                 <xhtml:link rel=\"alternate\" hreflang=\"de\" href=\"{loc}\"/>\n  </url>\n",
                entry.lastmod.format("%Y-%m-%d"),
                entry.changefreq.as_str(),
                entry.priority,
            );
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
