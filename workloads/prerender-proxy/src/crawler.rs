//! Crawler detection by User-Agent.

/// User-Agent tokens of crawlers that get prerendered pages.
pub const CRAWLER_SIGNATURES: &[&str] = &[
    "googlebot",
    "bingbot",
    "yandex",
    "duckduckbot",
    "baidu",
    "facebookexternalhit",
    "twitterbot",
    "linkedinbot",
];

/// Case-insensitive substring matcher over crawler signatures.
#[derive(Debug, Clone)]
pub struct CrawlerMatcher {
    signatures: Vec<String>,
}

impl Default for CrawlerMatcher {
    fn default() -> Self {
        Self::new(CRAWLER_SIGNATURES.iter().copied())
    }
}

impl CrawlerMatcher {
    pub fn new<I, S>(signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            signatures: signatures
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Add more signatures on top of the current ones.
    pub fn extend<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extra = Self::new(extra).signatures;
        for signature in extra {
            if !self.signatures.contains(&signature) {
                self.signatures.push(signature);
            }
        }
        self
    }

    /// The first signature found in `user_agent`.
    pub fn matched(&self, user_agent: &str) -> Option<&str> {
        if user_agent.is_empty() {
            return None;
        }
        let ua = user_agent.to_lowercase();
        self.signatures
            .iter()
            .find(|signature| ua.contains(signature.as_str()))
            .map(String::as_str)
    }

    pub fn is_crawler(&self, user_agent: &str) -> bool {
        self.matched(user_agent).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_crawlers() {
        let matcher = CrawlerMatcher::default();
        assert_eq!(
            matcher.matched("Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"),
            Some("googlebot")
        );
        assert!(matcher.is_crawler("facebookexternalhit/1.1"));
        assert!(matcher.is_crawler("Mozilla/5.0 (compatible; YandexBot/3.0)"));
        assert!(matcher.is_crawler("LinkedInBot/1.0"));
    }

    #[test]
    fn test_browsers_are_not_crawlers() {
        let matcher = CrawlerMatcher::default();
        assert!(!matcher.is_crawler(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_4) AppleWebKit/605.1.15 Safari/605.1.15"
        ));
        assert!(!matcher.is_crawler(""));
    }

    #[test]
    fn test_extend() {
        let matcher = CrawlerMatcher::default().extend(["Slackbot", " ", "googlebot"]);
        assert!(matcher.is_crawler("Slackbot-LinkExpanding 1.0"));
        assert_eq!(matcher.signatures.len(), CRAWLER_SIGNATURES.len() + 1);
    }
}
