use crate::Category;

/// Ordered category pattern table. First match wins, so entry order is
/// part of the contract: `aws.amazon.com` is tech even though
/// `amazon.com` appears under shopping further down.
///
/// Patterns starting with `.` match as a domain suffix (`.edu`);
/// everything else matches case-insensitively inside the domain or the
/// full URL, but only at a label boundary.
pub const CATEGORY_PATTERNS: &[(Category, &[&str])] = &[
    (
        Category::Tech,
        &[
            "github.com",
            "stackoverflow.com",
            "stackoverflow.blog",
            "developer.mozilla.org",
            "docs.google.com",
            "gitlab.com",
            "bitbucket.org",
            "codepen.io",
            "jsfiddle.net",
            "replit.com",
            "vercel.com",
            "netlify.com",
            "aws.amazon.com",
            "azure.microsoft.com",
            "cloud.google.com",
            "digitalocean.com",
            "heroku.com",
        ],
    ),
    (
        Category::Social,
        &[
            "twitter.com",
            "x.com",
            "facebook.com",
            "instagram.com",
            "linkedin.com",
            "reddit.com",
            "tiktok.com",
            "youtube.com",
            "twitch.tv",
            "discord.com",
            "whatsapp.com",
            "telegram.org",
            "snapchat.com",
            "pinterest.com",
        ],
    ),
    (
        Category::News,
        &[
            "cnn.com",
            "bbc.com",
            "reuters.com",
            "apnews.com",
            "npr.org",
            "theguardian.com",
            "nytimes.com",
            "washingtonpost.com",
            "wsj.com",
            "bloomberg.com",
            "techcrunch.com",
            "theverge.com",
            "engadget.com",
            "arstechnica.com",
            "news.ycombinator.com",
        ],
    ),
    (
        Category::Edu,
        &[
            "wikipedia.org",
            "wikimedia.org",
            "khanacademy.org",
            "coursera.org",
            "edx.org",
            "udemy.com",
            "scholar.google.com",
            "jstor.org",
            "arxiv.org",
            "researchgate.net",
            "academia.edu",
            ".edu",
        ],
    ),
    (
        Category::Shopping,
        &[
            "amazon.com",
            "ebay.com",
            "walmart.com",
            "target.com",
            "bestbuy.com",
            "etsy.com",
            "shopify.com",
            "aliexpress.com",
            "alibaba.com",
            "newegg.com",
            "wayfair.com",
            "overstock.com",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "netflix.com",
            "hulu.com",
            "disneyplus.com",
            "hbomax.com",
            "primevideo.com",
            "spotify.com",
            "soundcloud.com",
            "bandcamp.com",
            "crunchyroll.com",
            "funimation.com",
            "imdb.com",
            "letterboxd.com",
        ],
    ),
    (
        Category::Finance,
        &[
            "paypal.com",
            "stripe.com",
            "venmo.com",
            "cash.app",
            "robinhood.com",
            "coinbase.com",
            "binance.com",
            "kraken.com",
            "fidelity.com",
            "schwab.com",
            "vanguard.com",
            "bankofamerica.com",
            "chase.com",
            "wellsfargo.com",
        ],
    ),
];

/// Substring match that only fires at a label boundary: the occurrence
/// must not be preceded by an alphanumeric or `-`. Keeps `x.com` from
/// matching inside `netflix.com` while `aws.amazon.com` still contains
/// `amazon.com` and `?to=spotify.com` still contains `spotify.com`.
fn contains_at_boundary(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(at, _)| {
        haystack[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '-'))
    })
}

fn pattern_matches(pattern: &str, domain: &str, url: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('.') {
        domain.ends_with(pattern) || domain == suffix
    } else {
        contains_at_boundary(domain, pattern) || contains_at_boundary(url, pattern)
    }
}

/// Map a domain/URL to its category. Pure and order-sensitive: the
/// first table entry with a matching pattern wins; anything unmatched
/// is `Other`.
pub fn classify(domain: &str, url: &str) -> Category {
    let domain = domain.to_lowercase();
    let url = url.to_lowercase();
    for (category, patterns) in CATEGORY_PATTERNS {
        if patterns.iter().any(|p| pattern_matches(p, &domain, &url)) {
            return *category;
        }
    }
    Category::Other
}
