//! Built-in rate table.
//!
//! Entry order matters: partial matches are resolved first-match-wins in the
//! order declared here.

use crate::types::AccrualUnit::{Action, Minute, Query, Search, Visit};
use crate::types::RateRecord;

/// Gallons of water per kWh of energy.
pub const WATER_GALLONS_PER_KWH: f64 = 2.0;

/// Fallback for domains that match no table entry.
pub static DEFAULT_RATE: RateRecord = RateRecord::new(0.0003, Visit, "Website");

pub const RATE_TABLE: &[(&str, RateRecord)] = &[
    // AI services
    ("chatgpt.com", RateRecord::new(0.00034, Query, "ChatGPT")),
    ("openai.com", RateRecord::new(0.00034, Query, "OpenAI")),
    ("gemini.google.com", RateRecord::new(0.00024, Query, "Google Gemini")),
    ("bard.google.com", RateRecord::new(0.00024, Query, "Google Bard")),
    ("claude.ai", RateRecord::new(0.0003, Query, "Claude AI")),
    (
        "copilot.microsoft.com",
        RateRecord::new(0.0003, Query, "Microsoft Copilot"),
    ),
    // Search engines
    ("google.com", RateRecord::new(0.0003, Search, "Google Search")),
    ("bing.com", RateRecord::new(0.0003, Search, "Bing Search")),
    ("yahoo.com", RateRecord::new(0.0003, Search, "Yahoo Search")),
    ("duckduckgo.com", RateRecord::new(0.0003, Search, "DuckDuckGo")),
    // Video streaming, ~0.08-0.09 kWh per hour
    ("youtube.com", RateRecord::new(0.00013, Minute, "YouTube")),
    ("netflix.com", RateRecord::new(0.0015, Minute, "Netflix")),
    ("twitch.tv", RateRecord::new(0.0013, Minute, "Twitch")),
    ("vimeo.com", RateRecord::new(0.0013, Minute, "Vimeo")),
    ("hulu.com", RateRecord::new(0.0015, Minute, "Hulu")),
    ("disneyplus.com", RateRecord::new(0.0015, Minute, "Disney+")),
    ("primevideo.com", RateRecord::new(0.0015, Minute, "Prime Video")),
    // Social media
    ("facebook.com", RateRecord::new(0.00005, Minute, "Facebook")),
    ("instagram.com", RateRecord::new(0.00004, Minute, "Instagram")),
    ("twitter.com", RateRecord::new(0.00004, Minute, "Twitter/X")),
    ("x.com", RateRecord::new(0.00004, Minute, "X")),
    ("linkedin.com", RateRecord::new(0.00004, Minute, "LinkedIn")),
    ("tiktok.com", RateRecord::new(0.00006, Minute, "TikTok")),
    ("reddit.com", RateRecord::new(0.00003, Minute, "Reddit")),
    ("pinterest.com", RateRecord::new(0.00004, Minute, "Pinterest")),
    // Email
    ("gmail.com", RateRecord::new(0.0001, Action, "Gmail")),
    ("outlook.com", RateRecord::new(0.0001, Action, "Outlook")),
    ("mail.yahoo.com", RateRecord::new(0.0001, Action, "Yahoo Mail")),
];
