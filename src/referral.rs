// src/referral.rs
//
// Affiliate codes travel as `?ref=<code>` on shareable links and are kept
// for the rest of the browsing session in the `referral_code` cookie.

use reqwest::Url;
use serde::Deserialize;

pub const REFERRAL_PARAM: &str = "ref";
pub const REFERRAL_COOKIE: &str = "referral_code";

#[derive(Debug, Deserialize)]
struct ReferralQuery {
    #[serde(rename = "ref")]
    code: Option<String>,
}

fn normalize(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

pub fn referral_from_query(query: &str) -> Option<String> {
    serde_urlencoded::from_str::<ReferralQuery>(query)
        .ok()
        .and_then(|q| q.code)
        .and_then(|code| normalize(&code))
}

/// Query parameter wins over the stored cookie value.
pub fn resolve(query: &str, cookie: Option<&str>) -> Option<String> {
    referral_from_query(query).or_else(|| cookie.and_then(normalize))
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReferralError {
    #[error("invalid link {link}: {reason}")]
    InvalidUrl { link: String, reason: String },
}

/// Rewrites a purchase link so that it carries `ref=<code>`, replacing any
/// existing referral parameter and keeping everything else.
pub fn with_referral(link: &str, code: &str) -> Result<String, ReferralError> {
    let mut url = Url::parse(link).map_err(|e| ReferralError::InvalidUrl {
        link: link.to_string(),
        reason: e.to_string(),
    })?;
    let Some(code) = normalize(code) else {
        return Ok(url.into());
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| *k != REFERRAL_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair(REFERRAL_PARAM, &code);
    }

    Ok(url.into())
}
