// Field aliases per logical attribute, as JSON pointers. Within each list,
// top-level aliases come before nested ones; the first present, non-null,
// well-typed candidate wins.

use serde_json::Value;

pub const ID: &[&str] = &[
    "/id",
    "/id_str",
    "/postId",
    "/post_id",
    "/tweetId",
    "/videoId",
    "/shortCode",
];

pub const AUTHOR: &[&str] = &[
    "/author",
    "/ownerUsername",
    "/username",
    "/userName",
    "/channelName",
    "/pageName",
    "/authorMeta/name",
    "/authorMeta/nickName",
    "/author/userName",
    "/author/name",
    "/user/screen_name",
    "/user/name",
];

pub const CONTENT: &[&str] = &[
    "/text",
    "/full_text",
    "/desc",
    "/caption",
    "/description",
    "/message",
    "/snippet",
    "/title",
];

pub const URL: &[&str] = &["/url", "/webVideoUrl", "/postUrl", "/link", "/permalink"];

pub const TIMESTAMP: &[&str] = &[
    "/createTimeISO",
    "/createTime",
    "/created_at",
    "/createdAt",
    "/timestamp",
    "/time",
    "/date",
    "/publishedAt",
    "/uploadDate",
];

pub const LIKES: &[&str] = &[
    "/likeCount",
    "/diggCount",
    "/favoriteCount",
    "/likesCount",
    "/likes",
    "/reactionsCount",
    "/stats/likeCount",
    "/stats/diggCount",
    "/public_metrics/like_count",
    "/statistics/likeCount",
];

pub const COMMENTS: &[&str] = &[
    "/commentCount",
    "/commentsCount",
    "/replyCount",
    "/comments",
    "/stats/commentCount",
    "/public_metrics/reply_count",
    "/statistics/commentCount",
];

pub const SHARES: &[&str] = &[
    "/shareCount",
    "/retweetCount",
    "/sharesCount",
    "/shares",
    "/stats/shareCount",
    "/public_metrics/retweet_count",
];

pub const VIEWS: &[&str] = &[
    "/playCount",
    "/viewCount",
    "/videoViewCount",
    "/videoPlayCount",
    "/views",
    "/stats/playCount",
    "/public_metrics/impression_count",
    "/statistics/viewCount",
];

/// First candidate that is a non-blank string.
pub fn first_str<'a>(item: &'a Value, candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|ptr| item.pointer(ptr)?.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First candidate usable as an identifier: a non-blank string or an integer.
pub fn first_id(item: &Value, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|ptr| match item.pointer(ptr)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.is_u64() || n.is_i64() => Some(n.to_string()),
        _ => None,
    })
}

/// First candidate that parses as a non-negative count. Missing everywhere is 0.
pub fn first_count(item: &Value, candidates: &[&str]) -> u64 {
    candidates
        .iter()
        .find_map(|ptr| parse_count(item.pointer(ptr)?))
        .unwrap_or(0)
}

/// First candidate accepted by `parse`.
pub fn first_parsed<T>(
    item: &Value,
    candidates: &[&str],
    parse: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    candidates
        .iter()
        .find_map(|ptr| item.pointer(ptr).and_then(&parse))
}

/// Counts arrive as integers, floats, or strings like `"1,204"` and `"3.4K"`.
/// Negative and non-numeric values are rejected.
pub fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Some(u)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            }
        }
        Value::String(s) => parse_count_str(s),
        _ => None,
    }
}

fn parse_count_str(s: &str) -> Option<u64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' | 'M' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'b' | 'B' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    if let Ok(u) = digits.parse::<u64>() {
        return Some(u.saturating_mul(multiplier as u64));
    }
    digits
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| (f * multiplier).round() as u64)
}
