use axum::{http::StatusCode, Json};
use chrono::Utc;
use serde_json::json;

/// Fixed-window counter in Redis.
///
/// Each window gets its own key (`{key}:{window index}`), bumped and given a
/// TTL in one atomic pipeline, so the counter can never outlive its window.
/// Returns 429 once the count for the current window exceeds `max_attempts`.
/// When Redis is unreachable the request is let through.
pub async fn check_rate_limit(
    redis: &mut redis::aio::MultiplexedConnection,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), (StatusCode, Json<serde_json::Value>)> {
    let window_key = window_key(key, Utc::now().timestamp(), window_secs);

    let counted: redis::RedisResult<(u64,)> = redis::pipe()
        .atomic()
        .incr(&window_key, 1)
        .expire(&window_key, window_secs as i64)
        .ignore()
        .query_async(redis)
        .await;
    let (count,) = counted.unwrap_or((0,));

    if exceeded(count, max_attempts) {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "Too many requests. Try again in a minute." })),
        ));
    }

    Ok(())
}

fn window_key(key: &str, now_secs: i64, window_secs: u64) -> String {
    let window = now_secs.max(0) as u64 / window_secs.max(1);
    format!("{key}:{window}")
}

fn exceeded(count: u64, max_attempts: u64) -> bool {
    count > max_attempts
}

/// Redis key of the per-user rating write counter.
pub fn rating_key(user_id: &str) -> String {
    format!("ratelimit:rating:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exceeded() {
        assert!(!exceeded(0, 30));
        assert!(!exceeded(30, 30));
        assert!(exceeded(31, 30));
    }

    #[test]
    fn test_window_key() {
        assert_eq!(window_key("k", 119, 60), "k:1");
        assert_eq!(window_key("k", 120, 60), "k:2");
        assert_eq!(window_key("k", 5, 0), "k:5");
    }

    #[test]
    fn test_rating_key() {
        assert_eq!(rating_key("abc"), "ratelimit:rating:abc");
    }
}
