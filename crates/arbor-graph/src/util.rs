//! JSON argument plumbing shared by loaders, mutators, and resolvers.

use serde_json::Value;

use arbor_core::error::AppError;
use arbor_core::result::AppResult;

/// Extracts a required integer argument.
pub(crate) fn arg_i64(args: &Value, key: &str) -> AppResult<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::validation(format!("missing integer argument '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_i64() {
        assert_eq!(arg_i64(&json!({"id": 3}), "id").unwrap(), 3);
        assert!(arg_i64(&json!({"id": "3"}), "id").is_err());
        assert!(arg_i64(&Value::Null, "id").is_err());
    }
}
