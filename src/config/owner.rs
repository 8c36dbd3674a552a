//! Owner configuration - which salon account this process works for.
//!
//! Every stored record carries an `owner_id`. A deployment serves one salon,
//! selected with `SALON_OWNER_ID` in the environment or the `.env` file.

/// Owner id used when `SALON_OWNER_ID` is not set.
pub const DEFAULT_OWNER_ID: &str = "default";

/// Gets the configured owner id.
///
/// Reads `SALON_OWNER_ID`; blank or missing values fall back to
/// [`DEFAULT_OWNER_ID`].
#[must_use]
pub fn get_owner_id() -> String {
    owner_id_from(std::env::var("SALON_OWNER_ID").ok())
}

fn owner_id_from(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER_ID.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_id_falls_back_to_default() {
        assert_eq!(owner_id_from(None), DEFAULT_OWNER_ID);
        assert_eq!(owner_id_from(Some("   ".to_string())), DEFAULT_OWNER_ID);
    }

    #[test]
    fn test_owner_id_is_trimmed() {
        assert_eq!(owner_id_from(Some(" salon-brno ".to_string())), "salon-brno");
    }
}
