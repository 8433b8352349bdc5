//! Table names and column conventions of the hosted data store.
//!
//! Pure string constants with no client dependency. These define the canonical
//! layout the PostgREST repository talks to.

pub const ASSESSMENTS: &str = "assessments";

pub const ASSESSMENT_RESULTS: &str = "assessment_results";

pub const ORDERS: &str = "orders";

pub const FRIEND_SHARES: &str = "friend_assessment_shares";

/// Unique column orders are upserted on.
pub const ORDER_CONFLICT_COLUMN: &str = "checkout_session_id";

/// PostgREST equality filter value, used as `?<column>=eq.<value>`.
pub fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// Path of a table under the REST root.
pub fn rest_path(table: &str) -> String {
    format!("/rest/v1/{table}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_filter_formats_value() {
        assert_eq!(eq(42), "eq.42");
        assert_eq!(eq("a@b.co"), "eq.a@b.co");
    }

    #[test]
    fn rest_path_is_under_v1() {
        assert_eq!(rest_path(ORDERS), "/rest/v1/orders");
    }
}
