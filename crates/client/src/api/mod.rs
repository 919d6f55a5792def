//! The operation catalog, grouped by backend domain.
//!
//! Each submodule declares its [`Endpoint`](crate::Endpoint) constants and
//! the typed [`ApiClient`](crate::ApiClient) methods built on them.

pub mod admin;
pub mod auth;
pub mod leave;
pub mod salary;

use crate::endpoint::Endpoint;

/// Every endpoint of the catalog.
pub fn catalog() -> Vec<&'static Endpoint> {
    auth::ENDPOINTS
        .iter()
        .chain(leave::ENDPOINTS)
        .chain(salary::ENDPOINTS)
        .chain(admin::ENDPOINTS)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn endpoint_names_are_unique() {
        let all = catalog();
        let names: HashSet<_> = all.iter().map(|e| e.name).collect();
        assert_eq!(names.len(), all.len());
    }

    #[test]
    fn every_query_provides_a_tag() {
        for endpoint in catalog().into_iter().filter(|e| e.is_query()) {
            assert!(!endpoint.provides().is_empty(), "{} provides nothing", endpoint.name);
        }
    }
}
