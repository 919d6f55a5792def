//! Static description of a backend operation.

use crate::cache::Tag;
use crate::request::{ApiRequest, HttpMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Read; the result is cached under `provides`.
    Query { provides: &'static [Tag] },
    /// Write; on success every tag in `invalidates` turns stale.
    Mutation { invalidates: &'static [Tag] },
}

/// One named operation of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub name: &'static str,
    pub method: HttpMethod,
    /// Path template; `{id}` placeholders are filled by [`Endpoint::path_with`].
    pub path: &'static str,
    pub kind: EndpointKind,
}

impl Endpoint {
    pub const fn query(name: &'static str, method: HttpMethod, path: &'static str, provides: &'static [Tag]) -> Self {
        Self {
            name,
            method,
            path,
            kind: EndpointKind::Query { provides },
        }
    }

    pub const fn mutation(
        name: &'static str,
        method: HttpMethod,
        path: &'static str,
        invalidates: &'static [Tag],
    ) -> Self {
        Self {
            name,
            method,
            path,
            kind: EndpointKind::Mutation { invalidates },
        }
    }

    pub fn is_query(&self) -> bool {
        matches!(self.kind, EndpointKind::Query { .. })
    }

    pub fn provides(&self) -> &'static [Tag] {
        match self.kind {
            EndpointKind::Query { provides } => provides,
            EndpointKind::Mutation { .. } => &[],
        }
    }

    pub fn invalidates(&self) -> &'static [Tag] {
        match self.kind {
            EndpointKind::Mutation { invalidates } => invalidates,
            EndpointKind::Query { .. } => &[],
        }
    }

    /// Fill `{..}` placeholders left to right.
    ///
    /// Surplus parameters are ignored; missing ones leave the placeholder in
    /// place, which the backend answers with 404.
    pub fn path_with(&self, params: &[&str]) -> String {
        let mut out = String::with_capacity(self.path.len() + params.iter().map(|p| p.len()).sum::<usize>());
        let mut rest = self.path;
        let mut params = params.iter();

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            let Some(value) = params.next() else {
                break;
            };
            out.push_str(&rest[..open]);
            out.push_str(value);
            rest = &rest[open + close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// Request with no path parameters.
    pub fn request(&self) -> ApiRequest {
        ApiRequest::new(self.method, self.path)
    }

    /// Request with path parameters filled in.
    pub fn request_with(&self, params: &[&str]) -> ApiRequest {
        ApiRequest::new(self.method, self.path_with(params))
    }
}
