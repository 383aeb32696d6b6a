//! Access group resolution.
//!
//! Computes which visitor groups may see a page's indexed content and
//! encodes them into the document's `access` field.

use std::collections::BTreeSet;

use page_indexer_shared::PageRender;
use tracing::trace;

use crate::request::RenderRequest;

/// The public/unrestricted sentinel group.
pub const PUBLIC_GROUP: u32 = 0;

/// Parse a comma-separated group list.
///
/// Tokens are trimmed and read up to the end of their leading integer
/// (`"4abc"` is `4`). Tokens without one count as `0`, so an empty list
/// yields `[0]`.
pub fn parse_group_list(raw: &str) -> Vec<i64> {
    raw.split(',').map(leading_integer).collect()
}

fn leading_integer(token: &str) -> i64 {
    let token = token.trim();
    let digits_start = usize::from(token.starts_with(['-', '+']));
    let digits_end = token[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(token.len(), |end| digits_start + end);
    token[..digits_end].parse().unwrap_or(0)
}

/// Resolve the sorted, de-duplicated set of groups that may see the page.
///
/// Unions the restrictions of rendered content elements, the page itself
/// and ancestors that extend their restriction to subpages. A real
/// restriction anywhere revokes public access. The result is narrowed to
/// the groups the acting visitor holds.
///
/// # Arguments
///
/// * `page` - The rendered page
/// * `request` - The request the page was rendered for
///
/// # Returns
///
/// Ascending group ids. Contains `0` only when the page is public and the
/// visitor holds `0`; empty when the visitor holds none of the required groups.
pub fn resolve_access_groups(page: &PageRender, request: &RenderRequest) -> Vec<u32> {
    let mut groups: Vec<i64> = request.content_access.groups().to_vec();
    groups.extend(parse_group_list(&page.fe_group));

    for ancestor in &page.ancestors {
        if ancestor.extend_to_subpages && ancestor.uid != page.id {
            groups.extend(parse_group_list(&ancestor.fe_group));
        }
    }

    let mut restriction: BTreeSet<i64> = groups.into_iter().filter(|g| *g >= 0).collect();
    if restriction.iter().any(|g| *g != PUBLIC_GROUP as i64) {
        restriction.remove(&(PUBLIC_GROUP as i64));
    }

    let visitor: BTreeSet<i64> = request.visitor_groups.iter().copied().collect();

    let resolved: Vec<u32> = restriction
        .intersection(&visitor)
        .filter_map(|g| u32::try_from(*g).ok())
        .collect();

    trace!(page_id = page.id, groups = ?resolved, "Resolved access groups");
    resolved
}

/// Comma-joined group ids, as used in document ids.
pub fn group_signature(groups: &[u32]) -> String {
    groups
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// The document `access` field: `"c:"` followed by the comma-joined groups.
pub fn access_field(groups: &[u32]) -> String {
    format!("c:{}", group_signature(groups))
}
