use crate::registry::ResourceKey;
use crate::types::Resource;

/// Trailing numeric id of a resource URL (`.../people/1/` -> `1`).
pub fn extract_id_from_url(url: &str) -> Option<u64> {
    let trimmed = url.strip_suffix('/').unwrap_or(url);
    let (_, last) = trimmed.rsplit_once('/')?;
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    last.parse().ok()
}

/// Attached id if present, otherwise whatever the URL yields.
pub fn resource_id<T: Resource>(item: &T) -> Option<u64> {
    item.explicit_id().or_else(|| extract_id_from_url(item.url()))
}

pub fn seed_prefix(key: ResourceKey) -> &'static str {
    match key {
        ResourceKey::People => "person",
        ResourceKey::Films => "film",
        ResourceKey::Planets => "planet",
        ResourceKey::Starships => "starship",
    }
}

/// Deterministic placeholder-image seed: `<kind>-<id>` or `<kind>-<name>`.
pub fn seed_for<T: Resource>(item: &T) -> String {
    let prefix = seed_prefix(T::KEY);
    match resource_id(item) {
        Some(id) => format!("{prefix}-{id}"),
        None => format!("{prefix}-{}", item.display_name()),
    }
}
