use crate::layout::{LinkAnnotation, PositionedFragment};

/// Find the first URL annotation whose rectangle contains the center of one
/// of the entry's fragments, scanning fragments in reading order.
///
/// Annotations without a URL are ignored.
pub fn find_entry_link<'a>(
    entry: &[PositionedFragment],
    annotations: &'a [LinkAnnotation],
) -> Option<&'a str> {
    entry.iter().find_map(|frag| {
        let center = frag.center();
        annotations
            .iter()
            .filter(|link| link.contains(center))
            .find_map(|link| link.url.as_deref())
    })
}
