//! Processor and runner ordering

use std::sync::Arc;

use wirekit_domain::Meta;

/// `(tier, order, name)`: `PriorityOrdered` first, then `Ordered`, then the rest
pub fn order_key(meta: &Meta) -> (u8, i32, String) {
    let order = meta.order();
    let tier = if meta.is_priority_ordered() {
        0
    } else if order.is_some() {
        1
    } else {
        2
    };
    (tier, order.unwrap_or_default(), meta.name().to_string())
}

pub fn sort_by_order(metas: &mut [Arc<Meta>]) {
    metas.sort_by_cached_key(|meta| order_key(meta));
}
