use std::collections::HashMap;

use common::logger::Logger;
use common::types::records::{DishDisplay, DishRecord};

use crate::providers::store::OrderStore;

/// Resolves the order's line items into display entries, one store lookup
/// per unique dish id. A lookup miss or per-item store error omits that
/// entry and logs it; resolution as a whole never fails.
pub async fn resolve_dishes(
    store: &dyn OrderStore,
    order_id: &str,
    logger: &Logger,
) -> Vec<DishDisplay> {
    let items = match store.line_items(order_id).await {
        Ok(items) => items,
        Err(e) => {
            logger.warn(format!("line items unavailable for order {order_id}: {e}"));
            return Vec::new();
        }
    };

    let mut cache: HashMap<String, Option<DishRecord>> = HashMap::new();
    let mut displays = Vec::with_capacity(items.len());
    for item in items {
        if !cache.contains_key(&item.dish_id) {
            let looked_up = match store.dish(&item.dish_id).await {
                Ok(found) => found,
                Err(e) => {
                    logger.warn(format!("dish {} lookup failed: {e}", item.dish_id));
                    None
                }
            };
            if looked_up.is_none() {
                logger.warn(format!(
                    "dish {} not found, omitting from order {order_id}",
                    item.dish_id
                ));
            }
            cache.insert(item.dish_id.clone(), looked_up);
        }
        if let Some(Some(dish)) = cache.get(&item.dish_id) {
            displays.push(DishDisplay::new(dish.name.clone(), item.quantity));
        }
    }
    displays
}
