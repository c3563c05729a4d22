use common::types::order_status::OrderStatus;
use common::types::records::DishDisplay;
use common::types::route::RouteQuote;

/// Label of the single advance button, mapped 1:1 from the current status.
pub fn button_label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Ready => "Accept Order",
        OrderStatus::Accepted => "Pick-Up Order",
        OrderStatus::PickedUp => "Payment Received",
        OrderStatus::Complete => "Complete Delivery",
    }
}

/// Bottom-panel readout for the current quote.
pub fn route_summary(quote: &RouteQuote) -> String {
    format!(
        "{:.0} min · {:.2} km",
        quote.duration_secs / 60.0,
        quote.distance_meters / 1000.0
    )
}

/// Everything the bottom panel needs for one render tick. Derived from the
/// session on demand, never stored.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub status: OrderStatus,
    pub button_label: &'static str,
    pub route: Option<RouteQuote>,
    pub summary: Option<String>,
    pub dishes: Vec<DishDisplay>,
    /// False until both the live position and the restaurant coordinate are
    /// known; the map shows a loading state while false.
    pub ready_to_render: bool,
}
