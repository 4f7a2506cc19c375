pub mod handlers;
pub mod recorder;

pub use handlers::{link_click_handler, qr_scan_handler, social_click_handler};
pub use recorder::{record_event, record_event_at, Event};
