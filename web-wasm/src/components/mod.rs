//! UIコンポーネント

pub mod chart;
pub mod compare_panel;
pub mod filter_modal;
pub mod header;
pub mod help_modal;
pub mod node_card;
pub mod node_modal;
pub mod progress_bar;
pub mod search_bar;
pub mod table_selection;
pub mod upload_modal;
