pub mod dialogs;
pub mod filter_panel;
pub mod flight_table;
pub mod gantt_chart;
pub mod registration_tab;
pub mod summary_view;
pub mod theme;
pub mod toolbar;
