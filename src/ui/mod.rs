pub mod breathe_page;
pub mod emergency_dialog;
pub mod export_dialog;
pub mod feeling_page;
pub mod music_page;
pub mod preferences;
pub mod strategies_page;
pub mod window;
