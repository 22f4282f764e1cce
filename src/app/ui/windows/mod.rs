// src/app/ui/windows/mod.rs
// Declares the modules for individual UI windows (Settings, Filters, Columns, Confirmation).

pub mod columns_window;
pub mod confirm_window;
pub mod filter_window;
pub mod settings_window;
