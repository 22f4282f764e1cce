// src/app/ui/views/mod.rs
// Declares the view modules within the UI.

/// The table toolbar, the grid itself, pagination and the row action menu.
pub mod table_view;
