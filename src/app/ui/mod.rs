// src/app/ui/mod.rs
// Declares the submodules within the UI part of the TablesDesk application.

/// Functions drawing the main content panels (views) of the application.
pub mod views;

/// Functions drawing separate windows (settings, filters, columns, confirmation).
pub mod windows;

/// Reusable UI components, like the log view.
pub mod widgets;

/// Toast notifications; the application's notifier.
pub mod toasts;
