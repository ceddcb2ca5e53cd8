// Application layer - Use cases and business logic
pub mod chart_service;
pub mod coordinator;
pub mod map_service;
pub mod map_surface;
pub mod outlook;
pub mod popup_manager;
pub mod reconciler;
pub mod snapshot_repository;
pub mod views;
