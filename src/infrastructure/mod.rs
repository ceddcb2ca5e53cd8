// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_response;
pub mod json_repository;
pub mod map_scene;
pub mod plot_mapper;
