pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{
    export, inventory, metrics, notifications, pairing, partners, profile, recommendations,
    restaurant,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Inventory
        .route(
            "/api/wines",
            get(inventory::handlers::handle_list_wines).post(inventory::handlers::handle_create_wine),
        )
        .route(
            "/api/wines/:id",
            get(inventory::handlers::handle_get_wine)
                .put(inventory::handlers::handle_update_wine)
                .delete(inventory::handlers::handle_delete_wine),
        )
        .route(
            "/api/wines/:id/consume",
            post(inventory::handlers::handle_consume_wine),
        )
        .route(
            "/api/consumption",
            get(inventory::handlers::handle_consumption_history),
        )
        // Taste profile
        .route(
            "/api/profile",
            get(profile::handlers::handle_get_profile).put(profile::handlers::handle_put_profile),
        )
        .route("/api/profile/map", post(profile::handlers::handle_map_profile))
        .route(
            "/api/profile/preview",
            post(profile::handlers::handle_preview_profile),
        )
        // Pairing and restaurant lists
        .route(
            "/api/food-pairing",
            post(pairing::handlers::handle_food_pairing),
        )
        .route(
            "/api/restaurant/analyze",
            post(restaurant::handlers::handle_analyze),
        )
        // Recommendations
        .route(
            "/api/recommendations",
            get(recommendations::handlers::handle_history)
                .post(recommendations::handlers::handle_generate),
        )
        .route(
            "/api/recommendations/:id/feedback",
            patch(recommendations::handlers::handle_feedback),
        )
        // Notifications
        .route(
            "/api/notifications",
            get(notifications::handlers::handle_list),
        )
        .route(
            "/api/notifications/:id/read",
            patch(notifications::handlers::handle_mark_read),
        )
        .route(
            "/api/notifications/alerts",
            get(notifications::handlers::handle_live_alerts),
        )
        .route(
            "/api/notifications/preferences",
            get(notifications::handlers::handle_get_preferences)
                .put(notifications::handlers::handle_put_preferences)
                .patch(notifications::handlers::handle_patch_preferences),
        )
        .route(
            "/api/notifications/process",
            post(notifications::handlers::handle_process),
        )
        // Partners
        .route(
            "/api/partners",
            get(partners::handlers::handle_list_partners)
                .post(partners::handlers::handle_create_partner),
        )
        .route(
            "/api/partners/:id",
            delete(partners::handlers::handle_delete_partner),
        )
        // Export and metrics
        .route(
            "/api/export/cellar",
            get(export::handlers::handle_export_cellar),
        )
        .route(
            "/api/metrics/digest",
            get(metrics::handlers::handle_metrics_digest),
        )
        .with_state(state)
}
