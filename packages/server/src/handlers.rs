//! HTTP handler functions for the rain map API.

use actix_web::{HttpResponse, web};
use rain_map_analytics::{filter_spec_from_dates, parse_categories};
use rain_map_observation_models::RainCategory;
use rain_map_server_models::{
    ApiAdvisory, ApiCategory, ApiError, ApiFilterRequest, ApiFilterResponse, ApiForecast,
    ApiHealth, ApiInsights, ApiObservation, ApiRadius, ApiStats,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let snapshot = state.engine.snapshot();
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        generation: state.engine.view().generation,
        observations: snapshot.observations.len(),
        snapshot_received_at: snapshot.received_at,
    })
}

/// `GET /api/categories`
///
/// Returns the rain category table in weight order.
pub async fn categories() -> HttpResponse {
    let table: Vec<ApiCategory> = RainCategory::all()
        .iter()
        .copied()
        .map(ApiCategory::from)
        .collect();
    HttpResponse::Ok().json(table)
}

/// `GET /api/observations`
///
/// Returns the observations passing the active filter.
pub async fn observations(state: web::Data<AppState>) -> HttpResponse {
    let view = state.engine.view();
    let body: Vec<ApiObservation> = view.filtered.iter().map(ApiObservation::from).collect();
    HttpResponse::Ok().json(body)
}

/// `GET /api/stats`
pub async fn stats(state: web::Data<AppState>) -> HttpResponse {
    let view = state.engine.view();
    HttpResponse::Ok().json(ApiStats {
        stats: view.stats.clone(),
        highest: view.highest.as_ref().map(ApiObservation::from),
    })
}

/// `GET /api/radius`
pub async fn radius(state: web::Data<AppState>) -> HttpResponse {
    let view = state.engine.view();
    HttpResponse::Ok().json(ApiRadius::new(
        view.radius,
        view.radius_band,
        view.filtered.len(),
    ))
}

/// `GET /api/insights`
pub async fn insights(state: web::Data<AppState>) -> HttpResponse {
    let view = state.engine.view();
    HttpResponse::Ok().json(ApiInsights {
        advisories: view.advisories.iter().copied().map(ApiAdvisory::from).collect(),
        severity_band: view.severity_band,
        activities: view.activities,
        outlook: view.outlook,
        outlook_message: view.outlook.message().to_string(),
    })
}

/// `GET /api/trend`
pub async fn trend(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(&state.engine.view().trend)
}

/// `GET /api/forecast`
pub async fn forecast(state: web::Data<AppState>) -> HttpResponse {
    let view = state.engine.view();
    HttpResponse::Ok().json(ApiForecast {
        available: view.current_forecast.is_some(),
        current: view.current_forecast,
        window: view.forecast_window.clone(),
    })
}

/// `POST /api/filter`
///
/// Replaces the active filter and returns a summary of the recomputed
/// view.
pub async fn set_filter(
    state: web::Data<AppState>,
    body: web::Json<ApiFilterRequest>,
) -> HttpResponse {
    let request = body.into_inner();

    let categories = match request.categories {
        None => RainCategory::all().iter().copied().collect(),
        Some(names) => match parse_categories(&names.join(",")) {
            Ok(categories) => categories,
            Err(e) => return bad_request(&e),
        },
    };

    let spec = match filter_spec_from_dates(
        request.from.as_deref(),
        request.to.as_deref(),
        categories,
        state.engine.timezone(),
    ) {
        Ok(spec) => spec,
        Err(e) => return bad_request(&e),
    };

    let view = state.engine.set_filter(spec);
    log::info!(
        "Filter updated: {} observations selected (generation {})",
        view.stats.total,
        view.generation
    );

    HttpResponse::Ok().json(ApiFilterResponse {
        generation: view.generation,
        filter: view.filter.clone(),
        total: view.stats.total,
        radius_m: view.radius,
    })
}

fn bad_request(e: &impl std::fmt::Display) -> HttpResponse {
    log::warn!("Rejected filter: {e}");
    HttpResponse::BadRequest().json(ApiError {
        error: e.to_string(),
    })
}
