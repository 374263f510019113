use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use engine::{Engine, FoodRecord};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod generate;

use generate::{ChatTurn, GenerateClient, GenerateError, MealPlanDoc, PlanRequest};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub generate: Option<Arc<GenerateClient>>,
}

/// Assemble the router over an engine built before the server accepts
/// requests. The engine is immutable and shared by reference; a future
/// dataset reload must swap in a whole new `Arc<Engine>` rather than
/// mutate this one.
pub fn build_app(engine: Arc<Engine>, generate: Option<Arc<GenerateClient>>) -> Router {
    let state = AppState { engine, generate };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/nutrition-analysis", post(nutrition_analysis))
        .route("/food-recommendations", post(food_recommendations))
        .route("/food-alternatives", post(food_alternatives))
        .route("/bulk-food-data", post(bulk_food_data))
        .route("/image-analysis", post(image_analysis))
        .route("/food-categories", get(food_categories))
        .route("/health-stats", get(health_stats))
        .route("/search/:query", get(quick_search))
        .route("/chat", post(chat))
        .route("/generate-meal-plan", post(generate_meal_plan))
        .route("/optimize-plan", post(optimize_plan))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Deserialize)]
pub struct NutritionAnalysisRequest {
    pub food_name: String,
    #[serde(default = "default_portion")]
    pub portion_size: f64,
}

fn default_portion() -> f64 {
    1.0
}

#[derive(Deserialize)]
pub struct BulkRequest {
    pub foods: Vec<String>,
    #[serde(default)]
    pub preferences: Option<Value>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

#[derive(Deserialize)]
pub struct OptimizePlanRequest {
    pub plan: MealPlanDoc,
}

fn record_with_score(record: &FoodRecord, score: f32) -> Value {
    let mut value = serde_json::to_value(record).unwrap_or_default();
    if let Value::Object(map) = &mut value {
        map.insert("similarity_score".into(), json!(score));
    }
    value
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Food matching service is running",
        "status": "healthy",
        "endpoints": {
            "nutrition_analysis": "/nutrition-analysis",
            "food_recommendations": "/food-recommendations",
            "food_alternatives": "/food-alternatives",
            "bulk_analysis": "/bulk-food-data",
            "image_analysis": "/image-analysis",
            "health_stats": "/health-stats",
            "food_categories": "/food-categories",
            "quick_search": "/search/{query}",
            "chat": "/chat",
            "meal_plan": "/generate-meal-plan",
            "optimize_plan": "/optimize-plan",
        },
        "dataset_info": {
            "total_foods": state.engine.corpus().len(),
            "model_ready": state.engine.index_ready(),
        },
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "dataset_loaded": !state.engine.corpus().is_empty(),
        "model_ready": state.engine.index_ready(),
    }))
}

async fn nutrition_analysis(
    State(state): State<AppState>,
    Json(request): Json<NutritionAnalysisRequest>,
) -> Json<Value> {
    let Some(m) = state.engine.resolve(&request.food_name) else {
        return Json(not_found_payload(
            &request.food_name,
            format!(
                "Could not find nutrition information for '{}'",
                request.food_name
            ),
        ));
    };
    let portion = request.portion_size;
    let r = m.record;
    Json(json!({
        "status": "ok",
        "result": {
            "food_name": r.name,
            "portion_size": portion,
            "nutrition": {
                "calories": r.calories * portion,
                "sugar_g": r.sugar_g * portion,
                "fat_g": r.fat_g * portion,
                "carbs_g": r.carbs_g * portion,
                "protein_g": r.protein_g * portion,
            },
            "health_info": {
                "calories_saved": r.calories_saved * portion,
                "risky_for": r.risky_for,
                "category": r.category.as_deref().unwrap_or("Unknown"),
            },
        },
    }))
}

async fn food_recommendations(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Value> {
    let hits = state.engine.recommend(&request.query, 5);
    if hits.is_empty() {
        return Json(not_found_payload(
            &request.query,
            format!("No food recommendations found for '{}'", request.query),
        ));
    }
    let results: Vec<Value> = hits
        .iter()
        .map(|m| record_with_score(m.record, m.score))
        .collect();
    Json(json!({
        "status": "ok",
        "query": request.query,
        "count": results.len(),
        "results": results,
    }))
}

async fn food_alternatives(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Json<Value> {
    let report = state.engine.alternatives(&request.query);
    Json(json!({
        "status": "ok",
        "query": request.query,
        "current_food": report.current,
        "alternatives": report.alternatives,
        "count": report.alternatives.len(),
    }))
}

async fn bulk_food_data(
    State(state): State<AppState>,
    Json(request): Json<BulkRequest>,
) -> Json<Value> {
    let report = state.engine.bulk_resolve(&request.foods);
    Json(json!({
        "status": "ok",
        "found_count": report.found.len(),
        "not_found_count": report.not_found.len(),
        "results": report.found,
        "not_found": report.not_found,
        "total_nutrition": report.totals,
        "preferences": request.preferences,
    }))
}

// Image-based recognition is an explicit non-goal; the route exists so
// clients get a stable answer instead of a 404.
async fn image_analysis() -> Json<Value> {
    Json(json!({
        "status": "not_implemented",
        "message": "Image analysis is not available",
        "suggestion": "Use text input instead",
    }))
}

async fn food_categories(State(state): State<AppState>) -> Json<Value> {
    let listing = state.engine.categories();
    Json(json!({
        "status": "ok",
        "total_categories": listing.names.len(),
        "categories": listing.names,
        "category_counts": listing.counts,
    }))
}

async fn health_stats(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "stats": state.engine.stats(),
    }))
}

async fn quick_search(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Json<Value> {
    let results = state.engine.quick_search(&query);
    Json(json!({
        "status": "ok",
        "query": query,
        "count": results.len(),
        "results": results,
    }))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let client = require_generate(&state)?;
    let reply = client
        .chat(&request.message, &request.history)
        .await
        .map_err(generate_error)?;
    Ok(Json(json!({ "status": "ok", "reply": reply })))
}

async fn generate_meal_plan(
    State(state): State<AppState>,
    Json(request): Json<PlanRequest>,
) -> Result<Json<MealPlanDoc>, (StatusCode, String)> {
    let client = require_generate(&state)?;
    let plan = client.meal_plan(&request).await.map_err(generate_error)?;
    Ok(Json(plan))
}

/// Enrich an externally generated plan: each meal slot gets the engine's
/// high-confidence substitute suggestion when one exists.
async fn optimize_plan(
    State(state): State<AppState>,
    Json(request): Json<OptimizePlanRequest>,
) -> Json<MealPlanDoc> {
    let mut doc = request.plan;
    for meal in [
        &mut doc.plan.breakfast,
        &mut doc.plan.lunch,
        &mut doc.plan.dinner,
    ] {
        meal.suggestion = state.engine.optimized_suggestion(&meal.name);
    }
    Json(doc)
}

fn not_found_payload(query: &str, message: String) -> Value {
    json!({
        "status": "not_found",
        "message": message,
        "query": query,
        "suggestions": [
            "Try using more specific food names",
            "Check spelling",
            "Use common food names like 'chicken breast' instead of 'chicken'",
        ],
    })
}

fn require_generate(state: &AppState) -> Result<Arc<GenerateClient>, (StatusCode, String)> {
    state.generate.clone().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        "generative service is not configured".to_string(),
    ))
}

fn generate_error(err: GenerateError) -> (StatusCode, String) {
    tracing::error!(error = %err, "generative service call failed");
    (StatusCode::BAD_GATEWAY, err.to_string())
}
