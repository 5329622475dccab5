use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pulse_core::analysis::{analyze_deal, DealReport, Recommendation};
use pulse_core::domain::contract::AnalyzeRequest;
use pulse_core::domain::market::{comparables, normalize_location, MarketReport, MarketSnapshot};
use pulse_core::domain::pipeline::{Pipeline, PipelineDeal};
use pulse_core::domain::property::{Property, PropertyPage, PropertyQuery};

use crate::error::{ApiError, ApiJson, ApiQuery, ApiResult};
use crate::websocket::{TOPIC_PIPELINE_UPDATE, TOPIC_PROPERTY_UPDATE};
use crate::AppState;

const PROPERTY_NOT_FOUND: &str = "Property not found";

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<PropertyQuery>,
) -> ApiResult<Json<PropertyPage>> {
    let all = state.repos.properties.list().await?;
    Ok(Json(query.apply(all)))
}

fn parse_property_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("invalid property id: {raw}")))
}

async fn load_property(state: &AppState, id: Uuid) -> ApiResult<Property> {
    state
        .repos
        .properties
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(PROPERTY_NOT_FOUND.to_string()))
}

pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Property>> {
    let id = parse_property_id(&id)?;
    Ok(Json(load_property(&state, id).await?))
}

pub async fn upsert_property(
    State(state): State<Arc<AppState>>,
    ApiJson(property): ApiJson<Property>,
) -> ApiResult<(StatusCode, Json<Property>)> {
    if !(property.price.is_finite() && property.price > 0.0) {
        return Err(ApiError::BadRequest("price must be a positive amount".to_string()));
    }

    state.repos.properties.upsert(property.clone()).await?;
    state
        .ws
        .publish(TOPIC_PROPERTY_UPDATE, serde_json::to_value(&property).map_err(anyhow::Error::from)?);
    tracing::info!(property_id = %property.id, "property upserted");

    Ok((StatusCode::CREATED, Json(property)))
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub property: Property,
    pub analysis: DealReport,
    pub recommendations: Vec<Recommendation>,
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let property_id = request
        .property_id
        .ok_or_else(|| ApiError::BadRequest("propertyId is required".to_string()))?;
    let property = load_property(&state, property_id).await?;

    let input = request.validate_and_into_input(&property)?;
    let analysis = analyze_deal(&input, &state.assumptions)?;
    tracing::info!(
        %property_id,
        risk_score = analysis.metrics.risk_score,
        "deal analysis served"
    );

    Ok(Json(AnalyzeResponse {
        analysis: analysis.report(),
        recommendations: analysis.recommendations,
        property,
    }))
}

pub async fn get_pipeline(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Pipeline>> {
    let pipeline = state.repos.pipelines.get(&user_id).await?;
    Ok(Json(pipeline.unwrap_or_else(|| Pipeline::empty(user_id))))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddDealRequest {
    pub id: Option<String>,
    pub property_id: Uuid,
    pub stage: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDealRequest {
    pub deal_id: String,
    pub from_stage: String,
    pub to_stage: String,
}

#[derive(Debug, Serialize)]
pub struct PipelineResponse {
    pub success: bool,
    pub pipeline: Pipeline,
}

async fn save_pipeline(state: &AppState, pipeline: Pipeline) -> ApiResult<Json<PipelineResponse>> {
    state.repos.pipelines.upsert(pipeline.clone()).await?;
    state.ws.publish(
        TOPIC_PIPELINE_UPDATE,
        serde_json::to_value(&pipeline).map_err(anyhow::Error::from)?,
    );
    Ok(Json(PipelineResponse {
        success: true,
        pipeline,
    }))
}

pub async fn add_deal(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<AddDealRequest>,
) -> ApiResult<Json<PipelineResponse>> {
    let property = load_property(&state, request.property_id).await?;
    let stage = request.stage.as_deref().unwrap_or("lead");

    let mut deal = PipelineDeal::for_property(&property, stage, request.notes);
    if let Some(id) = request.id.filter(|id| !id.trim().is_empty()) {
        deal.id = id;
    }
    let deal_id = deal.id.clone();

    let _guard = state.pipeline_lock.lock().await;
    let mut pipeline = state
        .repos
        .pipelines
        .get(&user_id)
        .await?
        .unwrap_or_else(|| Pipeline::empty(&user_id));
    pipeline.add_deal(deal)?;

    tracing::info!(
        %user_id,
        %deal_id,
        stage,
        deals = pipeline.deal_count(),
        "deal added to pipeline"
    );
    save_pipeline(&state, pipeline).await
}

pub async fn move_deal(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ApiJson(request): ApiJson<MoveDealRequest>,
) -> ApiResult<Json<PipelineResponse>> {
    let _guard = state.pipeline_lock.lock().await;
    let mut pipeline = state
        .repos
        .pipelines
        .get(&user_id)
        .await?
        .unwrap_or_else(|| Pipeline::empty(&user_id));
    pipeline.move_deal(&request.deal_id, &request.from_stage, &request.to_stage)?;

    tracing::info!(
        %user_id,
        deal_id = %request.deal_id,
        from = %request.from_stage,
        to = %request.to_stage,
        "deal moved"
    );
    save_pipeline(&state, pipeline).await
}

pub async fn get_market(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
) -> ApiResult<Json<MarketReport>> {
    let key = normalize_location(&location);
    if key.is_empty() {
        return Err(ApiError::BadRequest("location is required".to_string()));
    }

    let snapshot = match state.repos.markets.get(&key).await? {
        Some(snapshot) => snapshot,
        None => {
            let snapshot = MarketSnapshot::generate(&key, &mut rand::thread_rng());
            state.repos.markets.upsert(snapshot.clone()).await?;
            tracing::debug!(location = %key, "generated market snapshot");
            snapshot
        }
    };

    let properties = state.repos.properties.list().await?;
    Ok(Json(MarketReport {
        comparables: comparables(&key, &properties),
        snapshot,
    }))
}
