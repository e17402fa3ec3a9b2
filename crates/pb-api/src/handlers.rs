//! # pb-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the post catalog.

use actix_web::{web, HttpResponse};
use pb_core::{LandingLabel, PostCatalog, PostId, SortCriterion};

use crate::dto::{
    CreatePostRequest, IdResponse, LandingSlot, ListQuery, PostDetailResponse, PostListItem, PostListResponse,
    UpdatePostRequest, VoteRequest,
};
use crate::error::ApiError;
use crate::middleware::Member;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub catalog: PostCatalog,
}

type ApiResult = Result<HttpResponse, ApiError>;

pub async fn create_post(
    data: web::Data<AppState>,
    member: Member,
    body: web::Json<CreatePostRequest>,
) -> ApiResult {
    let post = data.catalog.create(member.0, body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(IdResponse { id: post.id }))
}

/// Counts as a view of the post.
pub async fn get_post(
    data: web::Data<AppState>,
    path: web::Path<PostId>,
    member: Option<Member>,
) -> ApiResult {
    let detail = data
        .catalog
        .get_detail(path.into_inner(), member.map(|m| m.0))
        .await?;
    Ok(HttpResponse::Ok().json(PostDetailResponse::from(detail)))
}

pub async fn update_post(
    data: web::Data<AppState>,
    path: web::Path<PostId>,
    member: Member,
    body: web::Json<UpdatePostRequest>,
) -> ApiResult {
    let post = data
        .catalog
        .update(path.into_inner(), body.into_inner().into(), member.0)
        .await?;
    Ok(HttpResponse::Ok().json(IdResponse { id: post.id }))
}

pub async fn delete_post(data: web::Data<AppState>, path: web::Path<PostId>, member: Member) -> ApiResult {
    data.catalog.delete(path.into_inner(), member.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// `?sorted=` selects the order; unknown or missing values give storage order.
pub async fn list_posts(data: web::Data<AppState>, query: web::Query<ListQuery>) -> ApiResult {
    let criterion = query
        .sorted
        .as_deref()
        .map_or(SortCriterion::Natural, SortCriterion::parse);
    let posts = data.catalog.list(criterion).await?;
    Ok(HttpResponse::Ok().json(PostListResponse {
        posts: posts.into_iter().map(PostListItem::from).collect(),
    }))
}

/// The landing slots in fixed order. Conditional slots the catalog left out are
/// sent with a `null` post so clients always get the same five labels.
pub async fn landing(data: web::Data<AppState>) -> ApiResult {
    let mut landing = data.catalog.landing().await?;
    if landing.is_empty() {
        return Ok(HttpResponse::Ok().json(Vec::<LandingSlot>::new()));
    }
    let slots: Vec<LandingSlot> = LandingLabel::ALL
        .into_iter()
        .map(|label| LandingSlot::new(label, landing.remove(&label)))
        .collect();
    Ok(HttpResponse::Ok().json(slots))
}

pub async fn vote(
    data: web::Data<AppState>,
    path: web::Path<PostId>,
    member: Member,
    body: web::Json<VoteRequest>,
) -> ApiResult {
    let id = path.into_inner();
    data.catalog.vote(id, member.0, body.result).await?;
    Ok(HttpResponse::Ok().json(IdResponse { id }))
}
