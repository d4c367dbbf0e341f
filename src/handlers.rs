use crate::counter::{describe_last_action, increment, reset, totals};
use crate::errors::AppError;
use crate::input::{ChordAction, ChordMapper, KeyEvent};
use crate::models::{
    CategoryCounts, CategoryId, CounterState, CountsResponse, Direction, IncrementRequest, KeyRequest,
    ResetRequest,
};
use crate::state::AppState;
use crate::storage::{CookiePersistence, restore};
use crate::ui::{render_counter, render_index};
use crate::variants::{self, RESET_LABEL, Variant};
use axum::{
    Form, Json,
    extract::{Path, State},
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_PAGE_ID_LEN: usize = 64;

pub async fn index() -> Html<String> {
    Html(render_index())
}

pub async fn page(Path(slug): Path<String>, jar: CookieJar) -> Result<Html<String>, AppError> {
    let variant = resolve(&slug)?;
    let counts = CookiePersistence::pre_render(variant).load(&jar);
    let page_id = Uuid::new_v4().to_string();
    Ok(Html(render_counter(variant, &counts, &page_id)))
}

pub async fn get_counts(Path(slug): Path<String>, jar: CookieJar) -> Result<Json<CountsResponse>, AppError> {
    let variant = resolve(&slug)?;
    let counts = CookiePersistence::interactive(variant).load(&jar);
    Ok(Json(to_response(variant, &counts, None)))
}

pub async fn increment_json(
    Path(slug): Path<String>,
    jar: CookieJar,
    Json(payload): Json<IncrementRequest>,
) -> Result<(CookieJar, Json<CountsResponse>), AppError> {
    let variant = resolve(&slug)?;
    let (jar, response) = apply_increment(variant, jar, &payload)?;
    Ok((jar, Json(response)))
}

pub async fn increment_form(
    Path(slug): Path<String>,
    jar: CookieJar,
    Form(payload): Form<IncrementRequest>,
) -> Result<(CookieJar, Redirect), AppError> {
    let variant = resolve(&slug)?;
    let (jar, _) = apply_increment(variant, jar, &payload)?;
    Ok((jar, Redirect::to(&page_path(variant))))
}

pub async fn reset_json(
    Path(slug): Path<String>,
    jar: CookieJar,
    payload: Option<Json<ResetRequest>>,
) -> Result<(CookieJar, Json<CountsResponse>), AppError> {
    let variant = resolve(&slug)?;
    let Json(payload) = payload.unwrap_or_default();
    let current = current_counts(variant, &jar, payload.counts.as_ref());
    let (jar, response) = apply_action(variant, jar, &current, ChordAction::Reset);
    Ok((jar, Json(response)))
}

pub async fn reset_form(Path(slug): Path<String>, jar: CookieJar) -> Result<(CookieJar, Redirect), AppError> {
    let variant = resolve(&slug)?;
    let current = current_counts(variant, &jar, None);
    let (jar, _) = apply_action(variant, jar, &current, ChordAction::Reset);
    Ok((jar, Redirect::to(&page_path(variant))))
}

pub async fn key_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Json(payload): Json<KeyRequest>,
) -> Result<(CookieJar, Json<CountsResponse>), AppError> {
    let variant = resolve(&slug)?;
    let page = payload.page.trim();
    if page.is_empty() || page.len() > MAX_PAGE_ID_LEN {
        return Err(AppError::bad_request("page must be the id the counter page was rendered with"));
    }
    let event = KeyEvent::parse(&payload.event, &payload.key)
        .ok_or_else(|| AppError::bad_request("event must be 'down', 'up' or 'blur'"))?;

    let action = {
        let mut sessions = state.sessions.lock().await;
        let repeat = state.config.key_repeat;
        let mapper = sessions.mapper(page, variant, || {
            ChordMapper::new(&variant.bindings, variant.first_category(), repeat)
        });
        mapper.handle(event)
    };

    let current = current_counts(variant, &jar, payload.counts.as_ref());
    match action {
        Some(action) => {
            debug!(variant = variant.slug, ?action, "key chord fired");
            let (jar, response) = apply_action(variant, jar, &current, action);
            Ok((jar, Json(response)))
        }
        None => Ok((jar, Json(to_response(variant, &current, None)))),
    }
}

/// The counts the page holds in memory win over the snapshot cookie, so
/// counting keeps working when the browser drops cookies.
fn current_counts(variant: &'static Variant, jar: &CookieJar, sent: Option<&Value>) -> CounterState {
    let persistence = CookiePersistence::interactive(variant);
    let Some(sent) = sent else {
        return persistence.load(jar);
    };

    match restore(sent, variant) {
        Ok(restored) => restored.state,
        Err(err) => {
            warn!(variant = variant.slug, "ignoring counts sent by the page: {err}");
            persistence.load(jar)
        }
    }
}

fn apply_increment(
    variant: &'static Variant,
    jar: CookieJar,
    payload: &IncrementRequest,
) -> Result<(CookieJar, CountsResponse), AppError> {
    let category = parse_category(&payload.category)
        .filter(|category| variant.category(*category).is_some())
        .ok_or_else(|| {
            AppError::bad_request(format!(
                "category must be one of the categories configured for {}",
                variant.slug
            ))
        })?;
    let direction: Direction = payload
        .direction
        .as_str()
        .unwrap_or_default()
        .parse()
        .map_err(AppError::bad_request)?;

    let current = current_counts(variant, &jar, payload.counts.as_ref());
    Ok(apply_action(variant, jar, &current, ChordAction::Increment { category, direction }))
}

/// Accepts a JSON number or, for form posts, a numeric string.
fn parse_category(value: &Value) -> Option<CategoryId> {
    let raw = match value {
        Value::Number(number) => number.as_u64()?,
        Value::String(text) => text.trim().parse().ok()?,
        _ => return None,
    };
    u8::try_from(raw).ok().map(CategoryId)
}

fn apply_action(
    variant: &'static Variant,
    jar: CookieJar,
    current: &CounterState,
    action: ChordAction,
) -> (CookieJar, CountsResponse) {
    let (next, label) = match action {
        ChordAction::Increment { category, direction } => (
            increment(current, category, direction),
            describe_last_action(variant, category, direction),
        ),
        ChordAction::Reset => (reset(variant), RESET_LABEL.to_string()),
    };

    let jar = CookiePersistence::interactive(variant).save(jar, &next);
    (jar, to_response(variant, &next, Some(label)))
}

fn resolve(slug: &str) -> Result<&'static Variant, AppError> {
    variants::by_slug(slug).ok_or_else(|| AppError::not_found(format!("unknown counter '{slug}'")))
}

fn page_path(variant: &Variant) -> String {
    format!("/{}", variant.slug)
}

pub fn to_response(variant: &Variant, counts: &CounterState, last_action: Option<String>) -> CountsResponse {
    let categories = variant
        .categories
        .iter()
        .map(|category| {
            let entry = counts.get(category.id).copied().unwrap_or_default();
            CategoryCounts {
                id: category.id,
                name: category.name.to_string(),
                incoming: entry.incoming,
                outgoing: entry.outgoing,
            }
        })
        .collect();

    CountsResponse {
        variant: variant.slug.to_string(),
        title: variant.title.to_string(),
        categories,
        totals: totals(counts),
        last_action,
        counts: counts.clone(),
    }
}
