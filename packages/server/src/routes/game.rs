use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};

use crate::{services::game_service, state::AppState};

pub fn routes(state: AppState) -> Router {
    Router::new()
        // 出題カテゴリ一覧
        // curl http://localhost:8080/api/game/categories
        .route("/categories", get(get_categories))
        .with_state(state)
}

async fn get_categories(State(state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(game_service::categories(&state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_setup::setup_test_env;
    use axum::{body::to_bytes, body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_get_categories() {
        setup_test_env();
        let app = routes(AppState::new());

        let request = Request::builder()
            .uri("/categories")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let categories: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let names: Vec<&str> = categories
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|c| c["name"].as_str())
            .collect();
        assert!(names.contains(&"Alimentos"));
        assert!(categories[0]["wordCount"].as_u64().unwrap() > 0);
    }
}
