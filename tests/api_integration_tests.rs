// API Integration Tests
//
// Purpose: Exercise every endpoint against the fixture artifacts, with JSON
// and form bodies, including the error statuses
// Run with: cargo test --features api --test api_integration_tests

#[cfg(feature = "api")]
mod api_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use crop_advisor::{create_router, AppState, CropAdvisor};
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tower::ServiceExt; // for oneshot

    fn fixture_dir() -> PathBuf {
        PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/artifacts"))
    }

    // Helper: Router over the full fixture set
    fn create_test_app() -> axum::Router {
        let state = AppState::new(&fixture_dir()).expect("fixture artifacts should load");
        create_router(state)
    }

    // Helper: Router with only the crop model loaded
    fn create_crop_only_app() -> (axum::Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        for file in ["crop_model.json", "crop_scaler.json"] {
            std::fs::copy(fixture_dir().join(file), dir.path().join(file)).unwrap();
        }
        let advisor = CropAdvisor::load(dir.path()).unwrap();
        (create_router(AppState::from_advisor(advisor)), dir)
    }

    // Helper: Parse JSON response
    async fn json_response(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        serde_json::from_slice(&body).expect("Failed to parse JSON")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn crop_body() -> Value {
        json!({
            "N": 50, "P": 40, "K": 40,
            "temperature": 25, "humidity": 60, "ph": 6.5, "rainfall": 100,
            "soil": "Clayey", "prev_crop": "wheat", "prev_duration": "short",
            "rec_duration": "short", "season": "Kharif"
        })
    }

    // =========================================================================
    // Section 1: Health Check
    // =========================================================================

    #[tokio::test]
    async fn test_health_check() {
        let response = create_test_app().oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
        assert_eq!(body["models"]["crop_classes"], 4);
        assert_eq!(body["models"]["yield_model"], true);
    }

    // =========================================================================
    // Section 2: Crop Recommendation
    // =========================================================================

    #[tokio::test]
    async fn test_recommend_crop_json() {
        let response = create_test_app()
            .oneshot(post_json("/api/crops/recommend", crop_body()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["recommended_crop"], "rice");
        let top_3 = body["top_3"].as_array().unwrap();
        assert_eq!(top_3.len(), 3);
        assert_eq!(top_3[0]["label"], "rice");
        assert_eq!(top_3[1]["label"], "maize");
        assert_eq!(top_3[2]["label"], "cotton");
    }

    #[tokio::test]
    async fn test_recommend_crop_form() {
        let form = "N=50&P=40&K=40&temperature=25&humidity=60&ph=6.5&rainfall=100\
                    &soil=Clayey&prev_crop=wheat&prev_duration=short&rec_duration=short&season=Kharif";
        let response = create_test_app()
            .oneshot(post_form("/api/crops/recommend", form))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["recommended_crop"], "rice");
    }

    #[tokio::test]
    async fn test_recommend_crop_accepts_numeric_strings() {
        let mut body = crop_body();
        body["N"] = json!("50");
        body["ph"] = json!(" 6.5 ");

        let response = create_test_app()
            .oneshot(post_json("/api/crops/recommend", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_recommend_crop_out_of_range() {
        let mut body = crop_body();
        body["rainfall"] = json!(350);

        let response = create_test_app()
            .oneshot(post_json("/api/crops/recommend", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = json_response(response).await;
        assert_eq!(body["error"], "rainfall should be in the range 0 to 300.");
    }

    #[tokio::test]
    async fn test_recommend_crop_missing_field() {
        let mut body = crop_body();
        body.as_object_mut().unwrap().remove("soil");

        let response = create_test_app()
            .oneshot(post_json("/api/crops/recommend", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = json_response(response).await;
        assert_eq!(body["error"], "Missing required field 'soil'.");
    }

    #[tokio::test]
    async fn test_recommend_crop_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/crops/recommend")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"N\": "))
            .unwrap();

        let response = create_test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = json_response(response).await;
        assert!(body["error"].is_string());
    }

    // =========================================================================
    // Section 3: Fertilizer
    // =========================================================================

    #[tokio::test]
    async fn test_recommend_fertilizer_model() {
        let body = json!({
            "N": 10, "P": 40, "K": 20, "Temperature": 22,
            "soil_type": "Loamy", "Crop": "Wheat"
        });
        let response = create_test_app()
            .oneshot(post_json("/api/fertilizers/recommend", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["fertilizer"], "DAP (Diammonium Phosphate)");
        assert_eq!(body["source"], "model");
        assert!(body["details"]["nutrient_content"].is_string());
    }

    #[tokio::test]
    async fn test_recommend_fertilizer_rules_form_defaults() {
        // Absent nutrients and temperature count as zero, so the cold rule fires
        let response = create_test_app()
            .oneshot(post_form("/api/fertilizers/rules", "soil_type=Loamy&Crop=Wheat"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["source"], "rules");
        assert_eq!(body["rule"], "cold_climate");
        assert_eq!(body["fertilizer"], "Ammonium Nitrate");
    }

    #[tokio::test]
    async fn test_recommend_fertilizer_requires_soil() {
        let response = create_test_app()
            .oneshot(post_json("/api/fertilizers/recommend", json!({"N": 10, "Crop": "Wheat"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = json_response(response).await;
        assert_eq!(body["error"], "Missing required field 'soil_type'.");
    }

    #[tokio::test]
    async fn test_fertilizer_catalog_lookup() {
        let response = create_test_app()
            .oneshot(get("/api/fertilizers/DAP%20(Diammonium%20Phosphate)"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["name"], "DAP (Diammonium Phosphate)");
        assert!(body["suitable_crops"].is_array());
    }

    #[tokio::test]
    async fn test_fertilizer_catalog_not_found() {
        let response = create_test_app()
            .oneshot(get("/api/fertilizers/Moonrock"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = json_response(response).await;
        assert_eq!(body["error"], "Fertilizer 'Moonrock' not found");
    }

    #[tokio::test]
    async fn test_fertilizer_schedule() {
        let response = create_test_app()
            .oneshot(get("/api/fertilizers/schedule?crop=Rice&stage=Flowering&type=organic"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["crop"], "Rice");
        assert_eq!(body["applied_stage"], "Flowering");
        assert_eq!(body["type"], "organic");
        assert_eq!(body["fertilizer_name"], "Fish Emulsion + Bone Meal");
    }

    #[tokio::test]
    async fn test_fertilizer_schedule_unknown_stage_falls_back() {
        let response = create_test_app()
            .oneshot(get("/api/fertilizers/schedule?crop=Maize&stage=Dormant&kind=chemical"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["stage"], "Dormant");
        assert_eq!(body["applied_stage"], "Vegetative");
        assert_eq!(body["type"], "non_organic");
        assert_eq!(body["fertilizer_name"], "Urea + MOP");
    }

    // =========================================================================
    // Section 4: Yield
    // =========================================================================

    #[tokio::test]
    async fn test_predict_yield() {
        let body = json!({
            "N": 50, "P": 40, "K": 40,
            "temperature": 25, "humidity": 60, "ph": 6.5, "rainfall": 100,
            "soil": "Loam", "season": "Rabi", "prev_crop": "maize",
            "prev_duration": "short", "crop": "wheat"
        });
        let response = create_test_app()
            .oneshot(post_json("/api/yield/predict", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["crop"], "wheat");
        assert_eq!(body["predicted_yield"], 31.73);
        assert_eq!(body["unit"], "quintals/hectare");
    }

    #[tokio::test]
    async fn test_predict_yield_without_model() {
        let (app, _dir) = create_crop_only_app();
        let body = json!({
            "N": 50, "P": 40, "K": 40,
            "temperature": 25, "humidity": 60, "ph": 6.5, "rainfall": 100,
            "soil": "Loam", "season": "Rabi", "prev_crop": "maize",
            "prev_duration": "short", "crop": "wheat"
        });
        let response = app.oneshot(post_json("/api/yield/predict", body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body: Value = json_response(response).await;
        assert_eq!(body["error"], "The yield model is not loaded on this server.");
    }

    // =========================================================================
    // Section 5: Companion Plans
    // =========================================================================

    #[tokio::test]
    async fn test_companion_plan() {
        let response = create_test_app()
            .oneshot(get("/api/companions/tomato"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = json_response(response).await;
        assert_eq!(body["main_crop"], "Tomato");
        assert_eq!(body["companions"][0], "Basil");
    }

    #[tokio::test]
    async fn test_companion_plan_not_found() {
        let response = create_test_app()
            .oneshot(get("/api/companions/quinoa"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: Value = json_response(response).await;
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("No companion plan for 'quinoa'. Available: "));
        assert!(message.contains("Tomato"));
    }
}
