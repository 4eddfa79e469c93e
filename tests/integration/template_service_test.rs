//! Template Service Integration Tests

use std::sync::Arc;

use serde_json::json;
use summarizer_prompts::models::ParameterKind;
use summarizer_prompts::services::template::DEFAULT_VALUE;
use summarizer_prompts::services::NewParameter;
use summarizer_prompts::{AppError, ConfigManager, MemoryStore, Scope, TemplateService};

use super::common::tone_document;

async fn service_with(document: serde_json::Value) -> (TemplateService, ConfigManager) {
    let manager = ConfigManager::new(Arc::new(MemoryStore::new()));
    manager.import_config(document).await.unwrap();
    (TemplateService::new(manager.clone()), manager)
}

fn four_shared() -> serde_json::Value {
    let mut document = tone_document();
    let shared = json!({
        "A": {"param_name": "A", "type": "list", "values": {"a": "A"}, "order": 0},
        "B": {"param_name": "B", "type": "list", "values": {"b": "B"}, "order": 1},
        "C": {"param_name": "C", "type": "list", "values": {"c": "C"}, "order": 2},
        "D": {"param_name": "D", "type": "list", "values": {"d": "D"}, "order": 3}
    });
    document["sharedParameters"] = shared;
    document
}

#[tokio::test]
async fn test_reorder_parameter_renumbers_scope() {
    let (service, _) = service_with(four_shared()).await;
    service.reorder_parameter(&Scope::Shared, "D", 1).await.unwrap();

    let listed = service.get_parameters(&Scope::Shared).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["A", "D", "B", "C"]);
    let orders: Vec<_> = listed.iter().map(|p| p.parameter.order).collect();
    assert_eq!(orders, [Some(0), Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_delete_last_value_is_rejected() {
    let mut document = tone_document();
    document["sharedParameters"]["only"] =
        json!({"param_name": "Only", "type": "list", "values": {"solo": "Solo."}, "order": 1});
    let (service, manager) = service_with(document).await;
    let before = manager.get_config().await.unwrap();

    let err = service
        .delete_parameter_value(&Scope::Shared, "only", "solo")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Invariant(_)));
    assert!(manager.get_config().await.unwrap().is_identical(&before));
}

#[tokio::test]
async fn test_value_editing() {
    let (service, manager) = service_with(tone_document()).await;
    let shared = Scope::Shared;

    service
        .add_parameter_value(&shared, "tone", "formal", "Be formal.")
        .await
        .unwrap();
    service
        .update_parameter_value(&shared, "tone", "casual", "Be relaxed.")
        .await
        .unwrap();
    service
        .delete_parameter_value(&shared, "tone", "neutral")
        .await
        .unwrap();
    service
        .reorder_parameter_value(&shared, "tone", "formal", 0)
        .await
        .unwrap();
    service
        .update_parameter_name(&shared, "tone", "Voice")
        .await
        .unwrap();

    let config = manager.get_config().await.unwrap();
    let tone = &config.shared_parameters["tone"];
    assert_eq!(tone.param_name, "Voice");
    let values: Vec<_> = tone.values.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(values, [("formal", "Be formal."), ("casual", "Be relaxed.")]);
}

#[tokio::test]
async fn test_add_parameter_variants() {
    let (service, manager) = service_with(tone_document()).await;
    let general = Scope::from("general");

    let list_id = service
        .add_parameter(
            &general,
            NewParameter {
                param_name: "Focus".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let checkbox_id = service
        .add_parameter(
            &general,
            NewParameter {
                param_name: "Quotes".into(),
                kind: Some(ParameterKind::Checkbox),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(list_id.starts_with("param_"));
    assert_ne!(list_id, checkbox_id);

    let listed = service.get_parameters(&general).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, list_id);
    assert_eq!(listed[0].parameter.order, Some(0));
    assert_eq!(listed[1].parameter.order, Some(1));
    assert_eq!(listed[0].parameter.first_value(), Some(DEFAULT_VALUE));
    assert_eq!(listed[1].parameter.value_for("true"), Some(DEFAULT_VALUE));
    assert_eq!(listed[1].parameter.value_for("false"), Some(""));

    service.delete_parameter(&general, &list_id).await.unwrap();
    let config = manager.get_config().await.unwrap();
    assert!(!config.default_prompts["general"].parameters.contains_key(&list_id));
}

#[tokio::test]
async fn test_add_parameter_creates_missing_template() {
    let (service, manager) = service_with(tone_document()).await;
    let pdf = Scope::from("pdf");
    service
        .add_parameter(
            &pdf,
            NewParameter {
                param_name: "Pages".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let config = manager.get_config().await.unwrap();
    assert_eq!(config.default_prompts["pdf"].parameters.len(), 1);
    assert_eq!(
        config.default_prompts["pdf"].base_template,
        "Summarize the following pdf content."
    );
}

#[tokio::test]
async fn test_blank_base_template_is_rejected() {
    let (service, manager) = service_with(tone_document()).await;
    let before = manager.get_config().await.unwrap();

    let err = service.update_base_template("general", "  ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(manager.get_config().await.unwrap().is_identical(&before));
}

#[tokio::test]
async fn test_import_with_exhausted_orders_is_renumbered() {
    let mut document = tone_document();
    document["sharedParameters"]["tone"]["order"] = json!(u32::MAX);
    document["sharedParameters"]["extra"] =
        json!({"param_name": "Extra", "values": {"x": "X."}});
    let (service, _) = service_with(document).await;

    let listed = service.get_parameters(&Scope::Shared).await.unwrap();
    let orders: Vec<_> = listed
        .iter()
        .map(|p| (p.id.as_str(), p.parameter.order))
        .collect();
    assert_eq!(orders, [("tone", Some(0)), ("extra", Some(1))]);

    let id = service
        .add_parameter(
            &Scope::Shared,
            NewParameter {
                param_name: "More".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let listed = service.get_parameters(&Scope::Shared).await.unwrap();
    assert_eq!(listed.last().map(|p| p.id.as_str()), Some(id.as_str()));
    assert_eq!(listed.last().and_then(|p| p.parameter.order), Some(2));
}

#[tokio::test]
async fn test_add_parameter_after_highest_order() {
    let mut document = tone_document();
    document["sharedParameters"]["tone"]["order"] = json!(u32::MAX);
    let (service, manager) = service_with(document).await;

    let id = service
        .add_parameter(
            &Scope::Shared,
            NewParameter {
                param_name: "More".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let config = manager.get_config().await.unwrap();
    assert_eq!(config.shared_parameters["tone"].order, Some(0));
    assert_eq!(config.shared_parameters[&id].order, Some(1));
}

#[tokio::test]
async fn test_unknown_paths_are_noops() {
    let (service, manager) = service_with(tone_document()).await;
    let before = manager.get_config().await.unwrap();

    service
        .update_parameter_name(&Scope::Shared, "missing", "X")
        .await
        .unwrap();
    service.update_base_template("pdf", "Nope.").await.unwrap();
    service
        .reorder_parameter(&Scope::from("selected_text"), "missing", 0)
        .await
        .unwrap();

    assert!(manager.get_config().await.unwrap().is_identical(&before));
}
