use super::*;

fn bread() -> ResultDocument {
    ResultDocument::new(
        "Flatbread",
        vec![
            Ingredient::new("flour", 500.0, "g"),
            Ingredient::new("water", 300.0, "ml"),
            Ingredient::new("salt", 1.0, "tsp"),
        ],
        vec!["Mix".to_string(), "Rest".to_string(), "Bake".to_string()],
    )
    .with_tags(["vegan"])
}

#[test]
fn test_new_assigns_unique_ids() {
    assert_ne!(bread().id(), bread().id());
}

#[test]
fn test_with_new_id_keeps_content() {
    let doc = bread();
    let copy = doc.with_new_id();
    assert_ne!(copy.id(), doc.id());
    assert_eq!(copy.name, doc.name);
    assert_eq!(copy.ingredients, doc.ingredients);
}

#[test]
fn test_validate() {
    assert!(bread().validate().is_ok());

    let no_steps = ResultDocument::new("x", vec![Ingredient::new("a", 1.0, "g")], vec![]);
    assert_eq!(
        no_steps.validate(),
        Err(DocumentError::Invalid("no steps".to_string()))
    );

    let no_ingredients = ResultDocument::new("x", vec![], vec!["Mix".to_string()]);
    assert!(no_ingredients.validate().is_err());

    let unnamed = ResultDocument::new(" ", vec![Ingredient::new("a", 1.0, "g")], vec!["s".into()]);
    assert!(unnamed.validate().is_err());
}

#[test]
fn test_add_ingredient_appends() {
    let doc = bread();
    let edit = DocumentEdit::AddIngredient {
        ingredient: Ingredient::new("yeast", 7.0, "g"),
    };
    let edited = doc.apply_edit(&edit).unwrap();
    assert_eq!(edited.id(), doc.id());
    assert_eq!(edited.ingredients.last().unwrap().name(), "yeast");
    assert_eq!(edited.ingredients.len(), 4);
}

#[test]
fn test_remove_ingredient() {
    let edited = bread()
        .apply_edit(&DocumentEdit::RemoveIngredient {
            name: "salt".to_string(),
        })
        .unwrap();
    assert!(edited.ingredients.iter().all(|i| i.name() != "salt"));

    let err = bread()
        .apply_edit(&DocumentEdit::RemoveIngredient {
            name: "sugar".to_string(),
        })
        .unwrap_err();
    assert_eq!(err, ApplyError::IngredientNotFound("sugar".to_string()));
}

#[test]
fn test_update_ingredient_partial() {
    let edited = bread()
        .apply_edit(&DocumentEdit::UpdateIngredient {
            name: "water".to_string(),
            quantity: Some(320.0),
            unit: None,
        })
        .unwrap();
    let water = edited.ingredients.iter().find(|i| i.name() == "water").unwrap();
    assert_eq!(water.quantity(), 320.0);
    assert_eq!(water.unit(), "ml");
}

#[test]
fn test_update_ingredient_requires_a_field() {
    let err = bread()
        .apply_edit(&DocumentEdit::UpdateIngredient {
            name: "water".to_string(),
            quantity: None,
            unit: None,
        })
        .unwrap_err();
    assert!(matches!(err, ApplyError::EmptyUpdate(_)));
}

#[test]
fn test_remove_step_first_match_only() {
    let mut doc = bread();
    doc.steps.push("Rest".to_string());
    let edited = doc
        .apply_edit(&DocumentEdit::RemoveStep {
            step: "Rest".to_string(),
        })
        .unwrap();
    assert_eq!(edited.steps, vec!["Mix", "Bake", "Rest"]);
}

#[test]
fn test_tags() {
    let doc = bread();
    assert!(matches!(
        doc.apply_edit(&DocumentEdit::AddTag { tag: "vegan".into() }),
        Err(ApplyError::TagExists(_))
    ));
    assert!(matches!(
        doc.apply_edit(&DocumentEdit::RemoveTag { tag: "keto".into() }),
        Err(ApplyError::TagNotFound(_))
    ));
    let edited = doc
        .apply_edit(&DocumentEdit::RemoveTag { tag: "vegan".into() })
        .unwrap();
    assert!(edited.tags.is_empty());
}

#[test]
fn test_edit_serde_tag() {
    let edit: DocumentEdit =
        serde_json::from_value(serde_json::json!({"op": "add_step", "step": "Cool"})).unwrap();
    assert_eq!(edit, DocumentEdit::AddStep { step: "Cool".into() });

    let json = serde_json::to_value(DocumentEdit::UpdateIngredient {
        name: "salt".into(),
        quantity: None,
        unit: Some("g".into()),
    })
    .unwrap();
    assert_eq!(json["op"], "update_ingredient");
    assert!(json.get("quantity").is_none());
}

#[test]
fn test_document_defaults_on_deserialize() {
    let doc = bread();
    let mut json = serde_json::to_value(&doc).unwrap();
    let obj = json.as_object_mut().unwrap();
    obj.remove("tags");
    obj.remove("sources");
    let parsed: ResultDocument = serde_json::from_value(json).unwrap();
    assert!(parsed.tags.is_empty());
    assert_eq!(parsed.id(), doc.id());
}

#[test]
fn test_render() {
    let text = bread().render();
    assert!(text.starts_with("Flatbread"));
    assert!(text.contains("- 500 g flour"));
    assert!(text.contains("3. Bake"));
    assert!(text.contains("Tags: vegan"));
}
