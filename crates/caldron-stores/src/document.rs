//! Result document values and the edits that can be merged into them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use crate::error::{ApplyError, DocumentError};

/// One ingredient line. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    name: String,
    quantity: f64,
    unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit: unit.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Copy with quantity and/or unit replaced.
    pub fn updated(&self, quantity: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            name: self.name.clone(),
            quantity: quantity.unwrap_or(self.quantity),
            unit: unit.map(str::to_string).unwrap_or_else(|| self.unit.clone()),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.quantity, self.unit, self.name)
    }
}

/// A structured result document (a recipe, in the stock workflow).
///
/// `id` is assigned at creation and never changes; editing through
/// [`apply_edit`](Self::apply_edit) keeps it, and versioning assigns a
/// fresh one with [`with_new_id`](Self::with_new_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDocument {
    id: Uuid,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl ResultDocument {
    pub fn new(name: impl Into<String>, ingredients: Vec<Ingredient>, steps: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ingredients,
            steps,
            tags: BTreeSet::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Same content under a freshly assigned id.
    pub fn with_new_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// A draft must name itself and carry at least one ingredient and one step.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.name.trim().is_empty() {
            return Err(DocumentError::Invalid("name is empty".to_string()));
        }
        if self.ingredients.is_empty() {
            return Err(DocumentError::Invalid("no ingredients".to_string()));
        }
        if self.steps.is_empty() {
            return Err(DocumentError::Invalid("no steps".to_string()));
        }
        if let Some(bad) = self.ingredients.iter().find(|i| i.name().trim().is_empty()) {
            return Err(DocumentError::Invalid(format!(
                "ingredient with empty name ({})",
                bad
            )));
        }
        Ok(())
    }

    /// One-line form: name and id.
    pub fn tiny(&self) -> String {
        format!("{} [{}]", self.name, self.id)
    }

    /// Human-readable rendering for review.
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.name);
        out.push_str("\nIngredients:\n");
        for ingredient in &self.ingredients {
            out.push_str(&format!("- {}\n", ingredient));
        }
        out.push_str("\nSteps:\n");
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, step));
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            out.push_str(&format!("\nTags: {}\n", tags.join(", ")));
        }
        if !self.sources.is_empty() {
            out.push_str(&format!("\nSources: {}\n", self.sources.join(", ")));
        }
        out
    }

    /// Merge one edit, returning the edited copy under the same id.
    pub(crate) fn apply_edit(&self, edit: &DocumentEdit) -> Result<ResultDocument, ApplyError> {
        let mut doc = self.clone();
        match edit {
            DocumentEdit::AddIngredient { ingredient } => {
                doc.ingredients.push(ingredient.clone());
            }
            DocumentEdit::RemoveIngredient { name } => {
                let before = doc.ingredients.len();
                doc.ingredients.retain(|i| i.name() != name);
                if doc.ingredients.len() == before {
                    return Err(ApplyError::IngredientNotFound(name.clone()));
                }
            }
            DocumentEdit::UpdateIngredient {
                name,
                quantity,
                unit,
            } => {
                if quantity.is_none() && unit.is_none() {
                    return Err(ApplyError::EmptyUpdate(name.clone()));
                }
                let mut matched = false;
                for ingredient in doc.ingredients.iter_mut().filter(|i| i.name() == name) {
                    *ingredient = ingredient.updated(*quantity, unit.as_deref());
                    matched = true;
                }
                if !matched {
                    return Err(ApplyError::IngredientNotFound(name.clone()));
                }
            }
            DocumentEdit::AddStep { step } => {
                doc.steps.push(step.clone());
            }
            DocumentEdit::RemoveStep { step } => {
                let pos = doc
                    .steps
                    .iter()
                    .position(|s| s == step)
                    .ok_or_else(|| ApplyError::StepNotFound(step.clone()))?;
                doc.steps.remove(pos);
            }
            DocumentEdit::AddTag { tag } => {
                if !doc.tags.insert(tag.clone()) {
                    return Err(ApplyError::TagExists(tag.clone()));
                }
            }
            DocumentEdit::RemoveTag { tag } => {
                if !doc.tags.remove(tag) {
                    return Err(ApplyError::TagNotFound(tag.clone()));
                }
            }
        }
        Ok(doc)
    }
}

/// A single field-level edit to a result document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocumentEdit {
    AddIngredient { ingredient: Ingredient },
    RemoveIngredient { name: String },
    UpdateIngredient {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quantity: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    AddStep { step: String },
    RemoveStep { step: String },
    AddTag { tag: String },
    RemoveTag { tag: String },
}

impl fmt::Display for DocumentEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentEdit::AddIngredient { ingredient } => write!(f, "add ingredient {}", ingredient),
            DocumentEdit::RemoveIngredient { name } => write!(f, "remove ingredient {}", name),
            DocumentEdit::UpdateIngredient {
                name,
                quantity,
                unit,
            } => {
                write!(f, "update ingredient {}", name)?;
                if let Some(q) = quantity {
                    write!(f, " quantity={}", q)?;
                }
                if let Some(u) = unit {
                    write!(f, " unit={}", u)?;
                }
                Ok(())
            }
            DocumentEdit::AddStep { step } => write!(f, "add step \"{}\"", step),
            DocumentEdit::RemoveStep { step } => write!(f, "remove step \"{}\"", step),
            DocumentEdit::AddTag { tag } => write!(f, "add tag {}", tag),
            DocumentEdit::RemoveTag { tag } => write!(f, "remove tag {}", tag),
        }
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
