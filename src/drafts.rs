//! "Add resource" forms. Submissions are validated and logged, never sent.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::error::DraftError;
use crate::registry::ResourceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    TextArea,
    Number,
    Select,
    MultiSelect,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn field(key: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField { key, label, kind }
}

use FieldKind::*;

const PEOPLE_FORM: &[FormField] = &[
    field("name", "Name", Text),
    field("height", "Größe", Number),
    field("mass", "Gewicht", Number),
    field("hair_color", "Haarfarbe", Select),
    field("skin_color", "Hautfarbe", Text),
    field("eye_color", "Augenfarbe", Text),
    field("birth_year", "Geburtsjahr", Text),
    field("gender", "Geschlecht", Select),
    field("homeworld", "Heimatplanet", Select),
    field("films", "Filme", MultiSelect),
];

const FILMS_FORM: &[FormField] = &[
    field("title", "Titel", Text),
    field("episode_id", "Episode", Number),
    field("release_date", "Veröffentlichungsdatum", Text),
    field("opening_crawl", "Lauftext", TextArea),
    field("director", "Regisseur", Text),
    field("producer", "Produzent", Text),
    field("characters", "Personen", MultiSelect),
    field("planets", "Planeten", MultiSelect),
];

const PLANETS_FORM: &[FormField] = &[
    field("name", "Name", Text),
    field("climate", "Klima", MultiSelect),
    field("terrain", "Terrain", MultiSelect),
    field("population", "Bevölkerung", Number),
    field("rotation_period", "Rotationsdauer", Number),
    field("orbital_period", "Umlaufzeit", Number),
    field("diameter", "Durchmesser", Number),
    field("gravity", "Schwerkraft", Number),
    field("surface_water", "Wasserbedeckung", Number),
    field("residents", "Bewohner", MultiSelect),
    field("films", "Filme", MultiSelect),
];

const STARSHIPS_FORM: &[FormField] = &[
    field("name", "Name", Text),
    field("model", "Modell", Text),
    field("manufacturer", "Hersteller", Text),
    field("cost_in_credits", "Kosten", Number),
    field("length", "Länge", Number),
    field("crew", "Crew", Text),
    field("passengers", "Passagiere", Number),
    field("starship_class", "Klasse", Text),
    field("pilots", "Piloten", MultiSelect),
    field("films", "Filme", MultiSelect),
];

/// Form title and fields for a kind. The first field is required.
pub fn form_schema(key: ResourceKey) -> (&'static str, &'static [FormField]) {
    match key {
        ResourceKey::People => ("Person hinzufügen", PEOPLE_FORM),
        ResourceKey::Films => ("Film hinzufügen", FILMS_FORM),
        ResourceKey::Planets => ("Planet hinzufügen", PLANETS_FORM),
        ResourceKey::Starships => ("Raumschiff hinzufügen", STARSHIPS_FORM),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftReceipt {
    pub draft_id: Uuid,
    pub resource: ResourceKey,
    pub payload: Map<String, Value>,
    pub submitted_at: DateTime<Utc>,
}

/// Simulated submission desk: one submission at a time, fixed artificial delay.
pub struct DraftDesk {
    delay: Duration,
    saving: AtomicBool,
}

impl DraftDesk {
    pub fn new(delay: Duration) -> Self {
        Self { delay, saving: AtomicBool::new(false) }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    pub async fn submit<I, K, V>(&self, resource: ResourceKey, fields: I) -> Result<DraftReceipt, DraftError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let payload = build_payload(resource, fields)?;
        if self.saving.swap(true, Ordering::SeqCst) {
            return Err(DraftError::Busy);
        }
        let _saving = SavingGuard(&self.saving);
        tokio::time::sleep(self.delay).await;

        let body = Value::Object(payload.clone());
        let receipt = DraftReceipt { draft_id: Uuid::new_v4(), resource, payload, submitted_at: Utc::now() };
        tracing::info!(draft_id = %receipt.draft_id, %resource, payload = %body, "would submit");
        Ok(receipt)
    }
}

/// Clears the in-progress flag when a submission ends, including when it is dropped mid-delay.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn build_payload<I, K, V>(resource: ResourceKey, fields: I) -> Result<Map<String, Value>, DraftError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (_, schema) = form_schema(resource);
    let mut payload = Map::new();
    for (key, raw) in fields {
        let key = key.as_ref().trim();
        let def = schema
            .iter()
            .find(|f| f.key == key)
            .ok_or_else(|| DraftError::UnknownField { resource, field: key.to_string() })?;
        let raw = raw.as_ref().trim();
        if raw.is_empty() {
            continue;
        }
        let value = match def.kind {
            Number => {
                let n: f64 = raw.parse().map_err(|_| DraftError::InvalidNumber { field: def.key, value: raw.to_string() })?;
                serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .ok_or_else(|| DraftError::InvalidNumber { field: def.key, value: raw.to_string() })?
            }
            MultiSelect => Value::Array(
                raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(|s| Value::String(s.to_string())).collect(),
            ),
            Text | TextArea | Select => Value::String(raw.to_string()),
        };
        payload.insert(def.key.to_string(), value);
    }
    let required = schema[0].key;
    if !payload.contains_key(required) {
        return Err(DraftError::MissingField { resource, field: required });
    }
    Ok(payload)
}
