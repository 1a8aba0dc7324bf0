use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::format::with_unit;
use crate::registry::{DetailSpec, ListSpec, RelatedBlock, ResourceDefinition, ResourceKey, UiField};

pub fn starships(client: &Arc<SwapiClient>, config: &Config) -> ResourceDefinition<Starship> {
    let plural = "Raumschiffe";
    ResourceDefinition {
        key: ResourceKey::Starships,
        route_base: ResourceKey::Starships.as_str().to_string(),
        titles: titles(plural, "Raumschiff Details"),
        list: ListSpec {
            page_size: config.page_size,
            loading_message: loading(plural),
            empty_message: empty(plural),
            error_message: load_error(plural),
            get_all: all_of(client),
            sort: Some(Starship::sort_by_name),
            image: image(ImageSize::CARD),
            card_title: |s: &Starship| s.name.clone(),
            card_fields: vec![
                UiField::new("Modell", |s: &Starship| s.model.clone()),
                UiField::new("Klasse", |s: &Starship| s.starship_class.clone()),
                UiField::new("Hersteller", |s: &Starship| s.manufacturer.clone()),
            ],
        },
        detail: DetailSpec {
            loading_message: DETAIL_LOADING.to_string(),
            error_message: DETAIL_ERROR.to_string(),
            back_label: BACK_LABEL.to_string(),
            get_by_id: by_id(client),
            title: |s: &Starship| s.name.clone(),
            subtitle: Some(|s: &Starship| s.model.clone()),
            image: image(ImageSize::CARD),
            fields: vec![
                UiField::new("Hersteller", |s: &Starship| s.manufacturer.clone()),
                UiField::new("Kosten", |s: &Starship| with_unit(&s.cost_in_credits, "Credits")),
                UiField::new("Länge", |s: &Starship| with_unit(&s.length, "m")),
                UiField::new("Crew", |s: &Starship| s.crew.clone()),
                UiField::new("Passagiere", |s: &Starship| s.passengers.clone()),
                UiField::new("Hyperantrieb", |s: &Starship| s.hyperdrive_rating.clone()),
                UiField::new("MGLT", |s: &Starship| s.mglt.clone()),
                UiField::new("Klasse", |s: &Starship| s.starship_class.clone()),
            ],
            related: vec![
                RelatedBlock::list("Piloten", |s: &Starship| s.pilots.clone(), many_by_url::<Person>(client), person_card())
                    .limit(config.related_limit),
                RelatedBlock::list("Filme", |s: &Starship| s.films.clone(), many_by_url::<Film>(client), film_card())
                    .limit(config.related_limit),
            ],
        },
    }
}
