use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::format::{episode_label, format_german_date};
use crate::registry::{DetailSpec, ListSpec, RelatedBlock, ResourceDefinition, ResourceKey, UiField};

pub fn films(client: &Arc<SwapiClient>, config: &Config) -> ResourceDefinition<Film> {
    let plural = "Filme";
    ResourceDefinition {
        key: ResourceKey::Films,
        route_base: ResourceKey::Films.as_str().to_string(),
        titles: titles(plural, "Film Details"),
        list: ListSpec {
            page_size: config.page_size,
            loading_message: loading(plural),
            empty_message: empty(plural),
            error_message: load_error(plural),
            get_all: all_of(client),
            sort: Some(Film::sort_by_episode),
            image: image(ImageSize::THUMB),
            card_title: |f: &Film| f.title.clone(),
            card_fields: vec![
                UiField::new("Episodennr", |f: &Film| f.episode_id.to_string()),
                UiField::new("Regisseur", |f: &Film| f.director.clone()),
                UiField::new("Veröffentlichung", |f: &Film| format_german_date(&f.release_date)),
            ],
        },
        detail: DetailSpec {
            loading_message: loading(plural),
            error_message: load_error(plural),
            back_label: BACK_LABEL.to_string(),
            get_by_id: by_id(client),
            title: |f: &Film| f.title.clone(),
            subtitle: Some(|f: &Film| episode_label(f.episode_id)),
            image: image(ImageSize::CARD),
            fields: vec![
                UiField::new("Episodennr", |f: &Film| f.episode_id.to_string()),
                UiField::new("Regisseur", |f: &Film| f.director.clone()),
                UiField::new("Produzent", |f: &Film| f.producer.clone()),
                UiField::new("Veröffentlichung", |f: &Film| format_german_date(&f.release_date)),
            ],
            related: vec![
                RelatedBlock::list("Personen", |f: &Film| f.characters.clone(), many_by_url::<Person>(client), person_card())
                    .limit(config.related_limit),
                RelatedBlock::list("Planete", |f: &Film| f.planets.clone(), many_by_url::<Planet>(client), planet_card())
                    .limit(config.related_limit),
                RelatedBlock::list(
                    "Raumschiffe",
                    |f: &Film| f.starships.clone(),
                    many_by_url::<Starship>(client),
                    starship_card(),
                )
                    .limit(config.related_limit),
            ],
        },
    }
}
