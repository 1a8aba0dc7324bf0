use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::registry::{DetailSpec, ListSpec, RelatedBlock, ResourceDefinition, ResourceKey, UiField};

pub fn planets(client: &Arc<SwapiClient>, config: &Config) -> ResourceDefinition<Planet> {
    let plural = "Planete";
    ResourceDefinition {
        key: ResourceKey::Planets,
        route_base: ResourceKey::Planets.as_str().to_string(),
        titles: titles(plural, "Planet Details"),
        list: ListSpec {
            page_size: config.page_size,
            loading_message: loading(plural),
            empty_message: empty(plural),
            error_message: load_error(plural),
            get_all: all_of(client),
            sort: Some(Planet::sort_by_name),
            image: image(ImageSize::CARD),
            card_title: |p: &Planet| p.name.clone(),
            card_fields: vec![
                UiField::new("Klima", |p: &Planet| p.climate.clone()),
                UiField::new("Terrain", |p: &Planet| p.terrain.clone()),
                UiField::new("Bevölkerung", |p: &Planet| p.population.clone()),
            ],
        },
        detail: DetailSpec {
            loading_message: DETAIL_LOADING.to_string(),
            error_message: DETAIL_ERROR.to_string(),
            back_label: BACK_LABEL.to_string(),
            get_by_id: by_id(client),
            title: |p: &Planet| p.name.clone(),
            subtitle: None,
            image: image(ImageSize::CARD),
            fields: vec![
                UiField::new("Durchmesser", |p: &Planet| p.diameter.clone()),
                UiField::new("Rotationsdauer", |p: &Planet| p.rotation_period.clone()),
                UiField::new("Umlaufzeit", |p: &Planet| p.orbital_period.clone()),
                UiField::new("Klima", |p: &Planet| p.climate.clone()),
                UiField::new("Gravitation", |p: &Planet| p.gravity.clone()),
                UiField::new("Terrain", |p: &Planet| p.terrain.clone()),
                UiField::new("Wasserbedeckung", |p: &Planet| p.surface_water.clone()),
                UiField::new("Bevölkerung", |p: &Planet| p.population.clone()),
            ],
            related: vec![
                RelatedBlock::list(
                    "Bewohner",
                    |p: &Planet| p.residents.clone(),
                    many_by_url::<Person>(client),
                    person_card(),
                )
                    .limit(config.related_limit),
                RelatedBlock::list("Filme", |p: &Planet| p.films.clone(), many_by_url::<Film>(client), film_card())
                    .limit(config.related_limit),
            ],
        },
    }
}
