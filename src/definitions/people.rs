use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::format::{translate_gender, with_unit};
use crate::registry::{DetailSpec, ListSpec, RelatedBlock, ResourceDefinition, ResourceKey, UiField};

pub fn people(client: &Arc<SwapiClient>, config: &Config) -> ResourceDefinition<Person> {
    let plural = "Personen";
    ResourceDefinition {
        key: ResourceKey::People,
        route_base: ResourceKey::People.as_str().to_string(),
        titles: titles(plural, "Personen Details"),
        list: ListSpec {
            page_size: config.page_size,
            loading_message: loading(plural),
            empty_message: empty(plural),
            error_message: load_error(plural),
            get_all: all_of(client),
            sort: None,
            image: image(ImageSize::CARD),
            card_title: |p: &Person| p.name.clone(),
            card_fields: vec![
                UiField::new("Geburtsjahr", |p: &Person| p.birth_year.clone()),
                UiField::new("Geschlecht", |p: &Person| translate_gender(&p.gender)),
                UiField::new("Größe", |p: &Person| with_unit(&p.height, "cm")),
            ],
        },
        detail: DetailSpec {
            loading_message: DETAIL_LOADING.to_string(),
            error_message: DETAIL_ERROR.to_string(),
            back_label: BACK_LABEL.to_string(),
            get_by_id: by_id(client),
            title: |p: &Person| p.name.clone(),
            subtitle: None,
            image: image(ImageSize::CARD),
            fields: vec![
                UiField::new("Größe", |p: &Person| with_unit(&p.height, "cm")),
                UiField::new("Gewicht", |p: &Person| with_unit(&p.mass, "kg")),
                UiField::new("Haarfarbe", |p: &Person| p.hair_color.clone()),
                UiField::new("Augenfarbe", |p: &Person| p.eye_color.clone()),
                UiField::new("Geburtsjahr", |p: &Person| p.birth_year.clone()),
                UiField::new("Geschlecht", |p: &Person| translate_gender(&p.gender)),
            ],
            related: vec![
                RelatedBlock::single(
                    "Heimatplanet",
                    |p: &Person| Some(p.homeworld.clone()).filter(|u| !u.is_empty()),
                    by_url::<Planet>(client),
                    RelatedPresenter::new(|p: &Planet| p.name.clone()),
                ),
                RelatedBlock::list("Filme", |p: &Person| p.films.clone(), many_by_url::<Film>(client), film_card())
                    .limit(config.related_limit),
            ],
        },
    }
}
