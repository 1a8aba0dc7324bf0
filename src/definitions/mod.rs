//! Built-in resource definitions with German UI labels.

use futures::FutureExt;
use std::sync::Arc;

use crate::api::SwapiClient;
use crate::format::episode_label;
use crate::images::{ImageDefinition, ImageSize};
use crate::mapping::seed_for;
use crate::registry::{ByIdLoader, ListLoader, ManyLoader, RelatedPresenter, Titles, UrlLoader};
use crate::types::{Film, Person, Planet, Resource, Starship};

mod films;
mod people;
mod planets;
mod starships;

pub use films::films;
pub use people::people;
pub use planets::planets;
pub use starships::starships;

const BACK_LABEL: &str = "Zurück zur Liste";
const DETAIL_LOADING: &str = "Details werden geladen...";
const DETAIL_ERROR: &str = "Fehler beim Laden der Details. Bitte versuchen Sie es später erneut.";

fn titles(list: &str, kicker: &str) -> Titles {
    Titles {
        list_title: list.to_string(),
        detail_kicker: kicker.to_string(),
        document_title_list: format!("{list} | Star Wars"),
        document_title_detail: format!("{kicker} | Star Wars"),
    }
}

fn loading(plural: &str) -> String {
    format!("{plural} werden geladen...")
}

fn empty(plural: &str) -> String {
    format!("Keine {plural} gefunden.")
}

fn load_error(plural: &str) -> String {
    format!("Fehler beim Laden der {plural}. Bitte versuchen Sie es später erneut.")
}

fn image<T: Resource>(size: ImageSize) -> ImageDefinition<T> {
    ImageDefinition { seed: seed_for::<T>, size }
}

// --- loaders over the shared client ---

fn all_of<T: Resource>(client: &Arc<SwapiClient>) -> ListLoader<T> {
    let client = client.clone();
    Arc::new(move || {
        let client = client.clone();
        async move { client.fetch_list::<T>().await }.boxed()
    })
}

fn by_id<T: Resource>(client: &Arc<SwapiClient>) -> ByIdLoader<T> {
    let client = client.clone();
    Arc::new(move |id: u64| {
        let client = client.clone();
        async move { client.fetch_by_id::<T>(id).await }.boxed()
    })
}

fn by_url<U: Resource>(client: &Arc<SwapiClient>) -> UrlLoader<U> {
    let client = client.clone();
    Arc::new(move |url: String| {
        let client = client.clone();
        async move { client.fetch_by_url::<U>(&url).await }.boxed()
    })
}

fn many_by_url<U: Resource>(client: &Arc<SwapiClient>) -> ManyLoader<U> {
    let client = client.clone();
    Arc::new(move |urls: Vec<String>| {
        let client = client.clone();
        async move { client.fetch_many_by_url::<U>(&urls).await }.boxed()
    })
}

// --- presenters for related cards ---

fn person_card() -> RelatedPresenter<Person> {
    RelatedPresenter::new(|p: &Person| p.name.clone()).image(image(ImageSize::THUMB))
}

fn film_card() -> RelatedPresenter<Film> {
    RelatedPresenter::new(|f: &Film| f.title.clone())
        .subtitle(|f: &Film| episode_label(f.episode_id))
        .image(image(ImageSize::THUMB))
}

fn planet_card() -> RelatedPresenter<Planet> {
    RelatedPresenter::new(|p: &Planet| p.name.clone()).image(image(ImageSize::THUMB))
}

fn starship_card() -> RelatedPresenter<Starship> {
    RelatedPresenter::new(|s: &Starship| s.name.clone())
        .subtitle(|s: &Starship| s.model.clone())
        .image(image(ImageSize::THUMB))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::registry::{Registry, ResourceKey};
    use crate::transport::MemoryTransport;
    use crate::images::PlaceholderImages;

    #[test]
    fn message_helpers() {
        assert_eq!(loading("Filme"), "Filme werden geladen...");
        assert_eq!(empty("Planete"), "Keine Planete gefunden.");
        assert_eq!(titles("Personen", "Personen Details").document_title_detail, "Personen Details | Star Wars");
    }

    #[test]
    fn standard_registry_has_every_kind() {
        let cfg = Config::default();
        let client = Arc::new(SwapiClient::new(Arc::new(MemoryTransport::new()), &cfg).unwrap());
        let images = Arc::new(PlaceholderImages::new(&cfg.image_base_url).unwrap());
        let registry = Registry::standard(client, images, &cfg);
        assert_eq!(registry.keys(), ResourceKey::ALL.to_vec());
        for key in ResourceKey::ALL {
            let entry = registry.get(key).unwrap();
            assert_eq!(entry.route_base(), key.as_str());
            assert_eq!(entry.page_size(), 12);
        }
        assert_eq!(registry.get_str("films").unwrap().titles().list_title, "Filme");
    }
}
