use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::registry::ResourceKey;

/// An entity kind served by the reference API.
pub trait Resource: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const KEY: ResourceKey;

    /// Canonical hypermedia URL of this entity.
    fn url(&self) -> &str;
    /// Name, or title for kinds that have no name.
    fn display_name(&self) -> &str;
    /// Id attached when the entity was fetched by id.
    fn explicit_id(&self) -> Option<u64>;
    fn with_id(self, id: u64) -> Self;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    pub films: Vec<String>,
    pub species: Vec<String>,
    pub vehicles: Vec<String>,
    pub starships: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Film {
    pub title: String,
    pub episode_id: u32,
    pub opening_crawl: String,
    pub director: String,
    pub producer: String,
    pub release_date: String,
    pub characters: Vec<String>,
    pub planets: Vec<String>,
    pub starships: Vec<String>,
    pub vehicles: Vec<String>,
    pub species: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planet {
    pub name: String,
    pub rotation_period: String,
    pub orbital_period: String,
    pub diameter: String,
    pub climate: String,
    pub gravity: String,
    pub terrain: String,
    pub surface_water: String,
    pub population: String,
    pub residents: Vec<String>,
    pub films: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Starship {
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub cost_in_credits: String,
    pub length: String,
    pub max_atmosphering_speed: String,
    pub crew: String,
    pub passengers: String,
    pub cargo_capacity: String,
    pub consumables: String,
    pub hyperdrive_rating: String,
    #[serde(rename = "MGLT")]
    pub mglt: String,
    pub starship_class: String,
    pub pilots: Vec<String>,
    pub films: Vec<String>,
    pub created: String,
    pub edited: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

macro_rules! impl_resource {
    ($ty:ty, $key:expr, $label:ident) => {
        impl Resource for $ty {
            const KEY: ResourceKey = $key;

            fn url(&self) -> &str {
                &self.url
            }

            fn display_name(&self) -> &str {
                &self.$label
            }

            fn explicit_id(&self) -> Option<u64> {
                self.id
            }

            fn with_id(mut self, id: u64) -> Self {
                self.id = Some(id);
                self
            }
        }
    };
}

impl_resource!(Person, ResourceKey::People, name);
impl_resource!(Film, ResourceKey::Films, title);
impl_resource!(Planet, ResourceKey::Planets, name);
impl_resource!(Starship, ResourceKey::Starships, name);

// --- collection helpers ---

impl Film {
    /// Stable sort by episode number.
    pub fn sort_by_episode(mut films: Vec<Film>) -> Vec<Film> {
        films.sort_by_key(|f| f.episode_id);
        films
    }

    /// Stable sort by release date; unparseable dates go last.
    pub fn sort_by_release_date(mut films: Vec<Film>) -> Vec<Film> {
        films.sort_by_key(|f| {
            let parsed = chrono::NaiveDate::parse_from_str(&f.release_date, "%Y-%m-%d").ok();
            (parsed.is_none(), parsed)
        });
        films
    }
}

impl Planet {
    pub fn sort_by_name(mut planets: Vec<Planet>) -> Vec<Planet> {
        planets.sort_by(|a, b| compare_names(&a.name, &b.name));
        planets
    }

    /// Drops planets with unknown population, most populous first.
    pub fn sort_by_population(planets: Vec<Planet>) -> Vec<Planet> {
        let mut known: Vec<(u64, Planet)> = planets
            .into_iter()
            .filter_map(|p| p.population.parse::<u64>().ok().map(|n| (n, p)))
            .collect();
        known.sort_by(|a, b| b.0.cmp(&a.0));
        known.into_iter().map(|(_, p)| p).collect()
    }

    pub fn filter_by_climate(planets: Vec<Planet>, climate: &str) -> Vec<Planet> {
        let needle = climate.to_lowercase();
        planets.into_iter().filter(|p| p.climate.to_lowercase().contains(&needle)).collect()
    }

    pub fn filter_by_terrain(planets: Vec<Planet>, terrain: &str) -> Vec<Planet> {
        let needle = terrain.to_lowercase();
        planets.into_iter().filter(|p| p.terrain.to_lowercase().contains(&needle)).collect()
    }
}

impl Starship {
    pub fn sort_by_name(mut ships: Vec<Starship>) -> Vec<Starship> {
        ships.sort_by(|a, b| compare_names(&a.name, &b.name));
        ships
    }

    /// Drops ships with unknown cost, cheapest first.
    pub fn sort_by_cost(ships: Vec<Starship>) -> Vec<Starship> {
        let mut known: Vec<(u64, Starship)> = ships
            .into_iter()
            .filter_map(|s| s.cost_in_credits.parse::<u64>().ok().map(|n| (n, s)))
            .collect();
        known.sort_by_key(|(cost, _)| *cost);
        known.into_iter().map(|(_, s)| s).collect()
    }
}

/// Case-insensitive substring match on the display name.
pub fn search_by_name<T: Resource>(items: Vec<T>, query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    items.into_iter().filter(|item| item.display_name().to_lowercase().contains(&needle)).collect()
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(title: &str, episode: u32, release: &str) -> Film {
        Film { title: title.into(), episode_id: episode, release_date: release.into(), ..Default::default() }
    }

    #[test]
    fn person_decodes_with_missing_fields() {
        let raw = serde_json::json!({
            "name": "Luke Skywalker",
            "height": "172",
            "homeworld": "https://swapi.info/api/planets/1",
            "films": ["https://swapi.info/api/films/1"],
            "url": "https://swapi.info/api/people/1"
        });
        let person: Person = serde_json::from_value(raw).unwrap();
        assert_eq!(person.display_name(), "Luke Skywalker");
        assert!(person.starships.is_empty());
        assert_eq!(person.explicit_id(), None);
        assert_eq!(person.with_id(1).explicit_id(), Some(1));
    }

    #[test]
    fn starship_reads_uppercase_mglt() {
        let ship: Starship = serde_json::from_value(serde_json::json!({ "name": "X-wing", "MGLT": "100" })).unwrap();
        assert_eq!(ship.mglt, "100");
    }

    #[test]
    fn sorting_films_by_episode_is_monotonic_and_idempotent() {
        let films = vec![film("Jedi", 6, "1983-05-25"), film("Hope", 4, "1977-05-25"), film("Menace", 1, "1999-05-19")];
        let once = Film::sort_by_episode(films);
        let episodes: Vec<u32> = once.iter().map(|f| f.episode_id).collect();
        assert!(episodes.windows(2).all(|w| w[0] <= w[1]));
        let twice = Film::sort_by_episode(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn release_date_sort_puts_unparseable_last() {
        let films = vec![film("?", 9, "someday"), film("Menace", 1, "1999-05-19"), film("Hope", 4, "1977-05-25")];
        let titles: Vec<String> = Film::sort_by_release_date(films).into_iter().map(|f| f.title).collect();
        assert_eq!(titles, vec!["Hope", "Menace", "?"]);
    }

    #[test]
    fn population_sort_skips_unknown() {
        let planets = vec![
            Planet { name: "Hoth".into(), population: "unknown".into(), ..Default::default() },
            Planet { name: "Tatooine".into(), population: "200000".into(), ..Default::default() },
            Planet { name: "Naboo".into(), population: "4500000000".into(), ..Default::default() },
        ];
        let names: Vec<String> = Planet::sort_by_population(planets).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Naboo", "Tatooine"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let people = vec![
            Person { name: "Luke Skywalker".into(), ..Default::default() },
            Person { name: "Anakin Skywalker".into(), ..Default::default() },
            Person { name: "Leia Organa".into(), ..Default::default() },
        ];
        assert_eq!(search_by_name(people, "SKY").len(), 2);
    }
}
