use url::Url;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const CARD: ImageSize = ImageSize { width: 600, height: 400 };
    pub const THUMB: ImageSize = ImageSize { width: 512, height: 256 };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn normalized(self) -> Self {
        Self { width: self.width.max(1), height: self.height.max(1) }
    }
}

/// How a card or detail view derives its placeholder image.
pub struct ImageDefinition<T> {
    pub seed: fn(&T) -> String,
    pub size: ImageSize,
}

impl<T> Clone for ImageDefinition<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ImageDefinition<T> {}

/// Builds seeded placeholder URLs (`<base>/seed/<seed>/<w>/<h>`).
#[derive(Debug, Clone)]
pub struct PlaceholderImages {
    base: Url,
}

impl PlaceholderImages {
    pub fn new(base: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base.to_string()));
        }
        Ok(Self { base })
    }

    pub fn seeded_url(&self, seed: &str, size: ImageSize) -> String {
        let size = size.normalized();
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("seed")
                .push(seed)
                .push(&size.width.to_string())
                .push(&size.height.to_string());
        }
        url.to_string()
    }

    pub fn image_for<T>(&self, def: &ImageDefinition<T>, item: &T) -> String {
        self.seeded_url(&(def.seed)(item), def.size)
    }
}
