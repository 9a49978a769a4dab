use crate::error::BoothError;
use crate::models::Image;
use crate::platform::{AssetPicker, PickerConfig};
use futures_util::future::join_all;

/// Outcome of one picker presentation.
#[derive(Debug, Clone, Default)]
pub struct GallerySelection {
    /// Decoded images in the order the user picked them.
    pub images: Vec<Image>,
    /// Assets that failed to decode and were left out.
    pub dropped: Vec<BoothError>,
}

impl GallerySelection {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Multi-select gallery picker with fan-out/fan-in decoding.
pub struct GallerySelector<A> {
    picker: A,
    config: PickerConfig,
}

impl<A: AssetPicker> GallerySelector<A> {
    pub fn new(picker: A, max_selection: usize) -> Self {
        Self {
            picker,
            config: PickerConfig {
                max_selection,
                ordered: true,
            },
        }
    }

    /// Present the picker and decode the selection.
    ///
    /// A dismissed picker yields an empty selection. Every asset is loaded
    /// concurrently; the result is only delivered once all loads settled.
    pub async fn present(&self) -> GallerySelection {
        let Some(mut assets) = self.picker.present(self.config).await else {
            tracing::info!("Gallery picker dismissed");
            return GallerySelection::default();
        };

        if assets.len() > self.config.max_selection {
            tracing::warn!(
                "Picker returned {} assets, keeping the first {}",
                assets.len(),
                self.config.max_selection
            );
            assets.truncate(self.config.max_selection);
        }

        tracing::debug!("Loading {} picked assets", assets.len());
        let loads = assets.iter().map(|asset| self.picker.load_image(asset));
        let results = join_all(loads).await;

        let mut selection = GallerySelection::default();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(image) => selection.images.push(image),
                Err(reason) => {
                    tracing::warn!("Dropping asset {} ({:?}): {}", index, assets[index], reason);
                    selection
                        .dropped
                        .push(BoothError::AssetDecodeFailed { index, reason });
                }
            }
        }

        tracing::info!(
            "Gallery selection ready: {} images, {} dropped",
            selection.images.len(),
            selection.dropped.len()
        );
        selection
    }

    /// Write a kept photo to the user's album.
    pub async fn save_to_library(&self, image: &Image) -> Result<(), BoothError> {
        self.picker
            .save_to_library(image)
            .await
            .map_err(BoothError::LibrarySaveFailed)
    }
}
