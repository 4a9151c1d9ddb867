use kappa_core::geojson::{FeatureCollection, NamedCrs};
use kappa_core::record::EpsgCode;

use crate::client::FeatureSource;
use crate::error::WfsError;

pub const DEFAULT_BATCH_SIZE: u64 = 50_000;

/// Paging progress: keep requesting fixed-size pages while features remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Paging { offset: u64 },
    Done,
}

impl FetchState {
    fn advance(offset: u64, batch_size: u64, total: u64) -> FetchState {
        let next = offset + batch_size;
        if next >= total {
            FetchState::Done
        } else {
            FetchState::Paging { offset: next }
        }
    }
}

/// Fetch every feature of a layer.
///
/// Issues one count-only probe to learn the total, then sequential pages of
/// `batch_size` features until the offset passes it. The result is tagged
/// with `assumed_epsg` since the server does not reliably declare a CRS.
/// A failed or malformed page aborts the whole fetch; there is no
/// partial-result fallback.
pub fn fetch_all<S: FeatureSource>(
    source: &S,
    batch_size: u64,
    assumed_epsg: EpsgCode,
) -> Result<FeatureCollection, WfsError> {
    assert!(batch_size > 0, "batch size must be positive");

    let total = source.total_features()?;
    log::info!("layer reports {total} features");

    let mut result = FeatureCollection::empty();
    let mut state = if total == 0 {
        FetchState::Done
    } else {
        FetchState::Paging { offset: 0 }
    };

    while let FetchState::Paging { offset } = state {
        let page = source.fetch_page(offset, batch_size)?;
        log::debug!("fetched {} features at offset {}", page.features.len(), offset);
        result.features.extend(page.features);
        state = FetchState::advance(offset, batch_size, total);
    }

    result.total_features = Some(total);
    result.crs = Some(NamedCrs::epsg(assumed_epsg));
    Ok(result)
}
