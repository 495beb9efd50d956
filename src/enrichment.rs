//! Enrichment pipeline: appends `segmento`, `canal` and `cidade` to the
//! loaded company table.

use crate::error::{RadarError, Result};
use crate::resolver::CityResolver;
use crate::segment::{classify, classify_channel, Segment};
use futures::{stream, StreamExt};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::info;

pub const CODE_COLUMN: &str = "cnae_principal";
pub const MUNICIPIO_COLUMN: &str = "municipio-id";
pub const NEIGHBORHOOD_COLUMN: &str = "bairro";
pub const SEGMENT_COLUMN: &str = "segmento";
pub const CHANNEL_COLUMN: &str = "canal";
pub const CITY_COLUMN: &str = "cidade";

/// Read a column as text, casting if polars typed it otherwise.
pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .map_err(|_| RadarError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect();
    Ok(values)
}

/// Derive `segmento` from the classification code and `canal` from the segment.
pub fn add_categories(df: &mut DataFrame) -> Result<()> {
    let segments: Vec<Segment> = text_column(df, CODE_COLUMN)?
        .iter()
        .map(|code| code.as_deref().map(classify).unwrap_or(Segment::Outro))
        .collect();

    let segment_labels: Vec<&str> = segments.iter().map(|s| s.as_str()).collect();
    let channel_labels: Vec<&str> = segments
        .iter()
        .map(|s| classify_channel(*s).as_str())
        .collect();

    df.with_column(Series::new(SEGMENT_COLUMN, segment_labels))?;
    df.with_column(Series::new(CHANNEL_COLUMN, channel_labels))?;
    Ok(())
}

/// Resolve `cidade` for every row. Each distinct id is looked up once, with at
/// most `concurrency` lookups in flight; rows whose lookup fails get null.
pub async fn add_cities(
    df: &mut DataFrame,
    resolver: &CityResolver,
    concurrency: usize,
) -> Result<()> {
    let ids = text_column(df, MUNICIPIO_COLUMN)?;

    let mut seen = HashSet::new();
    let distinct: Vec<String> = ids
        .iter()
        .flatten()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    let names: HashMap<String, Option<String>> = stream::iter(distinct)
        .map(move |id| async move {
            let name = resolver.resolve(&id).await;
            (id, name)
        })
        .buffered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect();

    let unresolved = names.values().filter(|n| n.is_none()).count();
    info!(
        "Resolved {} municipality id(s), {} without a name",
        names.len(),
        unresolved
    );

    let cities: Vec<Option<String>> = ids
        .iter()
        .map(|id| id.as_ref().and_then(|id| names.get(id).cloned().flatten()))
        .collect();

    df.with_column(Series::new(CITY_COLUMN, cities))?;
    Ok(())
}

/// Run the full pipeline over a freshly loaded table.
pub async fn enrich(
    mut df: DataFrame,
    resolver: &CityResolver,
    concurrency: usize,
) -> Result<DataFrame> {
    add_categories(&mut df)?;
    add_cities(&mut df, resolver, concurrency).await?;
    Ok(df)
}
