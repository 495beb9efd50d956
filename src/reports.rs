//! The fixed aggregate reports over an enriched company table.
//!
//! Grouping drops rows whose key is null, so companies with an unresolved
//! city never form a group of their own.

use crate::enrichment::{
    text_column, CHANNEL_COLUMN, CITY_COLUMN, NEIGHBORHOOD_COLUMN, SEGMENT_COLUMN,
};
use crate::error::{RadarError, Result};
use crate::segment::{Channel, Segment};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;

const TOTAL_COLUMN: &str = "total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelCityCount {
    pub canal: String,
    pub cidade: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborhoodCount {
    pub bairro: String,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCityReport {
    #[serde(rename = "Cidade")]
    pub cidade: String,
    pub total: u64,
    pub segmento: String,
    pub bairros: Vec<NeighborhoodCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentCityCount {
    pub segmento: String,
    pub cidade: String,
    pub total: u64,
}

/// One group produced by [`count_groups`]: key values in `keys` order, plus row count.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Group {
    keys: Vec<String>,
    total: u64,
}

fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if df.column(name).is_err() {
            return Err(RadarError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}

/// Filter by `predicate`, group by `keys` and count rows per group.
/// Groups come back sorted by key.
fn count_groups(df: &DataFrame, predicate: Expr, keys: &[&str]) -> Result<Vec<Group>> {
    let by: Vec<Expr> = keys.iter().map(|k| col(k)).collect();
    let predicate = keys
        .iter()
        .fold(predicate, |acc, k| acc.and(col(k).is_not_null()));

    let grouped = df
        .clone()
        .lazy()
        .filter(predicate)
        .group_by(by)
        .agg([len().alias(TOTAL_COLUMN)])
        .collect()?;

    let key_columns = keys
        .iter()
        .map(|k| text_column(&grouped, k))
        .collect::<Result<Vec<_>>>()?;
    let totals = grouped.column(TOTAL_COLUMN)?.cast(&DataType::UInt64)?;
    let totals = totals.u64()?;

    let mut groups = Vec::with_capacity(grouped.height());
    for (row, total) in totals.into_iter().enumerate() {
        let keys: Option<Vec<String>> = key_columns
            .iter()
            .map(|column| column[row].clone())
            .collect();
        if let (Some(keys), Some(total)) = (keys, total) {
            groups.push(Group { keys, total });
        }
    }
    groups.sort_by(|a, b| a.keys.cmp(&b.keys));
    Ok(groups)
}

/// Highest count first; equal counts fall back to ascending key.
fn by_count_desc(a: &Group, b: &Group) -> Ordering {
    b.total.cmp(&a.total).then_with(|| a.keys.cmp(&b.keys))
}

/// Specialized companies (channel ESPECIALIZADO) per city.
pub fn specialized_by_city(df: &DataFrame) -> Result<Vec<ChannelCityCount>> {
    require_columns(df, &[CHANNEL_COLUMN, CITY_COLUMN])?;
    let predicate = col(CHANNEL_COLUMN).eq(lit(Channel::Especializado.as_str()));

    Ok(count_groups(df, predicate, &[CHANNEL_COLUMN, CITY_COLUMN])?
        .into_iter()
        .map(|g| {
            let mut keys = g.keys.into_iter();
            ChannelCityCount {
                canal: keys.next().unwrap_or_default(),
                cidade: keys.next().unwrap_or_default(),
                total: g.total,
            }
        })
        .collect())
}

/// City with the most pet shops, with its per-neighborhood breakdown.
///
/// Ties between cities are broken by city name, ascending. Fails with
/// [`RadarError::EmptyReport`] when no pet shop has a resolved city.
pub fn top_pet_shop_city(df: &DataFrame) -> Result<TopCityReport> {
    require_columns(df, &[SEGMENT_COLUMN, CITY_COLUMN, NEIGHBORHOOD_COLUMN])?;
    let segment = Segment::PetShop.as_str();
    let is_pet_shop = col(SEGMENT_COLUMN).eq(lit(segment));

    let top = count_groups(df, is_pet_shop.clone(), &[CITY_COLUMN])?
        .into_iter()
        .min_by(by_count_desc)
        .ok_or_else(|| RadarError::EmptyReport(segment.to_string()))?;
    let city = top.keys.into_iter().next().unwrap_or_default();

    let in_city = is_pet_shop.and(col(CITY_COLUMN).eq(lit(city.as_str())));
    let mut neighborhoods = count_groups(df, in_city, &[NEIGHBORHOOD_COLUMN])?;
    neighborhoods.sort_by(by_count_desc);

    Ok(TopCityReport {
        cidade: city,
        total: top.total,
        segmento: segment.to_string(),
        bairros: neighborhoods
            .into_iter()
            .map(|g| NeighborhoodCount {
                bairro: g.keys.into_iter().next().unwrap_or_default(),
                total: g.total,
            })
            .collect(),
    })
}

/// Hypermarkets per city.
pub fn hypermarkets_by_city(df: &DataFrame) -> Result<Vec<SegmentCityCount>> {
    require_columns(df, &[SEGMENT_COLUMN, CITY_COLUMN])?;
    let predicate = col(SEGMENT_COLUMN).eq(lit(Segment::Hipermercado.as_str()));

    Ok(count_groups(df, predicate, &[SEGMENT_COLUMN, CITY_COLUMN])?
        .into_iter()
        .filter(|g| g.total > 0)
        .map(|g| {
            let mut keys = g.keys.into_iter();
            SegmentCityCount {
                segmento: keys.next().unwrap_or_default(),
                cidade: keys.next().unwrap_or_default(),
                total: g.total,
            }
        })
        .collect())
}
