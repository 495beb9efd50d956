//! Maps a `pergunta` selector to one of the reports and shapes the answer.

use crate::enrichment::enrich;
use crate::error::{RadarError, Result};
use crate::export::export_dataset;
use crate::ingestion::load_directory;
use crate::reports::{
    hypermarkets_by_city, specialized_by_city, top_pet_shop_city, ChannelCityCount,
    SegmentCityCount, TopCityReport,
};
use crate::resolver::CityResolver;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::task;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    SpecializedByCity,
    TopPetShopCity,
    HypermarketsByCity,
    Export,
}

impl Question {
    /// `"1"`..`"4"`; anything else, including no selector, is rejected.
    pub fn from_selector(selector: Option<&str>) -> Result<Self> {
        match selector.map(str::trim) {
            Some("1") => Ok(Question::SpecializedByCity),
            Some("2") => Ok(Question::TopPetShopCity),
            Some("3") => Ok(Question::HypermarketsByCity),
            Some("4") => Ok(Question::Export),
            _ => Err(RadarError::UnknownQuestion),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Question::SpecializedByCity => "Empresas especializadas na regiao",
            Question::TopPetShopCity => "Cidade e seus bairros com mais petshops",
            Question::HypermarketsByCity => "Cidades com hipermercados",
            Question::Export => "Salvar Arquivo",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resposta {
    Specialized(Vec<ChannelCityCount>),
    TopCity(TopCityReport),
    Hypermarkets(Vec<SegmentCityCount>),
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub pergunta: &'static str,
    pub resposta: Resposta,
}

/// Run `question` against an already enriched table.
pub fn answer(question: Question, df: &DataFrame, export_file: &Path) -> Result<Answer> {
    let resposta = match question {
        Question::SpecializedByCity => Resposta::Specialized(specialized_by_city(df)?),
        Question::TopPetShopCity => Resposta::TopCity(top_pet_shop_city(df)?),
        Question::HypermarketsByCity => Resposta::Hypermarkets(hypermarkets_by_city(df)?),
        Question::Export => Resposta::File(export_dataset(df, export_file).message()),
    };
    Ok(Answer {
        pergunta: question.label(),
        resposta,
    })
}

/// Loads, enriches and answers, once per request.
pub struct Dispatcher {
    data_dir: PathBuf,
    export_file: PathBuf,
    resolver: CityResolver,
    concurrency: usize,
}

impl Dispatcher {
    pub fn new(
        data_dir: PathBuf,
        export_file: PathBuf,
        resolver: CityResolver,
        concurrency: usize,
    ) -> Self {
        Self {
            data_dir,
            export_file,
            resolver,
            concurrency,
        }
    }

    pub fn resolver(&self) -> &CityResolver {
        &self.resolver
    }

    pub async fn dispatch(&self, selector: Option<&str>) -> Result<Answer> {
        let question = Question::from_selector(selector)?;
        info!("Answering {:?}", question);

        // File reads, polars work and the spreadsheet write all block.
        let data_dir = self.data_dir.clone();
        let df = task::spawn_blocking(move || load_directory(&data_dir)).await??;
        let df = enrich(df, &self.resolver, self.concurrency).await?;

        let export_file = self.export_file.clone();
        task::spawn_blocking(move || answer(question, &df, &export_file)).await?
    }
}
