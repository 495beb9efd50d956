//! Categorical tagging: classification code → segment → sales channel.
//!
//! Both mappings are static and total. Unknown codes fall into
//! [`Segment::Outro`], and segments without a channel map to
//! [`Channel::Unassigned`].

use serde::Serialize;
use std::fmt;

/// Coarse business category derived from a classification (CNAE) code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    #[serde(rename = "PET SHOP")]
    PetShop,
    #[serde(rename = "AGROPECUARIA")]
    Agropecuaria,
    #[serde(rename = "VETERINARIA")]
    Veterinaria,
    #[serde(rename = "CRIADOR")]
    Criador,
    #[serde(rename = "ADESTRADOR")]
    Adestrador,
    #[serde(rename = "HOTEL PET")]
    HotelPet,
    #[serde(rename = "MINIMERCADO")]
    Minimercado,
    #[serde(rename = "SUPERMERCADO")]
    Supermercado,
    #[serde(rename = "HIPERMERCADO")]
    Hipermercado,
    #[serde(rename = "PARCEIRO")]
    Parceiro,
    #[serde(rename = "OUTRO")]
    Outro,
}

impl Segment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Segment::PetShop => "PET SHOP",
            Segment::Agropecuaria => "AGROPECUARIA",
            Segment::Veterinaria => "VETERINARIA",
            Segment::Criador => "CRIADOR",
            Segment::Adestrador => "ADESTRADOR",
            Segment::HotelPet => "HOTEL PET",
            Segment::Minimercado => "MINIMERCADO",
            Segment::Supermercado => "SUPERMERCADO",
            Segment::Hipermercado => "HIPERMERCADO",
            Segment::Parceiro => "PARCEIRO",
            Segment::Outro => "OUTRO",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distribution model derived from a [`Segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    #[serde(rename = "ESPECIALIZADO")]
    Especializado,
    #[serde(rename = "AUTOSERVICO")]
    Autoservico,
    #[serde(rename = "DISTRIBUIDOR")]
    Distribuidor,
    /// Placeholder for segments outside every channel.
    #[serde(rename = "-")]
    Unassigned,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Especializado => "ESPECIALIZADO",
            Channel::Autoservico => "AUTOSERVICO",
            Channel::Distribuidor => "DISTRIBUIDOR",
            Channel::Unassigned => "-",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a classification code to its segment. Surrounding whitespace is ignored.
pub fn classify(code: &str) -> Segment {
    match code.trim() {
        "4789004" | "9609208" => Segment::PetShop,
        "4623109" => Segment::Agropecuaria,
        "4771704" | "7500100" | "4644302" => Segment::Veterinaria,
        "0159802" => Segment::Criador,
        "8011102" => Segment::Adestrador,
        "9609207" => Segment::HotelPet,
        "4712100" => Segment::Minimercado,
        "4711302" => Segment::Hipermercado,
        "4691500" | "4639702" => Segment::Parceiro,
        _ => Segment::Outro,
    }
}

pub fn classify_channel(segment: Segment) -> Channel {
    match segment {
        Segment::PetShop
        | Segment::Agropecuaria
        | Segment::Veterinaria
        | Segment::Criador
        | Segment::Adestrador
        | Segment::HotelPet => Channel::Especializado,
        Segment::Minimercado | Segment::Supermercado | Segment::Hipermercado => {
            Channel::Autoservico
        }
        Segment::Parceiro => Channel::Distribuidor,
        Segment::Outro => Channel::Unassigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(classify("4789004"), Segment::PetShop);
        assert_eq!(classify("9609208"), Segment::PetShop);
        assert_eq!(classify("4623109"), Segment::Agropecuaria);
        assert_eq!(classify("7500100"), Segment::Veterinaria);
        assert_eq!(classify("0159802"), Segment::Criador);
        assert_eq!(classify("8011102"), Segment::Adestrador);
        assert_eq!(classify("9609207"), Segment::HotelPet);
        assert_eq!(classify("4712100"), Segment::Minimercado);
        assert_eq!(classify("4711302"), Segment::Hipermercado);
        assert_eq!(classify("4639702"), Segment::Parceiro);
        assert_eq!(classify(" 4789004 "), Segment::PetShop);
    }

    #[test]
    fn test_unknown_code_is_outro() {
        assert_eq!(classify("0000000"), Segment::Outro);
        assert_eq!(classify(""), Segment::Outro);
        // Leading zero is significant.
        assert_eq!(classify("159802"), Segment::Outro);
    }

    #[test]
    fn test_channels() {
        assert_eq!(classify_channel(Segment::PetShop), Channel::Especializado);
        assert_eq!(classify_channel(Segment::Criador), Channel::Especializado);
        assert_eq!(classify_channel(Segment::Supermercado), Channel::Autoservico);
        assert_eq!(classify_channel(Segment::Hipermercado), Channel::Autoservico);
        assert_eq!(classify_channel(Segment::Parceiro), Channel::Distribuidor);
        assert_eq!(classify_channel(Segment::Outro), Channel::Unassigned);
        assert_eq!(Channel::Unassigned.as_str(), "-");
    }

    #[test]
    fn test_serialized_labels_match_as_str() {
        let json = serde_json::to_string(&Segment::HotelPet).unwrap();
        assert_eq!(json, "\"HOTEL PET\"");
        let json = serde_json::to_string(&Channel::Unassigned).unwrap();
        assert_eq!(json, "\"-\"");
    }
}
