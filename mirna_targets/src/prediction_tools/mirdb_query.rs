//! Form parameters accepted by the miRDB search pages.

use std::fmt;
use std::str::FromStr;

use crate::error::MirdbError;

/// What the default search box holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Mirna,
    Gene,
}

impl SearchType {
    pub fn form_value(&self) -> &'static str {
        match self {
            SearchType::Mirna => "miRNA",
            SearchType::Gene => "gene",
        }
    }
}

impl FromStr for SearchType {
    type Err = MirdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower.contains("mirna") {
            Ok(SearchType::Mirna)
        } else if lower.contains("gene") {
            Ok(SearchType::Gene)
        } else {
            Err(MirdbError::InvalidOption(format!(
                "search type '{}': choose 'miRNA' or 'gene'",
                s
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Human,
    Mouse,
    Rat,
    Dog,
    Chicken,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::Human,
        Species::Mouse,
        Species::Rat,
        Species::Dog,
        Species::Chicken,
    ];

    /// Name used by the default search form.
    pub fn name(&self) -> &'static str {
        match self {
            Species::Human => "Human",
            Species::Mouse => "Mouse",
            Species::Rat => "Rat",
            Species::Dog => "Dog",
            Species::Chicken => "Chicken",
        }
    }

    /// miRBase code used by the custom search form.
    pub fn code(&self) -> &'static str {
        match self {
            Species::Human => "hsa",
            Species::Mouse => "mmu",
            Species::Rat => "rno",
            Species::Dog => "cfa",
            Species::Chicken => "gga",
        }
    }
}

impl FromStr for Species {
    type Err = MirdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Species::ALL
            .into_iter()
            .find(|sp| sp.name().eq_ignore_ascii_case(wanted) || sp.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                MirdbError::InvalidOption(format!(
                    "species '{}': choose Human/hsa, Mouse/mmu, Rat/rno, Dog/cfa or Chicken/gga",
                    s
                ))
            })
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How a gene is identified in a gene search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneChoice {
    Symbol,
    GeneId,
    Accession,
}

impl GeneChoice {
    pub fn form_value(&self) -> &'static str {
        match self {
            GeneChoice::Symbol => "symbol",
            GeneChoice::GeneId => "geneID",
            GeneChoice::Accession => "accession",
        }
    }
}

impl FromStr for GeneChoice {
    type Err = MirdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "symbol" => Ok(GeneChoice::Symbol),
            "geneID" => Ok(GeneChoice::GeneId),
            "accession" => Ok(GeneChoice::Accession),
            _ => Err(MirdbError::InvalidOption(format!(
                "gene choice '{}': choose 'symbol', 'geneID' or 'accession'",
                s
            ))),
        }
    }
}

/// Kind of sequence submitted to the custom prediction page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionType {
    Mirna,
    MrnaTarget,
}

impl SubmissionType {
    pub fn form_value(&self) -> &'static str {
        match self {
            SubmissionType::Mirna => "miRNA",
            SubmissionType::MrnaTarget => "mRNATarget",
        }
    }
}

impl FromStr for SubmissionType {
    type Err = MirdbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        if lower.contains("mirna") {
            Ok(SubmissionType::Mirna)
        } else if lower.contains("mrna") {
            Ok(SubmissionType::MrnaTarget)
        } else {
            Err(MirdbError::InvalidOption(format!(
                "submission type '{}': use something containing 'mirna' or 'mrna'",
                s
            )))
        }
    }
}

/// A single miRDB lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum MirdbQuery {
    /// Search the precomputed predictions by miRNA name or gene.
    Default {
        search_box: String,
        search_type: SearchType,
        species: Species,
        gene_choice: GeneChoice,
    },
    /// Run a prediction for a user-supplied sequence.
    Custom {
        sequence: String,
        submission: SubmissionType,
        species: Species,
    },
}

pub type FormFields = Vec<(&'static str, String)>;

impl MirdbQuery {
    #[cfg(test)]
    pub fn mirna(name: &str, species: Species) -> Self {
        MirdbQuery::Default {
            search_box: name.to_string(),
            search_type: SearchType::Mirna,
            species,
            gene_choice: GeneChoice::Symbol,
        }
    }

    pub fn custom(sequence: &str, submission: SubmissionType, species: Species) -> Self {
        MirdbQuery::Custom {
            sequence: sequence.to_uppercase(),
            submission,
            species,
        }
    }

    /// Only custom predictions produce a result file to retrieve.
    pub fn needs_retrieval(&self) -> bool {
        matches!(self, MirdbQuery::Custom { .. })
    }

    /// Whether the resulting table lists targets of a miRNA.
    pub fn is_mirna_search(&self) -> bool {
        match self {
            MirdbQuery::Default { search_type, .. } => *search_type == SearchType::Mirna,
            MirdbQuery::Custom { submission, .. } => *submission == SubmissionType::Mirna,
        }
    }

    pub fn endpoint(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            MirdbQuery::Default { .. } => format!("{}/cgi-bin/search.cgi", base),
            MirdbQuery::Custom { .. } => format!("{}/cgi-bin/custom.cgi", base),
        }
    }

    pub fn submit_fields(&self) -> FormFields {
        match self {
            MirdbQuery::Default {
                search_box,
                search_type,
                species,
                gene_choice,
            } => {
                let mut fields = vec![
                    ("searchBox", search_box.clone()),
                    ("searchType", search_type.form_value().to_string()),
                    ("species", species.name().to_string()),
                    ("submitButton", "Go".to_string()),
                ];
                if *search_type == SearchType::Gene {
                    fields.push(("geneChoice", gene_choice.form_value().to_string()));
                }
                fields
            }
            MirdbQuery::Custom {
                sequence,
                submission,
                species,
            } => vec![
                ("searchSpecies", species.code().to_string()),
                ("subChoice", submission.form_value().to_string()),
                ("customSub", sequence.to_uppercase()),
                (".submit", "Go".to_string()),
            ],
        }
    }
}

pub fn retrieve_fields(file_name: &str) -> FormFields {
    vec![
        (".submit", "Retrieve Prediction Result".to_string()),
        ("fileName", file_name.to_string()),
    ]
}

pub fn reset_fields() -> FormFields {
    vec![(".submit", "Return to Custom Prediction".to_string())]
}

pub fn reset_url(base_url: &str) -> String {
    format!("{}/custom.html", base_url.trim_end_matches('/'))
}
