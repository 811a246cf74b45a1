//! miRNA name normalization.
//!
//! miRDB reports mature names (`hsa-miR-21-5p`, `hsa-let-7a-5p`) while
//! TargetScan reports seed families joined by `/` (`21/21a`, `let-7/98`).
//! Everything here maps the latter onto the former's naming scheme.

use polars::lazy::dsl::*;
use polars::prelude::*;
use tracing::{debug, warn};

use crate::helper_functions::{require_columns, string_values};

pub const SPECIES_PREFIX: &str = "hsa-";
pub const LINEAGE_MARKER: &str = "let-";
const MIR_PREFIX: &str = "miR-";
const FAMILY_SEPARATOR: char = '/';

/// Canonical name of one family member, `None` for an empty fragment.
pub fn canonical_name(fragment: &str) -> Option<String> {
    let first = fragment.chars().next()?;

    let name = if first.is_ascii_digit() {
        format!("{}{}", MIR_PREFIX, fragment)
    } else {
        fragment.to_string()
    };

    if name.contains(LINEAGE_MARKER) || name.contains(SPECIES_PREFIX) {
        Some(name)
    } else {
        Some(format!("{}{}", SPECIES_PREFIX, name))
    }
}

/// Split a slash-joined family string and canonicalize every member.
/// Empty members are skipped with a warning.
pub fn canonical_names(raw: &str) -> Vec<String> {
    let mut names = Vec::new();
    for fragment in raw.split(FAMILY_SEPARATOR) {
        match canonical_name(fragment) {
            Some(name) => names.push(name),
            None => warn!("Skipping empty family member in '{}'", raw),
        }
    }
    names
}

/// Strip a leading `hsa-` from every value of `column`.
pub fn hsa_del(df: &DataFrame, column: &str) -> PolarsResult<DataFrame> {
    require_columns(df, &[column], "hsa_del")?;

    df.clone()
        .lazy()
        .with_column(
            col(column)
                .cast(DataType::String)
                .str()
                .strip_prefix(lit(SPECIES_PREFIX))
                .alias(column),
        )
        .collect()
}

/// Prepend `hsa-` where neither `hsa-` nor `let-` is already present.
pub fn hsa_add(df: &DataFrame, column: &str) -> PolarsResult<DataFrame> {
    require_columns(df, &[column], "hsa_add")?;

    let name = col(column).cast(DataType::String);
    df.clone()
        .lazy()
        .with_column(
            when(
                name.clone().str().contains_literal(lit(SPECIES_PREFIX))
                    .or(name.clone().str().contains_literal(lit(LINEAGE_MARKER))),
            )
            .then(name.clone())
            .otherwise(lit(SPECIES_PREFIX) + name)
            .alias(column),
        )
        .collect()
}

/// One output row per canonical member of the slash-joined `column`.
/// The canonical name becomes the first column `new_column`; `column`
/// itself is dropped and every other column is carried along.
pub fn mirname_remake(df: &DataFrame, column: &str, new_column: &str) -> PolarsResult<DataFrame> {
    require_columns(df, &[column], "mirname_remake")?;

    let raw = string_values(df, column)?;
    let mut rows: Vec<IdxSize> = Vec::with_capacity(raw.len());
    let mut names: Vec<String> = Vec::with_capacity(raw.len());

    for (i, value) in raw.iter().enumerate() {
        let Some(value) = value else {
            warn!("Row {} has no '{}' value, dropping it", i, column);
            continue;
        };
        for name in canonical_names(value) {
            rows.push(i as IdxSize);
            names.push(name);
        }
    }
    debug!("Expanded {} rows into {} family members", raw.len(), rows.len());

    let idx = IdxCa::from_vec(PlSmallStr::from("row"), rows);
    let mut out = df.take(&idx)?.drop(column)?;
    out.insert_column(0, Series::new(PlSmallStr::from(new_column), names))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        string_values(df, name).unwrap()
    }

    #[test]
    fn numeric_fragments_get_mir_and_species() {
        for n in ["21", "155", "1-3p", "7a"] {
            assert_eq!(canonical_name(n).unwrap(), format!("hsa-miR-{}", n));
        }
    }

    #[test]
    fn marked_names_are_idempotent() {
        for raw in ["let-7a", "hsa-miR-21-5p", "hsa-let-7b", "miR-let-7"] {
            let once = canonical_name(raw).unwrap();
            assert_eq!(once, raw);
            assert_eq!(canonical_name(&once).unwrap(), once);
        }
    }

    #[test]
    fn non_numeric_unmarked_names_get_species_only() {
        assert_eq!(canonical_name("miR-155").unwrap(), "hsa-miR-155");
    }

    #[test]
    fn family_string_splits() {
        assert_eq!(canonical_names("21/21a"), vec!["hsa-miR-21", "hsa-miR-21a"]);
        assert_eq!(canonical_names("let-7/98"), vec!["let-7", "hsa-miR-98"]);
    }

    #[test]
    fn empty_members_are_skipped() {
        assert_eq!(canonical_names("21//155/"), vec!["hsa-miR-21", "hsa-miR-155"]);
        assert!(canonical_names("").is_empty());
        assert_eq!(canonical_name(""), None);
    }

    #[test]
    fn hsa_del_strips_only_a_leading_prefix() {
        let df = df!["miRNA" => &["hsa-miR-21", "miR-155", "let-7a"]].unwrap();
        let out = hsa_del(&df, "miRNA").unwrap();
        assert_eq!(
            strings(&out, "miRNA"),
            vec![Some("miR-21".into()), Some("miR-155".into()), Some("let-7a".into())]
        );
        // input untouched
        assert_eq!(strings(&df, "miRNA")[0].as_deref(), Some("hsa-miR-21"));
    }

    #[test]
    fn hsa_add_skips_marked_names() {
        let df = df!["miRNA" => &[Some("miR-21"), Some("hsa-miR-155"), Some("let-7a"), None]].unwrap();
        let out = hsa_add(&df, "miRNA").unwrap();
        assert_eq!(
            strings(&out, "miRNA"),
            vec![
                Some("hsa-miR-21".into()),
                Some("hsa-miR-155".into()),
                Some("let-7a".into()),
                None
            ]
        );
    }

    #[test]
    fn prefix_helpers_reject_unknown_columns() {
        let df = df!["miRNA" => &["miR-21"]].unwrap();
        assert!(matches!(hsa_add(&df, "name"), Err(PolarsError::ColumnNotFound(_))));
        assert!(matches!(hsa_del(&df, "name"), Err(PolarsError::ColumnNotFound(_))));
    }

    #[test]
    fn remake_explodes_family_rows() {
        let df = df![
            "miRNA_family_ID" => &["21/21a", "let-7"],
            "a_Gene_ID" => &["G1", "G2"],
            "MSA_start" => &[1, 5]
        ]
        .unwrap();

        let out = mirname_remake(&df, "miRNA_family_ID", "miRNA").unwrap();
        let names: Vec<&str> = out.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["miRNA", "a_Gene_ID", "MSA_start"]);
        assert_eq!(out.height(), 3);
        assert_eq!(
            strings(&out, "miRNA"),
            vec![Some("hsa-miR-21".into()), Some("hsa-miR-21a".into()), Some("let-7".into())]
        );
        assert_eq!(
            strings(&out, "a_Gene_ID"),
            vec![Some("G1".into()), Some("G1".into()), Some("G2".into())]
        );
    }
}
